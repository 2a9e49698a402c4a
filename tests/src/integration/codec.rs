//! # Codec Scenarios
//!
//! Numeric-safe encoding of whole state trees and of dynamic values.

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::str::FromStr;

    use num_bigint::BigInt;
    use shared_types::{AccountBalance, Amount, BlockRef, TransactionRecord, TxHash};
    use wallet_codec::Value;
    use wallet_store::{reduce, Action, StateTree, TxStatus};

    use crate::integration::fixtures::addr;

    const HUGE: &str = "340282366920938463463374607431768211457";

    fn populated_state() -> StateTree {
        let huge = Amount::from_str(HUGE).unwrap();
        let record = TransactionRecord {
            hash: TxHash::new("0xAB01"),
            from: addr(1),
            to: Some(addr(2)),
            value: huge.clone(),
            nonce: 7,
            block: Some(BlockRef {
                hash: "0xb10c".to_string(),
                height: 19_000_000,
            }),
        };
        let actions = [
            Action::LoadAccount { address: addr(1) },
            Action::UpdateBalance {
                balance: AccountBalance {
                    address: addr(1),
                    symbol: "ETH".to_string(),
                    amount: huge,
                    retrieved_at: 1_700_000_000_000,
                },
            },
            Action::from_transaction(record),
        ];
        actions
            .iter()
            .fold(StateTree::default(), |state, action| reduce(&state, action))
    }

    #[test]
    fn test_state_tree_keeps_exact_amounts() {
        let state = populated_state();
        let text = wallet_codec::encode(&state).unwrap();
        assert!(text.contains(&format!(r#"{{"$bigint":"{HUGE}"}}"#)));

        let decoded: StateTree = wallet_codec::decode(&text).unwrap();
        assert_eq!(decoded, state);
        assert_eq!(
            decoded.balance(&addr(1)).unwrap().amount.to_string(),
            HUGE
        );
        assert!(matches!(
            decoded.transaction_status(&TxHash::new("0xab01")),
            Some(TxStatus::Confirmed { .. })
        ));
    }

    #[test]
    fn test_dynamic_value_bigint_survives() {
        let mut map = BTreeMap::new();
        map.insert(
            "amount".to_string(),
            Value::BigInt(BigInt::from_str(HUGE).unwrap()),
        );
        map.insert("plain".to_string(), Value::Number(42.into()));
        map.insert(
            "list".to_string(),
            Value::Array(vec![Value::Null, Value::Bool(true), Value::String("x".into())]),
        );
        let value = Value::Map(map);

        let text = wallet_codec::encode_value(&value).unwrap();
        assert_eq!(wallet_codec::decode_value(&text).unwrap(), value);
    }

    #[test]
    fn test_malformed_marker_is_reported() {
        let err = wallet_codec::decode_value(r#"{"$bigint":"12.5"}"#).unwrap_err();
        assert!(err.is_malformed_encoding());

        let err = wallet_codec::decode::<StateTree>(
            r#"{"account":{"balances":{"0x01":{"status":"loaded","balance":{"address":"0x01","symbol":"ETH","amount":{"$bigint":"-"},"retrieved_at":0}}}}}"#,
        )
        .unwrap_err();
        assert!(err.is_malformed_encoding());
    }
}
