//! # Hydration Scenarios
//!
//! Snapshot restore at startup, live events layered on top, and restarts
//! over the file backend.

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;
    use std::time::Duration;

    use shared_types::{AccountBalance, Address, Amount, ServiceId};
    use wallet_runtime::{
        FileStorage, MemoryStorage, RuntimeOptions, ServiceStatus, StateStorage, WalletRuntime,
        STATE_KEY,
    };
    use wallet_services::ReferenceLauncher;
    use wallet_store::{Action, BalanceEntry, StateTree};

    use crate::integration::fixtures::{addr, eventually, within};

    fn state_with_balance(amount: Amount) -> StateTree {
        let mut state = StateTree::default();
        state.account.balances.insert(
            addr(2),
            BalanceEntry::Loaded(AccountBalance {
                address: addr(2),
                symbol: "ETH".to_string(),
                amount,
                retrieved_at: 1,
            }),
        );
        state
    }

    fn persisted(storage: Arc<dyn StateStorage>, initial_account: Option<Address>) -> RuntimeOptions {
        RuntimeOptions {
            persist_state: true,
            storage: Some(storage),
            initial_account,
        }
    }

    #[tokio::test]
    async fn test_persisted_state_precedes_live_events() {
        let encoded = wallet_codec::encode(&state_with_balance(Amount::from(10u64))).unwrap();
        let storage = Arc::new(MemoryStorage::with_value(STATE_KEY, encoded));
        let launcher = Arc::new(
            ReferenceLauncher::new()
                .with_delay(ServiceId::Chain, Duration::from_millis(200))
                .with_chain_balance(addr(2), Amount::from(99u64)),
        );

        let runtime = WalletRuntime::start(persisted(storage, Some(addr(2))), launcher).await;
        let store = runtime.store();

        // Restored before any service event arrives.
        assert_eq!(store.version(), 0);
        assert_eq!(
            store.get_state().balance(&addr(2)).unwrap().amount,
            Amount::from(10u64)
        );

        // Live data then replaces the restored value.
        assert!(
            eventually(|| store
                .get_state()
                .balance(&addr(2))
                .is_some_and(|b| b.amount == Amount::from(99u64)))
            .await
        );
        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_persistence_disabled_ignores_storage() {
        let encoded = wallet_codec::encode(&state_with_balance(Amount::from(10u64))).unwrap();
        let storage = Arc::new(MemoryStorage::with_value(STATE_KEY, encoded));
        let options = RuntimeOptions {
            persist_state: false,
            storage: Some(storage.clone()),
            initial_account: None,
        };
        let runtime = WalletRuntime::start(options, Arc::new(ReferenceLauncher::new())).await;
        assert!(!runtime.persistence_enabled());

        let store = runtime.store();
        assert_eq!(*store.get_state(), StateTree::default());

        store.dispatch(Action::LoadAccount { address: addr(4) });
        store.dispatch(Action::LoadAccount { address: addr(5) });
        assert!(eventually(|| store.get_state().is_tracked(&addr(5))).await);
        runtime.shutdown().await;

        assert_eq!(storage.writes(), 0);
    }

    #[tokio::test]
    async fn test_restart_restores_from_file_backend() {
        let dir = tempfile::tempdir().unwrap();
        let big = Amount::from_str("123456789012345678901234567890").unwrap();

        // First run: live balance gets persisted.
        {
            let storage: Arc<dyn StateStorage> = Arc::new(FileStorage::open(dir.path()).unwrap());
            let launcher =
                Arc::new(ReferenceLauncher::new().with_chain_balance(addr(2), big.clone()));
            let runtime = WalletRuntime::start(persisted(storage, Some(addr(2))), launcher).await;
            let store = runtime.store();
            assert!(eventually(|| store.get_state().balance(&addr(2)).is_some()).await);
            assert!(within(runtime.shutdown()).await.is_some());
        }

        // Second run: the chain never starts, the snapshot still restores.
        let storage: Arc<dyn StateStorage> = Arc::new(FileStorage::open(dir.path()).unwrap());
        let launcher = Arc::new(ReferenceLauncher::new().with_failure(ServiceId::Chain));
        let runtime = WalletRuntime::start(persisted(storage, None), launcher).await;

        let state = runtime.store().get_state();
        assert_eq!(state.balance(&addr(2)).unwrap().amount, big);

        let board = runtime.status_board();
        assert!(within(board.wait_for(ServiceId::Chain, ServiceStatus::Failed))
            .await
            .is_some());
        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_malformed_snapshot_starts_empty() {
        let storage = Arc::new(MemoryStorage::with_value(
            STATE_KEY,
            r#"{"account":{"balances":{"x":{"status":"loaded","balance":{"amount":{"$bigint":"12z"}}}}}}"#,
        ));
        let runtime = WalletRuntime::start(
            persisted(storage, None),
            Arc::new(ReferenceLauncher::new()),
        )
        .await;
        assert_eq!(*runtime.store().get_state(), StateTree::default());
        runtime.shutdown().await;
    }
}
