//! # Replication Scenarios
//!
//! Replicas attached to a running runtime: convergence, inbound actions,
//! and intents that round-trip through the services.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use shared_types::{Amount, ServiceId};
    use wallet_runtime::{
        ReplicaEndpoint, ReplicaMessage, ReplicaMirror, RuntimeOptions, ServiceStatus,
        WalletRuntime,
    };
    use wallet_services::ReferenceLauncher;
    use wallet_store::{Action, BalanceEntry, SecretPhrase, StateTree};

    use crate::integration::fixtures::{addr, eventually, within};

    /// Feed the mirror until `done` holds. Returns every decoded message.
    async fn sync_until<F>(
        endpoint: &mut ReplicaEndpoint,
        mirror: &mut ReplicaMirror,
        mut done: F,
    ) -> Vec<ReplicaMessage>
    where
        F: FnMut(&ReplicaMirror) -> bool,
    {
        let mut seen = Vec::new();
        let finished = within(async {
            while !done(mirror) {
                let Some(text) = endpoint.recv().await else {
                    break;
                };
                let message: ReplicaMessage = wallet_codec::decode(&text).unwrap();
                mirror.apply(message.clone());
                seen.push(message);
            }
        })
        .await;
        assert!(finished.is_some(), "replica did not converge");
        seen
    }

    async fn running(launcher: ReferenceLauncher) -> WalletRuntime {
        let runtime = WalletRuntime::start(RuntimeOptions::default(), Arc::new(launcher)).await;
        let board = runtime.status_board();
        for id in ServiceId::all() {
            assert!(within(board.wait_for(id, ServiceStatus::Running)).await.is_some());
        }
        // Bridge listeners attach right after their handles resolve.
        let handles = runtime.handles();
        let chain = handles.chain.try_get().unwrap();
        let keyring = handles.keyring.try_get().unwrap();
        assert!(eventually(|| chain.events().listener_count() > 0).await);
        assert!(eventually(|| keyring.events().listener_count() > 0).await);
        runtime
    }

    #[tokio::test]
    async fn test_replica_converges_with_store() {
        let launcher = ReferenceLauncher::new().with_chain_balance(addr(1), Amount::from(11u64));
        let options = RuntimeOptions {
            initial_account: Some(addr(1)),
            ..RuntimeOptions::default()
        };
        let runtime = WalletRuntime::start(options, Arc::new(launcher)).await;
        // Attached before any service is up.
        let mut endpoint = runtime.attach_replica();
        let store = runtime.store();

        assert!(eventually(|| store.get_state().balance(&addr(1)).is_some()).await);
        let expected = store.get_state();

        let mut mirror = ReplicaMirror::new();
        let seen = sync_until(&mut endpoint, &mut mirror, |m| *m.state() == *expected).await;
        assert!(matches!(seen.first(), Some(ReplicaMessage::Snapshot { .. })));

        // Versions only move forward.
        let versions: Vec<u64> = seen
            .iter()
            .filter_map(|m| match m {
                ReplicaMessage::Action { version, .. } => Some(*version),
                ReplicaMessage::Snapshot { .. } => None,
            })
            .collect();
        assert!(versions.windows(2).all(|w| w[0] < w[1]));

        // A late replica starts from the current snapshot.
        let mut late = runtime.attach_replica();
        let text = within(late.recv()).await.flatten().unwrap();
        match wallet_codec::decode::<ReplicaMessage>(&text).unwrap() {
            ReplicaMessage::Snapshot { version, state } => {
                assert!(version >= mirror.version());
                assert_eq!(state.balance(&addr(1)), expected.balance(&addr(1)));
            }
            other => panic!("expected snapshot, got {other:?}"),
        }
        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_inbound_garbage_is_dropped() {
        let runtime = running(ReferenceLauncher::new()).await;
        let store = runtime.store();
        let endpoint = runtime.attach_replica();

        endpoint.send("definitely not json").unwrap();
        endpoint
            .send(r#"{"type":"action","action":{"type":"load-account","address":{"$bigint":"x"}}}"#)
            .unwrap();
        let mut fake = StateTree::default();
        fake.account
            .balances
            .insert(addr(2), BalanceEntry::Loading);
        endpoint
            .send(
                wallet_codec::encode(&ReplicaMessage::Snapshot {
                    version: 50,
                    state: fake,
                })
                .unwrap(),
            )
            .unwrap();
        endpoint
            .send_action(Action::LoadAccount { address: addr(3) })
            .unwrap();

        // Inbound messages are handled in order; the marker lands last.
        assert!(eventually(|| store.get_state().is_tracked(&addr(3))).await);
        let state = store.get_state();
        assert!(!state.is_tracked(&addr(2)));
        assert_eq!(state.account.balances.len(), 1);
        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_track_account_intent_from_replica() {
        let runtime =
            running(ReferenceLauncher::new().with_chain_balance(addr(6), Amount::from(60u64)))
                .await;
        let store = runtime.store();
        let mut endpoint = runtime.attach_replica();
        let mut mirror = ReplicaMirror::new();

        endpoint
            .send_action(Action::TrackAccountRequested { address: addr(6) })
            .unwrap();

        assert!(
            eventually(|| store
                .get_state()
                .balance(&addr(6))
                .is_some_and(|b| b.amount == Amount::from(60u64)))
            .await
        );
        let seen = sync_until(&mut endpoint, &mut mirror, |m| {
            m.state().balance(&addr(6)).is_some()
        })
        .await;

        // The intent itself never goes back out.
        assert!(seen.iter().all(|m| match m {
            ReplicaMessage::Action { action, .. } => !action.is_intent(),
            ReplicaMessage::Snapshot { .. } => true,
        }));
        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_failed_intent_leaves_state_unchanged() {
        let runtime = running(ReferenceLauncher::new()).await;
        let store = runtime.store();
        let endpoint = runtime.attach_replica();
        let (version, before) = store.snapshot();

        endpoint
            .send_action(Action::ImportKeyringRequested {
                mnemonic: SecretPhrase::new("only three words"),
            })
            .unwrap();
        assert!(eventually(|| store.version() > version).await);

        // Let the service call finish and fail.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(*store.get_state(), *before);
        assert!(store.get_state().keyrings.keyrings.is_empty());
        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_generate_keyring_through_replica() {
        let runtime = running(ReferenceLauncher::new()).await;
        let mut endpoint = runtime.attach_replica();
        let mut mirror = ReplicaMirror::new();
        endpoint
            .send_action(Action::GenerateKeyringRequested)
            .unwrap();

        sync_until(&mut endpoint, &mut mirror, |m| {
            m.state().keyrings.keyrings.len() == 1
        })
        .await;
        let summary = &mirror.state().keyrings.keyrings[0];
        assert_eq!(summary.addresses.len(), 1);
        assert_eq!(runtime.store().get_state().keyrings, mirror.state().keyrings);
        runtime.shutdown().await;
    }
}
