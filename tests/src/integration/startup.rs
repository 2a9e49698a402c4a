//! # Startup Scenarios
//!
//! Dependency-ordered service startup through the full runtime.
//!
//! ```text
//! preferences ──→ chain ──→ indexer ──→ register(initial account)
//! keyring (independent)
//! ```

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use shared_types::{Amount, ServiceId};
    use wallet_runtime::{RuntimeError, RuntimeOptions, ServiceStatus, WalletRuntime};
    use wallet_services::ReferenceLauncher;

    use crate::integration::fixtures::{addr, eventually, within, RecordingLauncher};

    #[tokio::test]
    async fn test_indexer_waits_for_delayed_chain() {
        let launcher = Arc::new(RecordingLauncher::new(
            ReferenceLauncher::new()
                .with_delay(ServiceId::Chain, Duration::from_millis(100))
                .with_chain_balance(addr(1), Amount::from(5u64)),
        ));
        let options = RuntimeOptions {
            initial_account: Some(addr(1)),
            ..RuntimeOptions::default()
        };
        let runtime = WalletRuntime::start(options, launcher.clone()).await;

        let board = runtime.status_board();
        assert!(within(board.wait_for(ServiceId::Indexer, ServiceStatus::Running))
            .await
            .is_some());
        let register = format!("register:{}", addr(1));
        assert!(eventually(|| launcher.steps().contains(&register)).await);

        let steps = launcher.steps();
        let position = |step: &str| steps.iter().position(|s| s == step).unwrap();
        assert!(position("launched:preferences") < position("launched:chain"));
        assert!(position("launched:chain") < position("launching:indexer"));
        assert!(position("launched:indexer") < position(&register));

        // The keyring has no dependencies and is not held back by the chain.
        assert!(position("launched:keyring") < position("launched:chain"));

        let store = runtime.store();
        assert!(eventually(|| store.get_state().balance(&addr(1)).is_some()).await);
        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_chain_failure_leaves_indexer_pending() {
        let launcher = Arc::new(RecordingLauncher::new(
            ReferenceLauncher::new().with_failure(ServiceId::Chain),
        ));
        let runtime = WalletRuntime::start(RuntimeOptions::default(), launcher.clone()).await;
        let board = runtime.status_board();

        assert!(within(board.wait_for(ServiceId::Chain, ServiceStatus::Failed))
            .await
            .is_some());
        assert!(within(board.wait_for(ServiceId::Keyring, ServiceStatus::Running))
            .await
            .is_some());
        assert_eq!(board.status(ServiceId::Preferences), ServiceStatus::Running);

        // Give a would-be indexer launch time to happen.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(board.status(ServiceId::Indexer), ServiceStatus::Pending);
        assert!(!runtime.handles().indexer.is_ready());
        assert!(!launcher.steps().iter().any(|s| s == "launching:indexer"));

        let failures = board.failures();
        assert_eq!(failures.len(), 1);
        assert!(matches!(
            &failures[0],
            RuntimeError::ServiceStartFailure { service: ServiceId::Chain, .. }
        ));

        // The rest of the runtime keeps working.
        let keyring = runtime.handles().keyring.try_get().unwrap();
        assert!(eventually(|| keyring.events().listener_count() > 0).await);
        keyring.generate_new_keyring().await.unwrap();
        let store = runtime.store();
        assert!(eventually(|| store.get_state().keyrings.keyrings.len() == 1).await);

        assert!(within(runtime.shutdown()).await.is_some());
    }

    #[tokio::test]
    async fn test_every_service_reaches_running() {
        let runtime = WalletRuntime::start(
            RuntimeOptions::default(),
            Arc::new(ReferenceLauncher::new()),
        )
        .await;
        let board = runtime.status_board();
        for id in ServiceId::all() {
            assert!(within(board.wait_for(id, ServiceStatus::Running)).await.is_some());
        }
        assert_eq!(board.running_count(), ServiceId::all().len());
        assert!(board.failures().is_empty());
        runtime.shutdown().await;
    }
}
