//! Simulated chain service.
//!
//! Keeps a set of tracked accounts and a balance table. Balances are
//! reported through `accountBalance` events; transactions are injected by
//! the host (tests, demos) and emitted as `transaction` events.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_bus::{DomainEvent, ServiceEmitter};
use shared_types::{
    AccountBalance, Address, Amount, ServiceError, ServiceErrorKind, ServiceId, TransactionRecord,
};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::now_millis;
use crate::ports::ChainService;

pub struct SimulatedChain {
    events: ServiceEmitter,
    symbol: String,
    tracked: RwLock<BTreeSet<Address>>,
    balances: RwLock<HashMap<Address, Amount>>,
}

impl SimulatedChain {
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            events: ServiceEmitter::new(ServiceId::Chain),
            symbol: symbol.into(),
            tracked: RwLock::new(BTreeSet::new()),
            balances: RwLock::new(HashMap::new()),
        }
    }

    /// Set the on-chain balance of an account. Nothing is emitted until the
    /// balance is next requested.
    pub fn set_balance(&self, address: Address, amount: Amount) {
        self.balances.write().insert(address, amount);
    }

    /// Publish a transaction observed on chain.
    pub fn inject_transaction(&self, record: TransactionRecord) -> usize {
        debug!(hash = %record.hash, confirmed = record.is_confirmed(), "[chain] Transaction observed");
        self.events.emit(DomainEvent::Transaction(record))
    }

    /// Periodically refresh every tracked balance until the chain is dropped.
    pub fn start_polling(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        info!(period_secs = period.as_secs(), "[chain] Balance polling started");
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // First tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(chain) = weak.upgrade() else {
                    break;
                };
                let accounts: Vec<Address> = chain.tracked.read().iter().cloned().collect();
                for address in &accounts {
                    chain.publish_balance(address);
                }
            }
        })
    }

    fn publish_balance(&self, address: &Address) -> AccountBalance {
        let amount = self
            .balances
            .read()
            .get(address)
            .cloned()
            .unwrap_or_default();
        let balance = AccountBalance {
            address: address.clone(),
            symbol: self.symbol.clone(),
            amount,
            retrieved_at: now_millis(),
        };
        self.events.emit(DomainEvent::AccountBalance(balance.clone()));
        balance
    }
}

#[async_trait]
impl ChainService for SimulatedChain {
    fn events(&self) -> &ServiceEmitter {
        &self.events
    }

    async fn add_account_to_track(&self, address: Address) -> Result<(), ServiceError> {
        let added = self.tracked.write().insert(address.clone());
        if added {
            debug!(%address, "[chain] Tracking account");
            self.publish_balance(&address);
        }
        Ok(())
    }

    async fn get_accounts_to_track(&self) -> Result<Vec<Address>, ServiceError> {
        Ok(self.tracked.read().iter().cloned().collect())
    }

    async fn get_latest_balance(&self, address: &Address) -> Result<AccountBalance, ServiceError> {
        if !self.tracked.read().contains(address) {
            return Err(ServiceError::new(
                ServiceId::Chain,
                ServiceErrorKind::NotFound,
                format!("account {address} is not tracked"),
            ));
        }
        Ok(self.publish_balance(address))
    }
}
