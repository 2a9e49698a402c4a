//! Simulated indexer.
//!
//! Registers accounts with the chain service and serves asset holdings and
//! indexed balances from in-memory tables.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_bus::{DomainEvent, ServiceEmitter};
use shared_types::{
    AccountBalance, Address, Amount, AssetAmount, ServiceError, ServiceErrorKind, ServiceId,
};
use tracing::debug;

use crate::now_millis;
use crate::ports::{ChainService, IndexerService};

pub struct SimulatedIndexer {
    events: ServiceEmitter,
    chain: Arc<dyn ChainService>,
    symbol: String,
    registered: RwLock<BTreeSet<Address>>,
    holdings: RwLock<HashMap<Address, Vec<AssetAmount>>>,
    balances: RwLock<HashMap<Address, Amount>>,
}

impl SimulatedIndexer {
    #[must_use]
    pub fn new(chain: Arc<dyn ChainService>, symbol: impl Into<String>) -> Self {
        Self {
            events: ServiceEmitter::new(ServiceId::Indexer),
            chain,
            symbol: symbol.into(),
            registered: RwLock::new(BTreeSet::new()),
            holdings: RwLock::new(HashMap::new()),
            balances: RwLock::new(HashMap::new()),
        }
    }

    /// Seed the asset list served for an account.
    pub fn set_assets(&self, address: Address, assets: Vec<AssetAmount>) {
        self.holdings.write().insert(address, assets);
    }

    /// Seed the indexed base-asset balance for an account.
    pub fn set_balance(&self, address: Address, amount: Amount) {
        self.balances.write().insert(address, amount);
    }

    /// Accounts registered so far.
    #[must_use]
    pub fn registered(&self) -> Vec<Address> {
        self.registered.read().iter().cloned().collect()
    }
}

#[async_trait]
impl IndexerService for SimulatedIndexer {
    fn events(&self) -> &ServiceEmitter {
        &self.events
    }

    async fn register_tracked_account(&self, address: Address) -> Result<(), ServiceError> {
        self.chain.add_account_to_track(address.clone()).await?;
        self.registered.write().insert(address.clone());
        debug!(%address, "[indexer] Account registered");
        self.refresh_assets(&address).await.map(|_| ())
    }

    async fn refresh_assets(&self, address: &Address) -> Result<Vec<AssetAmount>, ServiceError> {
        if !self.registered.read().contains(address) {
            return Err(ServiceError::new(
                ServiceId::Indexer,
                ServiceErrorKind::NotFound,
                format!("account {address} is not registered"),
            ));
        }

        let assets = self
            .holdings
            .read()
            .get(address)
            .cloned()
            .unwrap_or_default();
        self.events.emit(DomainEvent::Assets {
            address: address.clone(),
            assets: assets.clone(),
        });

        let indexed = self.balances.read().get(address).cloned();
        if let Some(amount) = indexed {
            self.events.emit(DomainEvent::AccountBalance(AccountBalance {
                address: address.clone(),
                symbol: self.symbol.clone(),
                amount,
                retrieved_at: now_millis(),
            }));
        }
        Ok(assets)
    }
}
