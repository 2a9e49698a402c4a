//! In-memory keyring service.
//!
//! Seeds live only inside this service. Addresses are the last 20 bytes of
//! the Keccak-256 hash of the seed; summaries carry ids and addresses only.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use rand::RngCore;
use sha3::{Digest, Keccak256};
use shared_bus::{DomainEvent, ServiceEmitter};
use shared_types::{
    Address, KeyringKind, KeyringSummary, ServiceError, ServiceErrorKind, ServiceId,
};
use tracing::info;
use uuid::Uuid;

use crate::ports::KeyringService;

/// Word counts accepted for legacy mnemonics.
const MNEMONIC_WORD_COUNTS: &[usize] = &[12, 15, 18, 21, 24];

pub struct MemoryKeyring {
    events: ServiceEmitter,
    keyrings: RwLock<Vec<KeyringSummary>>,
    seeds: RwLock<HashMap<String, [u8; 32]>>,
}

impl MemoryKeyring {
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: ServiceEmitter::new(ServiceId::Keyring),
            keyrings: RwLock::new(Vec::new()),
            seeds: RwLock::new(HashMap::new()),
        }
    }

    fn derive_address(seed: &[u8; 32]) -> Address {
        let digest = Keccak256::digest(seed);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[12..]);
        Address::from_bytes(&bytes)
    }

    fn normalize_mnemonic(mnemonic: &str) -> Result<String, ServiceError> {
        let words: Vec<&str> = mnemonic.split_whitespace().collect();
        if !MNEMONIC_WORD_COUNTS.contains(&words.len()) {
            return Err(ServiceError::new(
                ServiceId::Keyring,
                ServiceErrorKind::InvalidInput,
                format!("mnemonic must have 12-24 words, got {}", words.len()),
            ));
        }
        if !words
            .iter()
            .all(|w| w.bytes().all(|b| b.is_ascii_alphabetic()))
        {
            return Err(ServiceError::new(
                ServiceId::Keyring,
                ServiceErrorKind::InvalidInput,
                "mnemonic words must be alphabetic",
            ));
        }
        Ok(words.join(" ").to_ascii_lowercase())
    }

    /// Insert a keyring (or find the existing one for the same seed) and
    /// emit the updated list.
    fn insert(&self, seed: [u8; 32], kind: KeyringKind) -> KeyringSummary {
        let address = Self::derive_address(&seed);
        let summary = {
            let mut keyrings = self.keyrings.write();
            match keyrings.iter().find(|k| k.addresses.contains(&address)) {
                Some(existing) => existing.clone(),
                None => {
                    let summary = KeyringSummary {
                        id: Uuid::new_v4().to_string(),
                        kind,
                        addresses: vec![address],
                    };
                    self.seeds.write().insert(summary.id.clone(), seed);
                    keyrings.push(summary.clone());
                    info!(
                        id = %summary.id,
                        fingerprint = %hex::encode(&Keccak256::digest(seed)[..4]),
                        "[keyring] Keyring added"
                    );
                    summary
                }
            }
        };
        self.events
            .emit(DomainEvent::Keyrings(self.keyrings.read().clone()));
        summary
    }
}

impl Default for MemoryKeyring {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyringService for MemoryKeyring {
    fn events(&self) -> &ServiceEmitter {
        &self.events
    }

    async fn generate_new_keyring(&self) -> Result<KeyringSummary, ServiceError> {
        let mut seed = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut seed);
        Ok(self.insert(seed, KeyringKind::Generated))
    }

    async fn import_legacy_keyring(&self, mnemonic: &str) -> Result<KeyringSummary, ServiceError> {
        let phrase = Self::normalize_mnemonic(mnemonic)?;
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&Keccak256::digest(phrase.as_bytes()));
        Ok(self.insert(seed, KeyringKind::Imported))
    }

    async fn keyrings(&self) -> Vec<KeyringSummary> {
        self.keyrings.read().clone()
    }
}
