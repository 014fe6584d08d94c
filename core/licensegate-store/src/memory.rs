//! In-memory store, for tests and local development.

use crate::error::{StoreError, StoreResult};
use crate::record::{Activation, ClaimOutcome, License};
use crate::store::ActivationStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

#[derive(Debug, Default)]
struct Tables {
    licenses: HashMap<String, License>,
    // license_key -> pc_ids in activation order
    activations: HashMap<String, Vec<String>>,
}

/// A process-local store. Claims are atomic under a single lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the given licenses.
    pub fn with_licenses(licenses: impl IntoIterator<Item = License>) -> Self {
        let tables = Tables {
            licenses: licenses
                .into_iter()
                .map(|l| (l.license_key.clone(), l))
                .collect(),
            activations: HashMap::new(),
        };
        Self {
            tables: Mutex::new(tables),
        }
    }

    /// Provisions (or replaces) a license.
    pub fn insert_license(&self, license: License) -> StoreResult<()> {
        let mut tables = self.lock()?;
        tables.licenses.insert(license.license_key.clone(), license);
        Ok(())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl ActivationStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn find_license(&self, license_key: &str) -> StoreResult<Option<License>> {
        Ok(self.lock()?.licenses.get(license_key).cloned())
    }

    async fn list_activations(&self, license_key: &str) -> StoreResult<Vec<Activation>> {
        let tables = self.lock()?;
        Ok(tables
            .activations
            .get(license_key)
            .map(|pcs| {
                pcs.iter()
                    .map(|pc| Activation::new(license_key, pc.as_str()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn claim_slot(&self, license_key: &str, pc_id: &str) -> StoreResult<ClaimOutcome> {
        let mut tables = self.lock()?;
        let max_devices = tables
            .licenses
            .get(license_key)
            .map_or(0, |l| l.max_devices);
        let used = match tables.activations.get(license_key) {
            Some(pcs) if pcs.iter().any(|p| p == pc_id) => {
                return Ok(ClaimOutcome::AlreadyActive);
            }
            Some(pcs) => pcs.len(),
            None => 0,
        };
        if used >= max_devices as usize {
            debug!(license_key, pc_id, used, max_devices, "memory claim refused");
            return Ok(ClaimOutcome::LimitReached);
        }

        tables
            .activations
            .entry(license_key.to_string())
            .or_default()
            .push(pc_id.to_string());
        Ok(ClaimOutcome::Inserted)
    }
}
