//! Shared test helpers for activation tests.

#![allow(dead_code)]

use async_trait::async_trait;
use licensegate_activation::{Activator, TokenIssuer};
use licensegate_store::{
    Activation, ActivationStore, ClaimOutcome, License, MemoryStore, StoreError, StoreResult,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Which store call should fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct Faults {
    pub find: bool,
    pub list: bool,
    pub claim: bool,
}

/// Wraps a [`MemoryStore`], counting calls and injecting failures.
pub struct ScriptedStore {
    inner: MemoryStore,
    faults: Faults,
    // Answer claims with this instead of touching the inner store.
    claim_override: Option<ClaimOutcome>,
    // Re-provision the license with this limit just before each claim.
    limit_before_claim: Option<u32>,
    pub finds: AtomicUsize,
    pub lists: AtomicUsize,
    pub claims: AtomicUsize,
}

impl ScriptedStore {
    pub fn new(licenses: impl IntoIterator<Item = License>) -> Self {
        Self {
            inner: MemoryStore::with_licenses(licenses),
            faults: Faults::default(),
            claim_override: None,
            limit_before_claim: None,
            finds: AtomicUsize::new(0),
            lists: AtomicUsize::new(0),
            claims: AtomicUsize::new(0),
        }
    }

    pub fn with_faults(mut self, faults: Faults) -> Self {
        self.faults = faults;
        self
    }

    pub fn with_claim_outcome(mut self, outcome: ClaimOutcome) -> Self {
        self.claim_override = Some(outcome);
        self
    }

    pub fn with_limit_lowered_before_claim(mut self, max_devices: u32) -> Self {
        self.limit_before_claim = Some(max_devices);
        self
    }

    pub fn calls(&self) -> (usize, usize, usize) {
        (
            self.finds.load(Ordering::SeqCst),
            self.lists.load(Ordering::SeqCst),
            self.claims.load(Ordering::SeqCst),
        )
    }
}

fn unavailable() -> StoreError {
    StoreError::Api {
        status: 503,
        body: "store offline".to_string(),
    }
}

#[async_trait]
impl ActivationStore for ScriptedStore {
    fn backend_name(&self) -> &'static str {
        "scripted"
    }

    async fn find_license(&self, license_key: &str) -> StoreResult<Option<License>> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        if self.faults.find {
            return Err(unavailable());
        }
        self.inner.find_license(license_key).await
    }

    async fn list_activations(&self, license_key: &str) -> StoreResult<Vec<Activation>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        if self.faults.list {
            return Err(unavailable());
        }
        self.inner.list_activations(license_key).await
    }

    async fn claim_slot(&self, license_key: &str, pc_id: &str) -> StoreResult<ClaimOutcome> {
        self.claims.fetch_add(1, Ordering::SeqCst);
        if self.faults.claim {
            return Err(unavailable());
        }
        if let Some(outcome) = self.claim_override {
            return Ok(outcome);
        }
        if let Some(max_devices) = self.limit_before_claim {
            self.inner.insert_license(License::new(license_key, max_devices))?;
        }
        self.inner.claim_slot(license_key, pc_id).await
    }
}

/// Activator over a memory store holding one license.
pub fn memory_activator(key: &str, max_devices: u32) -> (Activator, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::with_licenses([License::new(key, max_devices)]));
    let activator = Activator::new(store.clone(), TokenIssuer::sha256());
    (activator, store)
}

/// `SHA-256("ABC-123PC1")`, hex.
pub const ABC_PC1_SHA256: &str =
    "1fb02c98798195e659c015a4e43d16d2cd1de6e5385cb3f41dd07f1ce1c7eec8";

/// `SHA-256("ABC-123PC2")`, hex.
pub const ABC_PC2_SHA256: &str =
    "4d791a15ac66e1ea22043c3fb116a4bac2100cbc43a6de5cfa4b5d6303993ef1";

/// `HMAC-SHA-256(key = "test-secret", "ABC-123PC1")`, hex.
pub const ABC_PC1_HMAC_TEST_SECRET: &str =
    "ac3c1ff22ec2262a59fb3aabeb7b72b44f85e9570a7a19e13f336dd15f5ce1e6";
