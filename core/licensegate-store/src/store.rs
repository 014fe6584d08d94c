//! Activation store abstraction trait.
//!
//! Defines the interface every license backend offers to the activation
//! handler. Licenses are read-only from this side; activations are only ever
//! added, through [`ActivationStore::claim_slot`].

use crate::error::StoreResult;
use crate::record::{Activation, ClaimOutcome, License};
use async_trait::async_trait;

/// Abstract license and activation store.
#[async_trait]
pub trait ActivationStore: Send + Sync {
    /// Returns the name of the backend, for logs and health output.
    fn backend_name(&self) -> &'static str;

    /// Looks up a license by key. `Ok(None)` when no such license exists.
    async fn find_license(&self, license_key: &str) -> StoreResult<Option<License>>;

    /// Lists every activation recorded for a license.
    async fn list_activations(&self, license_key: &str) -> StoreResult<Vec<Activation>>;

    /// Atomically re-checks the device limit and records the activation.
    ///
    /// Implementations read `max_devices` from the stored license and perform
    /// that read, the duplicate check, the count check, and the insert as one
    /// unit, so that neither concurrent claims nor a limit lowered since the
    /// caller's lookup can push a license past its cap. A license that no
    /// longer exists has no slots.
    async fn claim_slot(&self, license_key: &str, pc_id: &str) -> StoreResult<ClaimOutcome>;
}
