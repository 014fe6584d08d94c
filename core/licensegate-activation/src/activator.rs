//! Activation admission and token issuance.

use crate::error::{ActivationError, ActivationResult};
use crate::token::TokenIssuer;
use licensegate_store::{ActivationStore, ClaimOutcome};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A successful activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationGrant {
    /// Deterministic token for the (license, machine) pair.
    pub token: String,
    /// False when the machine already held a slot.
    pub newly_activated: bool,
}

/// Runs the activation procedure against an injected store.
pub struct Activator {
    store: Arc<dyn ActivationStore>,
    tokens: TokenIssuer,
}

impl Activator {
    /// Creates an activator over `store`, issuing tokens with `tokens`.
    pub fn new(store: Arc<dyn ActivationStore>, tokens: TokenIssuer) -> Self {
        Self { store, tokens }
    }

    /// Returns the backing store.
    pub fn store(&self) -> &dyn ActivationStore {
        self.store.as_ref()
    }

    /// Activates `pc_id` on `license_key`.
    ///
    /// A machine that already holds a slot is always re-admitted and gets the
    /// same token back. A new machine is admitted only while the license has
    /// fewer activations than `max_devices`.
    ///
    /// # Errors
    ///
    /// - [`ActivationError::InvalidRequest`] if either identifier is empty
    /// - [`ActivationError::LicenseNotFound`] if the license is unknown or the
    ///   lookup fails
    /// - [`ActivationError::DeviceLimitExceeded`] if no slot is free
    /// - [`ActivationError::StorageUnavailable`] if listing or recording
    ///   activations fails
    pub async fn activate(
        &self,
        license_key: &str,
        pc_id: &str,
    ) -> ActivationResult<ActivationGrant> {
        if license_key.is_empty() {
            return Err(ActivationError::InvalidRequest("license key is empty".into()));
        }
        if pc_id.is_empty() {
            return Err(ActivationError::InvalidRequest("machine id is empty".into()));
        }

        let license = match self.store.find_license(license_key).await {
            Ok(Some(license)) => license,
            Ok(None) => {
                info!(license_key, "activation for unknown license");
                return Err(ActivationError::LicenseNotFound);
            }
            Err(e) => {
                warn!(license_key, status = ?e.status(), error = %e, "license lookup failed");
                return Err(ActivationError::LicenseNotFound);
            }
        };

        let activations = self
            .store
            .list_activations(license_key)
            .await
            .map_err(|e| {
                warn!(license_key, status = ?e.status(), error = %e, "listing activations failed");
                ActivationError::StorageUnavailable(e)
            })?;

        let already_activated = activations.iter().any(|a| a.pc_id == pc_id);
        let newly_activated = if already_activated {
            debug!(license_key, pc_id, "machine already activated");
            false
        } else if activations.len() >= license.max_devices as usize {
            info!(
                license_key,
                pc_id,
                max_devices = license.max_devices,
                "device limit reached"
            );
            return Err(ActivationError::DeviceLimitExceeded(license.max_devices));
        } else {
            self.claim(license_key, pc_id, license.max_devices).await?
        };

        if newly_activated {
            info!(license_key, pc_id, "machine activated");
        }

        Ok(ActivationGrant {
            token: self.tokens.issue(license_key, pc_id),
            newly_activated,
        })
    }

    /// Records the activation. The store re-checks its own stored limit
    /// atomically; `max_devices` is the limit seen at lookup, for reporting.
    async fn claim(
        &self,
        license_key: &str,
        pc_id: &str,
        max_devices: u32,
    ) -> ActivationResult<bool> {
        let outcome = self
            .store
            .claim_slot(license_key, pc_id)
            .await
            .map_err(|e| {
                warn!(
                    license_key,
                    pc_id,
                    status = ?e.status(),
                    error = %e,
                    "recording activation failed"
                );
                ActivationError::StorageUnavailable(e)
            })?;

        if !outcome.is_admitted() {
            info!(license_key, pc_id, max_devices, "slot taken concurrently");
            return Err(ActivationError::DeviceLimitExceeded(max_devices));
        }
        if outcome == ClaimOutcome::AlreadyActive {
            debug!(license_key, pc_id, "concurrent activation of same machine");
        }
        Ok(outcome == ClaimOutcome::Inserted)
    }
}
