//! Error types for activation.

use licensegate_store::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why an activation was refused, as reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RejectReason {
    /// Every device slot of the license is taken.
    Limit,
}

/// Activation failures.
#[derive(Debug, Error)]
pub enum ActivationError {
    /// Missing or empty license key or machine id.
    #[error("invalid activation request: {0}")]
    InvalidRequest(String),

    /// No license with that key, or the lookup itself failed.
    #[error("license not found")]
    LicenseNotFound,

    /// The license has no free device slot for a new machine.
    #[error("device limit exceeded (max {0} devices)")]
    DeviceLimitExceeded(u32),

    /// Reading or writing activations failed.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] StoreError),
}

impl ActivationError {
    /// The reason code exposed to clients, if the error carries one.
    #[must_use]
    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            Self::DeviceLimitExceeded(_) => Some(RejectReason::Limit),
            _ => None,
        }
    }
}

/// Result type for activation operations.
pub type ActivationResult<T> = Result<T, ActivationError>;

/// Token issuer construction errors.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The keyed scheme was selected without a secret.
    #[error("token signing secret is empty")]
    EmptySecret,
}
