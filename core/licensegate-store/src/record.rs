//! License and activation records as they are stored.

use serde::{Deserialize, Serialize};

/// A provisioned license entitlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    /// Unique license key.
    pub license_key: String,
    /// Maximum number of distinct machines that may activate this license.
    pub max_devices: u32,
}

impl License {
    /// Creates a license record.
    #[must_use]
    pub fn new(license_key: impl Into<String>, max_devices: u32) -> Self {
        Self {
            license_key: license_key.into(),
            max_devices,
        }
    }

    /// Builds a license from a raw stored row. Non-positive limits mean no slots.
    #[must_use]
    pub fn from_stored(license_key: String, max_devices: i64) -> Self {
        Self {
            license_key,
            max_devices: u32::try_from(max_devices.max(0)).unwrap_or(u32::MAX),
        }
    }
}

/// One machine bound to one license.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Activation {
    /// The license this activation consumes a slot of.
    pub license_key: String,
    /// Opaque machine identifier supplied by the client.
    pub pc_id: String,
}

impl Activation {
    /// Creates an activation record.
    #[must_use]
    pub fn new(license_key: impl Into<String>, pc_id: impl Into<String>) -> Self {
        Self {
            license_key: license_key.into(),
            pc_id: pc_id.into(),
        }
    }
}

/// Result of an atomic slot claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimOutcome {
    /// A new activation row was written.
    Inserted,
    /// The (license, machine) pair was already present; nothing was written.
    AlreadyActive,
    /// Every slot is taken; nothing was written.
    LimitReached,
}

impl ClaimOutcome {
    /// Returns true if the machine holds a slot after the claim.
    #[must_use]
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Inserted | Self::AlreadyActive)
    }
}
