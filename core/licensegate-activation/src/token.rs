//! Activation token issuance.
//!
//! A token is a digest over `license_key || pc_id`, hex-encoded (64 lowercase
//! characters). A deployment uses exactly one scheme:
//!
//! - `sha256`: plain SHA-256. The desktop client recomputes this value
//!   offline, so it must stay byte-for-byte stable.
//! - `hmac-sha256`: HMAC-SHA-256 keyed with the deployment secret. Tokens
//!   cannot be forged without the secret, but clients cannot verify them
//!   offline either.

use crate::error::TokenError;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

enum TokenScheme {
    Sha256,
    HmacSha256(HmacSha256),
}

/// Computes activation tokens with the deployment's single scheme.
pub struct TokenIssuer {
    scheme: TokenScheme,
}

impl TokenIssuer {
    /// Unkeyed SHA-256 tokens.
    #[must_use]
    pub fn sha256() -> Self {
        Self {
            scheme: TokenScheme::Sha256,
        }
    }

    /// HMAC-SHA-256 tokens keyed with `secret`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::EmptySecret`] if the secret is empty.
    pub fn hmac_sha256(secret: impl AsRef<[u8]>) -> Result<Self, TokenError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        let mac = HmacSha256::new_from_slice(secret).map_err(|_| TokenError::EmptySecret)?;
        Ok(Self {
            scheme: TokenScheme::HmacSha256(mac),
        })
    }

    /// Name of the active scheme, as accepted by configuration.
    #[must_use]
    pub fn scheme_name(&self) -> &'static str {
        match self.scheme {
            TokenScheme::Sha256 => "sha256",
            TokenScheme::HmacSha256(_) => "hmac-sha256",
        }
    }

    /// Issues the token for a (license, machine) pair.
    #[must_use]
    pub fn issue(&self, license_key: &str, pc_id: &str) -> String {
        match &self.scheme {
            TokenScheme::Sha256 => {
                let mut hasher = Sha256::new();
                hasher.update(license_key.as_bytes());
                hasher.update(pc_id.as_bytes());
                hex::encode(hasher.finalize())
            }
            TokenScheme::HmacSha256(keyed) => {
                let mut mac = keyed.clone();
                mac.update(license_key.as_bytes());
                mac.update(pc_id.as_bytes());
                hex::encode(mac.finalize().into_bytes())
            }
        }
    }
}

impl Default for TokenIssuer {
    fn default() -> Self {
        Self::sha256()
    }
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("scheme", &self.scheme_name())
            .finish()
    }
}
