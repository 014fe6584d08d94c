//! License activation for licensegate.
//!
//! This crate handles:
//! - Looking up a license and its existing activations
//! - Admitting a machine under the license's device cap
//! - Recording new activations through an atomic store claim
//! - Issuing the deterministic activation token
//!
//! The store is injected as an [`ActivationStore`](licensegate_store::ActivationStore)
//! trait object, so the same procedure runs against Supabase, SQLite, or an
//! in-memory fake.

mod activator;
mod error;
mod token;

pub use activator::{ActivationGrant, Activator};
pub use error::{ActivationError, ActivationResult, RejectReason, TokenError};
pub use token::TokenIssuer;
