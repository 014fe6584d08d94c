//! License and activation storage for licensegate.
//!
//! Provides the [`ActivationStore`] trait the activation handler is written
//! against, plus three backends:
//!
//! - [`MemoryStore`]: process-local maps, used by tests and local runs
//! - [`SqliteStore`]: a single SQLite file for self-hosted deployments
//! - [`PostgrestStore`]: the Supabase REST interface
//!
//! # Design Principles
//!
//! - **Licenses are read-only**: provisioning happens elsewhere; only the
//!   local backends expose helpers to seed them.
//! - **Atomic claims**: every backend re-validates the device limit and
//!   inserts in one step, so the cap holds under concurrent activations.

mod error;
mod memory;
mod postgrest;
mod record;
mod sqlite;
mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgrest::{PostgrestConfig, PostgrestStore};
pub use record::{Activation, ClaimOutcome, License};
pub use sqlite::SqliteStore;
pub use store::ActivationStore;
