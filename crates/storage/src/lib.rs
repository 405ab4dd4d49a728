//! Secret-storage collaborator contract for servergate.
//!
//! Both decision components read their secrets from an external parameter
//! store: the credential verifier fetches the public signing key, the
//! lifecycle controller fetches the environment-scoped admin token. This
//! crate defines that boundary and nothing more.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐    ┌──────────────────────┐
//! │ Credential Verifier │    │ Admin Token Validator│
//! └──────────┬──────────┘    └───────────┬──────────┘
//!            │  get_parameter(name, true) │
//!            ▼                            ▼
//! ┌─────────────────────────────────────────────────┐
//! │               ParameterStore trait              │
//! ├────────────────────────┬────────────────────────┤
//! │ MemoryParameterStore   │ host-provided adapter  │
//! │ (tests, local runs)    │ (managed store)        │
//! └────────────────────────┴────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use servergate_storage::{MemoryParameterStore, ParameterStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryParameterStore::new();
//!     store.put_parameter("/app/dev/admin_token", "s3cret");
//!
//!     let value = store.get_parameter("/app/dev/admin_token", true).await?;
//!     assert_eq!(value.expose(), "s3cret");
//!     Ok(())
//! }
//! ```
//!
//! # Feature Flags
//!
//! - **`testutil`**: Enables the `testutil` module with assertion macros and a recording audit
//!   logger. Enable this in `[dev-dependencies]` for integration tests.

#![deny(unsafe_code)]

pub mod audit;
pub mod error;
pub mod store;
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used)]
pub mod testutil;
pub mod types;

pub use audit::{AuditAction, AuditEvent, AuditLogger, AuditResult, NoopAuditLogger, TracingAuditLogger};
pub use error::{BoxError, StorageError, StorageResult};
pub use store::{MemoryParameterStore, ParameterStore};
pub use types::SecretValue;
