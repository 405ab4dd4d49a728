//! # servergate lifecycle
//!
//! Transitions the managed compute instance between running and stopped.
//!
//! - [`LifecycleController`] gates `start` on the instance being `stopped`
//!   and `stop` on it being `running`
//! - [`AdminTokenValidator`] guards `stop` with a second secret, compared in
//!   constant time against secret storage
//!
//! Every outcome, including collaborator faults, is a structured
//! [`LifecycleResponse`] with status 200, 400, 403 or 500.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use servergate_compute::MemoryComputePlatform;
//! use servergate_config::DeploymentConfig;
//! use servergate_lifecycle::LifecycleController;
//! use servergate_storage::MemoryParameterStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DeploymentConfig::from_env()?;
//! let controller = LifecycleController::new(
//!     Arc::new(MemoryComputePlatform::new()),
//!     Arc::new(MemoryParameterStore::new()),
//!     &config,
//! );
//!
//! let response = controller.handle_body(Some(r#"{"action":"status"}"#)).await;
//! println!("{} {}", response.status_code(), response.body_json());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Admin token validation.
pub mod admin_token;
/// The lifecycle controller.
pub mod controller;
/// Lifecycle error types.
pub mod error;
/// Request parsing.
pub mod request;
/// Responses and the HTTP envelope.
pub mod response;

pub use admin_token::AdminTokenValidator;
pub use controller::LifecycleController;
pub use error::{LifecycleError, Result};
pub use request::{Action, LifecycleRequest};
pub use response::{HttpEnvelope, LifecycleResponse, ResponseBody};
