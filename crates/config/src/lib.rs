//! Deployment configuration for servergate.
//!
//! A single [`DeploymentConfig`] is built once at process start, either from
//! the environment ([`DeploymentConfig::from_env`]) or with the builder, and
//! passed by reference into the authorizer and the lifecycle controller.
//! Nothing else in the workspace reads environment variables.
//!
//! ```
//! use servergate_config::DeploymentConfig;
//!
//! let config = DeploymentConfig::builder()
//!     .instance_id("i-0123456789abcdef0")
//!     .environment("prod")
//!     .build()?;
//!
//! assert_eq!(config.region(), "us-west-2");
//! assert_eq!(config.admin_token_parameter()?, "/minecraft/prod/admin_token");
//! # Ok::<(), servergate_config::ConfigError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Configuration types and environment loading.
pub mod config;
/// Configuration error types.
pub mod error;
/// Tracing subscriber setup for hosts.
pub mod telemetry;

pub use config::{
    AuthorizerSettings, DEFAULT_AUDIENCE, DEFAULT_ISSUER, DEFAULT_PARAMETER_PREFIX,
    DEFAULT_PRINCIPAL_ID, DEFAULT_PUBLIC_KEY_PARAMETER, DEFAULT_REGION, DeploymentConfig,
};
pub use error::{ConfigError, Result};
