//! Decision audit trail.
//!
//! Both decision components record what they decided and for which
//! resource. Events never carry secret material: no token text, no key
//! bodies, no admin secrets. Reasons for a denial are recorded here for
//! operators and are never returned to the caller.
//!
//! # Architecture
//!
//! The [`AuditLogger`] trait enables different audit backends:
//!
//! - [`TracingAuditLogger`]: Emits structured `tracing` events at INFO, suitable for log
//!   aggregation.
//! - [`NoopAuditLogger`]: Discards events.
//!
//! # Usage
//!
//! ```no_run
//! use servergate_storage::audit::{
//!     AuditAction, AuditEvent, AuditLogger, AuditResult, TracingAuditLogger,
//! };
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let logger = TracingAuditLogger;
//! let event = AuditEvent::builder()
//!     .actor("user")
//!     .action(AuditAction::Authorize)
//!     .resource("arn:aws:execute-api:us-west-2:123456789012:api/$default/POST/server")
//!     .result(AuditResult::Success)
//!     .build();
//! logger.log(&event).await;
//! # });
//! ```

use std::{collections::BTreeMap, fmt};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Action that produced an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    /// A bearer credential was evaluated by the authorizer.
    Authorize,
    /// An admin token was checked for a destructive transition.
    ValidateAdminToken,
    /// The instance state was queried.
    QueryStatus,
    /// A start transition was requested.
    StartInstance,
    /// A stop transition was requested.
    StopInstance,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authorize => write!(f, "authorize"),
            Self::ValidateAdminToken => write!(f, "validate_admin_token"),
            Self::QueryStatus => write!(f, "query_status"),
            Self::StartInstance => write!(f, "start_instance"),
            Self::StopInstance => write!(f, "stop_instance"),
        }
    }
}

/// Outcome of an audited action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditResult {
    /// The action was allowed or completed.
    Success,
    /// The action was refused or failed with the given reason.
    Failure(String),
}

impl fmt::Display for AuditResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure(reason) => write!(f, "failure: {reason}"),
        }
    }
}

/// Structured audit event.
#[derive(Debug, Clone, bon::Builder)]
pub struct AuditEvent {
    /// When the event occurred (defaults to now).
    #[builder(default = Utc::now())]
    pub timestamp: DateTime<Utc>,
    /// Principal the decision applies to.
    #[builder(into)]
    pub actor: String,
    /// The action that was audited.
    pub action: AuditAction,
    /// Resource identifier (route ARN or instance id).
    #[builder(into)]
    pub resource: String,
    /// Outcome of the action.
    pub result: AuditResult,
    /// Additional context (e.g. observed instance state).
    #[builder(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Trait for audit log backends.
#[async_trait]
pub trait AuditLogger: Send + Sync {
    /// Records an audit event.
    async fn log(&self, event: &AuditEvent);
}

#[async_trait]
impl<L: AuditLogger + ?Sized> AuditLogger for std::sync::Arc<L> {
    async fn log(&self, event: &AuditEvent) {
        (**self).log(event).await;
    }
}

/// Audit logger that emits structured `tracing` events.
///
/// Field mapping:
/// - `audit.timestamp`: RFC 3339 timestamp
/// - `audit.actor`: principal
/// - `audit.action`: e.g. "authorize"
/// - `audit.resource`: route ARN or instance id
/// - `audit.result`: "success" or "failure: ..."
/// - `audit.metadata`: `k=v` pairs
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditLogger;

#[async_trait]
impl AuditLogger for TracingAuditLogger {
    async fn log(&self, event: &AuditEvent) {
        let metadata_str =
            event.metadata.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join(", ");

        tracing::info!(
            audit.timestamp = %event.timestamp.to_rfc3339(),
            audit.actor = %event.actor,
            audit.action = %event.action,
            audit.resource = %event.resource,
            audit.result = %event.result,
            audit.metadata = %metadata_str,
            "audit_event"
        );
    }
}

/// No-op audit logger.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditLogger;

#[async_trait]
impl AuditLogger for NoopAuditLogger {
    async fn log(&self, _event: &AuditEvent) {}
}
