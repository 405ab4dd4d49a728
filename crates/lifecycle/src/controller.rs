//! State-gated lifecycle controller.
//!
//! | action | precondition | effect | status |
//! |--------|--------------|--------|--------|
//! | status | none | none | 200 |
//! | start | `stopped` | start | 200, else 400 |
//! | stop | admin token valid, `running` | stop | 200, 403 on bad token, else 400 |
//!
//! Checks run in a fixed order: instance configured, action supported,
//! admin token (stop only), then the state read. The state is never read
//! for an unsupported action or an unauthorized stop.

use std::{fmt, sync::Arc};

use servergate_compute::{ComputePlatform, InstanceState};
use servergate_config::{DEFAULT_PRINCIPAL_ID, DeploymentConfig};
use servergate_storage::{
    AuditAction, AuditEvent, AuditLogger, AuditResult, ParameterStore, TracingAuditLogger,
};

use crate::{
    admin_token::AdminTokenValidator,
    error::{LifecycleError, Result},
    request::{Action, LifecycleRequest, json_kind},
    response::{HttpEnvelope, LifecycleResponse},
};

/// Controls the managed instance on behalf of callers.
pub struct LifecycleController {
    compute: Arc<dyn ComputePlatform>,
    validator: AdminTokenValidator,
    instance_id: Option<String>,
    environment: Option<String>,
    audit: Arc<dyn AuditLogger>,
}

impl LifecycleController {
    /// Creates a controller for the configured instance. Audits through
    /// [`TracingAuditLogger`].
    #[must_use]
    pub fn new(
        compute: Arc<dyn ComputePlatform>,
        store: Arc<dyn ParameterStore>,
        config: &DeploymentConfig,
    ) -> Self {
        Self {
            compute,
            validator: AdminTokenValidator::new(store, config),
            instance_id: config.instance_id().map(str::to_owned),
            environment: config.environment().map(str::to_owned),
            audit: Arc::new(TracingAuditLogger),
        }
    }

    /// Replaces the audit logger.
    #[must_use]
    pub fn with_audit_logger(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    /// The admin token validator used for `stop`.
    #[must_use]
    pub fn validator(&self) -> &AdminTokenValidator {
        &self.validator
    }

    /// Handle a front-door event and return the HTTP envelope.
    ///
    /// The event's `body` is a JSON string; an absent body reads as `{}`
    /// and an object body is accepted as already decoded. Any other body is
    /// an internal fault (500).
    pub async fn handle_event(&self, event: &serde_json::Value) -> HttpEnvelope {
        let response = match self.require_instance_id() {
            Err(e) => e.into(),
            Ok(_) => match event.get("body") {
                None => self.handle_body(None).await,
                Some(serde_json::Value::String(body)) => self.handle_body(Some(body)).await,
                Some(body @ serde_json::Value::Object(_)) => {
                    match LifecycleRequest::from_value(body.clone()) {
                        Ok(request) => self.handle(&request).await,
                        Err(e) => e.into(),
                    }
                },
                Some(other) => {
                    let e = LifecycleError::invalid_request_body(format!(
                        "Request body must be a JSON string, got {}",
                        json_kind(other)
                    ));
                    tracing::error!(error = %e, "Unreadable lifecycle request body");
                    e.into()
                },
            },
        };
        response.to_envelope()
    }

    /// Handle a raw request body.
    pub async fn handle_body(&self, body: Option<&str>) -> LifecycleResponse {
        if let Err(e) = self.require_instance_id() {
            return e.into();
        }
        match LifecycleRequest::from_body(body) {
            Ok(request) => self.handle(&request).await,
            Err(e) => {
                tracing::error!(error = %e, "Unreadable lifecycle request body");
                e.into()
            },
        }
    }

    /// Handle a parsed request. Every outcome is a response.
    pub async fn handle(&self, request: &LifecycleRequest) -> LifecycleResponse {
        match self.try_handle(request).await {
            Ok(response) => response,
            Err(e) => {
                if e.status_code() >= 500 {
                    tracing::error!(error = %e, "Lifecycle request failed");
                }
                e.into()
            },
        }
    }

    /// Handle a parsed request, surfacing refusals as errors.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::MissingInstanceId`] if no instance is configured
    /// - [`LifecycleError::InvalidAction`] if the action is absent or unsupported
    /// - [`LifecycleError::Unauthorized`] if a stop carries no valid admin token
    /// - [`LifecycleError::ConflictingState`] if the instance is in the wrong state
    /// - [`LifecycleError::Platform`] if the compute platform fails
    #[tracing::instrument(skip_all, fields(action = ?request.action))]
    pub async fn try_handle(&self, request: &LifecycleRequest) -> Result<LifecycleResponse> {
        let instance_id = self.require_instance_id()?;
        let action = request.action.ok_or(LifecycleError::InvalidAction)?;

        if action == Action::Stop {
            let authorized = self.validator.validate(request.token()).await;
            self.record(
                AuditAction::ValidateAdminToken,
                instance_id,
                outcome(authorized, "invalid_admin_token"),
                None,
            )
            .await;
            if !authorized {
                return Err(LifecycleError::Unauthorized);
            }
        }

        let state = self.compute.describe_state(instance_id).await?;
        tracing::debug!(%state, "Observed instance state");

        let result = match (action, &state) {
            (Action::Status, _) => Ok(LifecycleResponse::status(
                state.clone(),
                instance_id,
                self.environment.as_deref(),
            )),
            (Action::Start, InstanceState::Stopped) => {
                self.compute.start_instance(instance_id).await?;
                Ok(LifecycleResponse::starting())
            },
            (Action::Stop, InstanceState::Running) => {
                self.compute.stop_instance(instance_id).await?;
                Ok(LifecycleResponse::stopping())
            },
            _ => Err(LifecycleError::ConflictingState { action, state: state.clone() }),
        };

        let audit_result = match &result {
            Ok(_) => AuditResult::Success,
            Err(_) => AuditResult::Failure("conflicting_state".to_owned()),
        };
        self.record(audit_action(action), instance_id, audit_result, Some(&state)).await;
        result
    }

    fn require_instance_id(&self) -> Result<&str> {
        self.instance_id.as_deref().ok_or(LifecycleError::MissingInstanceId)
    }

    async fn record(
        &self,
        action: AuditAction,
        instance_id: &str,
        result: AuditResult,
        observed: Option<&InstanceState>,
    ) {
        let mut event = AuditEvent::builder()
            .actor(DEFAULT_PRINCIPAL_ID)
            .action(action)
            .resource(instance_id)
            .result(result)
            .build();
        if let Some(state) = observed {
            event.metadata.insert("state".to_owned(), state.to_string());
        }
        if let Some(environment) = &self.environment {
            event.metadata.insert("environment".to_owned(), environment.clone());
        }
        self.audit.log(&event).await;
    }
}

fn audit_action(action: Action) -> AuditAction {
    match action {
        Action::Status => AuditAction::QueryStatus,
        Action::Start => AuditAction::StartInstance,
        Action::Stop => AuditAction::StopInstance,
    }
}

fn outcome(ok: bool, reason: &str) -> AuditResult {
    if ok { AuditResult::Success } else { AuditResult::Failure(reason.to_owned()) }
}

impl fmt::Debug for LifecycleController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleController")
            .field("instance_id", &self.instance_id)
            .field("environment", &self.environment)
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use serde_json::json;
    use servergate_compute::{ComputeError, MemoryComputePlatform};
    use servergate_storage::testutil::{RecordingAuditLogger, store_with};

    use super::*;
    use crate::response::ResponseBody;

    const INSTANCE: &str = "i-0123456789abcdef0";
    const TOKEN: &str = "3f2a9c4e1b7d8f6a0c5e2d9b4a7f1c3e8d6b0a5f2c9e4d7b1a8f3c6e0d5b2a9f";

    struct Harness {
        controller: LifecycleController,
        compute: Arc<MemoryComputePlatform>,
        audit: Arc<RecordingAuditLogger>,
    }

    fn harness(state: InstanceState) -> Harness {
        let config =
            DeploymentConfig::builder().instance_id(INSTANCE).environment("prod").build().unwrap();
        let compute = Arc::new(MemoryComputePlatform::with_instance(INSTANCE, state));
        let store = Arc::new(store_with(&[("/minecraft/prod/admin_token", TOKEN)]));
        let audit = Arc::new(RecordingAuditLogger::new());
        let controller = LifecycleController::new(compute.clone(), store, &config)
            .with_audit_logger(audit.clone());
        Harness { controller, compute, audit }
    }

    #[tokio::test]
    async fn test_status_echoes_state_without_mutation() {
        let h = harness(InstanceState::Stopping);
        let response = h.controller.handle(&LifecycleRequest::new(Action::Status)).await;
        assert_eq!(response.status_code(), 200);
        assert!(matches!(
            response.body(),
            ResponseBody::Status { state: InstanceState::Stopping, environment: Some(_), .. }
        ));
        assert_eq!(h.compute.start_count() + h.compute.stop_count(), 0);
        assert_eq!(h.compute.state_of(INSTANCE), Some(InstanceState::Stopping));
    }

    #[tokio::test]
    async fn test_start_from_stopped() {
        let h = harness(InstanceState::Stopped);
        let response = h.controller.handle(&LifecycleRequest::new(Action::Start)).await;
        assert_eq!(response, LifecycleResponse::starting());
        assert_eq!(h.compute.state_of(INSTANCE), Some(InstanceState::Pending));
    }

    #[tokio::test]
    async fn test_unauthorized_stop_never_reads_state() {
        let h = harness(InstanceState::Running);
        let response = h.controller.handle(&LifecycleRequest::new(Action::Stop)).await;
        assert_eq!(response.status_code(), 403);
        assert_eq!(h.compute.call_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_action_never_reads_state() {
        let h = harness(InstanceState::Running);
        let response = h.controller.handle_body(Some(r#"{"action":"reboot"}"#)).await;
        assert_eq!(response.status_code(), 400);
        assert_eq!(h.compute.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_instance_checked_first() {
        let config = DeploymentConfig::builder().environment("prod").build().unwrap();
        let compute = Arc::new(MemoryComputePlatform::new());
        let store = Arc::new(store_with(&[]));
        let controller = LifecycleController::new(compute.clone(), store.clone(), &config);

        for body in [Some("not json"), Some(r#"{"action":"stop","token":"x"}"#), None] {
            let response = controller.handle_body(body).await;
            assert_eq!(response.status_code(), 500);
            assert_eq!(
                response.body(),
                &ResponseBody::Error { error: "INSTANCE_ID environment variable not set".into() }
            );
        }
        assert_eq!(compute.call_count(), 0);
        assert_eq!(store.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_platform_failure_is_500_with_message() {
        let h = harness(InstanceState::Running);
        h.compute.set_failure(Some(ComputeError::platform("throttled")));
        let response = h.controller.handle(&LifecycleRequest::new(Action::Status)).await;
        assert_eq!(response.status_code(), 500);
        assert_eq!(
            response.body(),
            &ResponseBody::Error { error: "Platform error: throttled".into() }
        );
    }

    #[tokio::test]
    async fn test_handle_event_envelope() {
        let h = harness(InstanceState::Running);
        let event = json!({"body": serde_json::to_string(&json!({"action": "stop", "token": TOKEN})).unwrap()});
        let envelope = h.controller.handle_event(&event).await;
        assert_eq!(envelope.status_code, 200);
        assert_eq!(envelope.headers.get("Content-Type").map(String::as_str), Some("application/json"));
        let body: serde_json::Value = serde_json::from_str(&envelope.body).unwrap();
        assert_eq!(body, json!({"message": "Server is stopping", "state": "stopping"}));
    }

    #[tokio::test]
    async fn test_handle_event_without_body_is_invalid_action() {
        let h = harness(InstanceState::Running);
        let envelope = h.controller.handle_event(&json!({})).await;
        assert_eq!(envelope.status_code, 400);
        assert!(envelope.body.contains("Invalid action"));
    }

    #[tokio::test]
    async fn test_handle_event_object_body_accepted() {
        let h = harness(InstanceState::Stopped);
        let envelope = h.controller.handle_event(&json!({"body": {"action": "status"}})).await;
        assert_eq!(envelope.status_code, 200);
    }

    #[tokio::test]
    async fn test_handle_event_non_string_body_is_internal_fault() {
        let h = harness(InstanceState::Stopped);
        for (body, kind) in [(json!(42), "number"), (serde_json::Value::Null, "null")] {
            let envelope = h.controller.handle_event(&json!({ "body": body })).await;
            assert_eq!(envelope.status_code, 500);
            let parsed: serde_json::Value = serde_json::from_str(&envelope.body).unwrap();
            assert_eq!(
                parsed,
                json!({"error": format!("Request body must be a JSON string, got {kind}")})
            );
        }
        assert_eq!(h.compute.call_count(), 0);
    }

    #[tokio::test]
    async fn test_stop_audits_validation_and_transition() {
        let h = harness(InstanceState::Running);
        let request = LifecycleRequest::new(Action::Stop).with_token(TOKEN);
        h.controller.handle(&request).await;

        let events = h.audit.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, AuditAction::ValidateAdminToken);
        assert_eq!(events[1].action, AuditAction::StopInstance);
        assert_eq!(events[1].result, AuditResult::Success);
        assert_eq!(events[1].metadata.get("state").map(String::as_str), Some("running"));
        assert!(events.iter().all(|e| !format!("{e:?}").contains(TOKEN)));
    }

    #[tokio::test]
    async fn test_conflict_audited_as_failure() {
        let h = harness(InstanceState::Running);
        h.controller.handle(&LifecycleRequest::new(Action::Start)).await;
        let events = h.audit.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].result, AuditResult::Failure("conflicting_state".into()));
    }
}
