//! Request authorizer entry point.
//!
//! Reads the front door's event, runs the [`CredentialVerifier`], records
//! the decision in the audit trail and returns the synthesized policy. Two
//! event shapes are understood:
//!
//! - `REQUEST` events carrying an `identitySource` list, whose first entry is the raw header
//! - events carrying a `headers` map with an `authorization` entry (any case)
//!
//! The policy resource is `routeArn`, else `methodArn`, else `*`.

use std::{collections::BTreeMap, fmt, sync::Arc};

use serde::Deserialize;
use servergate_config::AuthorizerSettings;
use servergate_storage::{
    AuditAction, AuditEvent, AuditLogger, AuditResult, ParameterStore, TracingAuditLogger,
};

use crate::{
    policy::{Effect, PolicyResponse, WILDCARD_RESOURCE, synthesize},
    verdict::{DenyReason, Verdict},
    verifier::CredentialVerifier,
};

/// Event type whose `identitySource` carries the credential.
pub const REQUEST_EVENT_TYPE: &str = "REQUEST";

/// Authorizer event as delivered by the front door. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerEvent {
    /// Event type, e.g. `REQUEST`.
    #[serde(rename = "type", default)]
    pub event_type: Option<String>,
    /// Configured identity sources, in order.
    #[serde(default)]
    pub identity_source: Option<Vec<String>>,
    /// Request headers.
    #[serde(default)]
    pub headers: Option<BTreeMap<String, Option<String>>>,
    /// ARN of the matched route.
    #[serde(default)]
    pub route_arn: Option<String>,
    /// ARN of the invoked method.
    #[serde(default)]
    pub method_arn: Option<String>,
}

impl AuthorizerEvent {
    /// Raw `Authorization` value, if the event carries one.
    #[must_use]
    pub fn raw_authorization(&self) -> Option<&str> {
        if self.event_type.as_deref() == Some(REQUEST_EVENT_TYPE) {
            if let Some(first) = self.identity_source.as_ref().and_then(|s| s.first()) {
                return Some(first);
            }
        }

        self.headers
            .as_ref()?
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("authorization"))
            .and_then(|(_, value)| value.as_deref())
    }

    /// Resource the policy will cover.
    #[must_use]
    pub fn resource(&self) -> &str {
        self.route_arn.as_deref().or(self.method_arn.as_deref()).unwrap_or(WILDCARD_RESOURCE)
    }
}

/// Outcome of one authorization request.
///
/// The deny reason stays internal; [`to_policy`](Self::to_policy) drops it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationDecision {
    effect: Effect,
    principal_id: String,
    resource: String,
    reason: Option<DenyReason>,
}

impl AuthorizationDecision {
    /// An allow decision.
    #[must_use]
    pub fn allow(principal_id: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            effect: Effect::Allow,
            principal_id: principal_id.into(),
            resource: resource.into(),
            reason: None,
        }
    }

    /// A deny decision tagged with its reason.
    #[must_use]
    pub fn deny(
        principal_id: impl Into<String>,
        resource: impl Into<String>,
        reason: DenyReason,
    ) -> Self {
        Self {
            effect: Effect::Deny,
            principal_id: principal_id.into(),
            resource: resource.into(),
            reason: Some(reason),
        }
    }

    /// The decision's effect.
    #[must_use]
    pub fn effect(&self) -> Effect {
        self.effect
    }

    /// Principal the decision applies to.
    #[must_use]
    pub fn principal_id(&self) -> &str {
        &self.principal_id
    }

    /// Resource the decision covers.
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Why the request was denied, if it was.
    #[must_use]
    pub fn deny_reason(&self) -> Option<DenyReason> {
        self.reason
    }

    /// Returns `true` for an allow decision.
    #[must_use]
    pub fn is_allow(&self) -> bool {
        self.effect == Effect::Allow
    }

    /// Render the decision as the front door's policy document.
    #[must_use]
    pub fn to_policy(&self) -> PolicyResponse {
        synthesize(&self.principal_id, self.effect, Some(&self.resource))
    }
}

impl Default for AuthorizationDecision {
    fn default() -> Self {
        Self {
            effect: Effect::Deny,
            principal_id: servergate_config::DEFAULT_PRINCIPAL_ID.to_owned(),
            resource: WILDCARD_RESOURCE.to_owned(),
            reason: None,
        }
    }
}

/// The request authorizer.
pub struct Authorizer {
    verifier: CredentialVerifier,
    principal_id: String,
    audit: Arc<dyn AuditLogger>,
}

impl Authorizer {
    /// Creates an authorizer that audits through [`TracingAuditLogger`].
    #[must_use]
    pub fn new(store: Arc<dyn ParameterStore>, settings: &AuthorizerSettings) -> Self {
        Self {
            verifier: CredentialVerifier::new(store, settings),
            principal_id: settings.principal_id.clone(),
            audit: Arc::new(TracingAuditLogger),
        }
    }

    /// Replaces the audit logger.
    #[must_use]
    pub fn with_audit_logger(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    /// The underlying verifier.
    #[must_use]
    pub fn verifier(&self) -> &CredentialVerifier {
        &self.verifier
    }

    /// Decide a parsed event.
    #[tracing::instrument(skip_all, fields(resource = %event.resource()))]
    pub async fn authorize(&self, event: &AuthorizerEvent) -> AuthorizationDecision {
        let resource = event.resource();
        let decision = match self.verifier.verify(event.raw_authorization()).await {
            Verdict::Allow => AuthorizationDecision::allow(&self.principal_id, resource),
            Verdict::Deny(reason) => AuthorizationDecision::deny(&self.principal_id, resource, reason),
        };
        self.record(&decision).await;
        decision
    }

    /// Decide a raw JSON event and return the policy.
    ///
    /// An event that cannot be read yields a `Deny` policy on `*`.
    pub async fn handle_event(&self, event: serde_json::Value) -> PolicyResponse {
        match serde_json::from_value::<AuthorizerEvent>(event) {
            Ok(event) => self.authorize(&event).await.to_policy(),
            Err(e) => {
                tracing::warn!(error = %e, "Unreadable authorizer event, denying");
                let decision = AuthorizationDecision::deny(
                    &self.principal_id,
                    WILDCARD_RESOURCE,
                    DenyReason::MalformedEvent,
                );
                self.record(&decision).await;
                decision.to_policy()
            },
        }
    }

    async fn record(&self, decision: &AuthorizationDecision) {
        let result = match decision.deny_reason() {
            None if decision.is_allow() => AuditResult::Success,
            reason => AuditResult::Failure(
                reason.map_or_else(|| "denied".to_owned(), |r| r.to_string()),
            ),
        };
        let event = AuditEvent::builder()
            .actor(decision.principal_id())
            .action(AuditAction::Authorize)
            .resource(decision.resource())
            .result(result)
            .build();
        self.audit.log(&event).await;
    }
}

impl fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authorizer")
            .field("verifier", &self.verifier)
            .field("principal_id", &self.principal_id)
            .finish_non_exhaustive()
    }
}
