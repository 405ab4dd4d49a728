//! Access-control policy synthesis.
//!
//! Produces the document the front door expects back from a request
//! authorizer:
//!
//! ```json
//! {
//!   "principalId": "user",
//!   "policyDocument": {
//!     "Version": "2012-10-17",
//!     "Statement": [
//!       { "Action": "execute-api:Invoke", "Effect": "Allow", "Resource": "<arn>" }
//!     ]
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Policy language version.
pub const POLICY_VERSION: &str = "2012-10-17";
/// The single action every statement grants or denies.
pub const INVOKE_ACTION: &str = "execute-api:Invoke";
/// Resource used when the event names none.
pub const WILDCARD_RESOURCE: &str = "*";

/// Statement effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Effect {
    /// Grant the invoke action.
    Allow,
    /// Refuse the invoke action.
    #[default]
    Deny,
}

/// One policy statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    /// Always [`INVOKE_ACTION`].
    pub action: String,
    /// Allow or deny.
    pub effect: Effect,
    /// Route or method ARN, or `*`.
    pub resource: String,
}

/// Policy document with a version and its statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    /// Always [`POLICY_VERSION`].
    pub version: String,
    /// Exactly one statement.
    pub statement: Vec<Statement>,
}

/// Authorizer response returned to the front door.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyResponse {
    /// Principal the policy applies to.
    pub principal_id: String,
    /// The policy itself.
    pub policy_document: PolicyDocument,
}

impl PolicyResponse {
    /// Effect of the single statement.
    #[must_use]
    pub fn effect(&self) -> Effect {
        self.policy_document.statement.first().map_or(Effect::Deny, |s| s.effect)
    }

    /// Resource of the single statement.
    #[must_use]
    pub fn resource(&self) -> &str {
        self.policy_document.statement.first().map_or(WILDCARD_RESOURCE, |s| s.resource.as_str())
    }
}

/// Build the policy for a decision. Pure and total.
///
/// # Examples
///
/// ```
/// use servergate_authn::policy::{Effect, synthesize};
///
/// let policy = synthesize("user", Effect::Allow, None);
/// assert_eq!(policy.resource(), "*");
/// assert_eq!(policy.effect(), Effect::Allow);
/// ```
#[must_use]
pub fn synthesize(principal_id: &str, effect: Effect, resource: Option<&str>) -> PolicyResponse {
    PolicyResponse {
        principal_id: principal_id.to_owned(),
        policy_document: PolicyDocument {
            version: POLICY_VERSION.to_owned(),
            statement: vec![Statement {
                action: INVOKE_ACTION.to_owned(),
                effect,
                resource: resource.unwrap_or(WILDCARD_RESOURCE).to_owned(),
            }],
        },
    }
}
