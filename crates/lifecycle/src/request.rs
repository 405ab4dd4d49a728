//! Lifecycle request parsing.

use std::{fmt, str::FromStr};

use serde_json::Value;
use servergate_storage::SecretValue;

use crate::error::LifecycleError;

/// A supported lifecycle action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Report the current state.
    Status,
    /// Start a stopped instance.
    Start,
    /// Stop a running instance. Requires the admin token.
    Stop,
}

impl Action {
    /// The action's wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "status" => Ok(Self::Status),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            _ => Err(LifecycleError::InvalidAction),
        }
    }
}

/// A parsed lifecycle request.
///
/// `action` is `None` when the body named no action or an unsupported one;
/// the controller rejects it after the instance check. A `token` that is
/// not a string is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LifecycleRequest {
    /// Requested action.
    pub action: Option<Action>,
    /// Admin token, only consulted for `stop`.
    pub token: Option<SecretValue>,
}

impl LifecycleRequest {
    /// A request for `action` without a token.
    #[must_use]
    pub fn new(action: Action) -> Self {
        Self { action: Some(action), token: None }
    }

    /// Attaches an admin token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<SecretValue>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Parses a request body. An absent body reads as `{}`.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvalidRequestBody`] carrying the parser's
    /// message if the body is not a JSON object.
    pub fn from_body(body: Option<&str>) -> Result<Self, LifecycleError> {
        let Some(body) = body else {
            return Ok(Self::default());
        };
        let value: Value =
            serde_json::from_str(body).map_err(|e| LifecycleError::invalid_request_body(e.to_string()))?;
        Self::from_value(value)
    }

    /// Builds a request from an already-decoded JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvalidRequestBody`] if `value` is not an object.
    pub fn from_value(value: Value) -> Result<Self, LifecycleError> {
        let mut fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(LifecycleError::invalid_request_body(format!(
                    "Request body must be a JSON object, got {}",
                    json_kind(&other)
                )));
            },
        };
        let action = match fields.get("action") {
            Some(Value::String(s)) => s.parse().ok(),
            _ => None,
        };
        let token = match fields.remove("token") {
            Some(Value::String(s)) => Some(SecretValue::from(s)),
            _ => None,
        };
        Ok(Self { action, token })
    }

    /// The token as a string slice, if present.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_ref().map(SecretValue::expose)
    }
}

/// Name of a JSON value's type, for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
