//! Lifecycle responses and the HTTP envelope they travel in.

use std::collections::BTreeMap;

use serde::Serialize;
use servergate_compute::InstanceState;

use crate::{error::LifecycleError, request::Action};

/// Content type of every response body.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// JSON body of a lifecycle response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    /// Answer to `status`.
    Status {
        /// Observed state.
        state: InstanceState,
        /// Managed instance.
        #[serde(rename = "instanceId")]
        instance_id: String,
        /// Deployment environment, `null` when unset.
        environment: Option<String>,
    },
    /// An accepted transition.
    Transition {
        /// Human-readable summary.
        message: String,
        /// Expected transitional state.
        state: InstanceState,
    },
    /// A transition refused because of the current state.
    Conflict {
        /// Human-readable reason.
        error: String,
        /// The state that blocked the transition.
        #[serde(rename = "currentState")]
        current_state: InstanceState,
    },
    /// Any other failure.
    Error {
        /// Human-readable reason.
        error: String,
    },
}

/// Result of handling one lifecycle request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleResponse {
    status_code: u16,
    body: ResponseBody,
}

impl LifecycleResponse {
    /// `200` with the observed state.
    #[must_use]
    pub fn status(state: InstanceState, instance_id: &str, environment: Option<&str>) -> Self {
        Self {
            status_code: 200,
            body: ResponseBody::Status {
                state,
                instance_id: instance_id.to_owned(),
                environment: environment.map(str::to_owned),
            },
        }
    }

    /// `200` after a start was accepted.
    #[must_use]
    pub fn starting() -> Self {
        Self::transition("Server is starting", InstanceState::Pending)
    }

    /// `200` after a stop was accepted.
    #[must_use]
    pub fn stopping() -> Self {
        Self::transition("Server is stopping", InstanceState::Stopping)
    }

    fn transition(message: &str, state: InstanceState) -> Self {
        Self { status_code: 200, body: ResponseBody::Transition { message: message.to_owned(), state } }
    }

    /// `400` echoing the blocking state.
    #[must_use]
    pub fn conflict(action: Action, state: InstanceState) -> Self {
        Self::from_error(&LifecycleError::ConflictingState { action, state })
    }

    /// Maps an error onto its status code and body.
    #[must_use]
    pub fn from_error(err: &LifecycleError) -> Self {
        let body = match err {
            LifecycleError::ConflictingState { state, .. } => {
                ResponseBody::Conflict { error: err.to_string(), current_state: state.clone() }
            },
            _ => ResponseBody::Error { error: err.to_string() },
        };
        Self { status_code: err.status_code(), body }
    }

    /// HTTP status code.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Response body.
    #[must_use]
    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Body serialized to a JSON string.
    #[must_use]
    pub fn body_json(&self) -> String {
        // A body of strings and an enum rendered as a string always serializes.
        serde_json::to_string(&self.body).unwrap_or_else(|_| String::from("{}"))
    }

    /// Wraps the response in the front door's HTTP envelope.
    #[must_use]
    pub fn to_envelope(&self) -> HttpEnvelope {
        HttpEnvelope {
            status_code: self.status_code,
            headers: BTreeMap::from([("Content-Type".to_owned(), CONTENT_TYPE_JSON.to_owned())]),
            body: self.body_json(),
        }
    }
}

impl From<LifecycleError> for LifecycleResponse {
    fn from(err: LifecycleError) -> Self {
        Self::from_error(&err)
    }
}

/// `{statusCode, headers, body}` as returned to the front door.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpEnvelope {
    /// HTTP status code.
    pub status_code: u16,
    /// Response headers.
    pub headers: BTreeMap<String, String>,
    /// JSON body as a string.
    pub body: String,
}
