//! Observed instance states.
//!
//! The platform reports a free-form state string. The well-known values
//! get their own variant; anything else is carried verbatim in
//! [`InstanceState::Other`] so it can be echoed back to callers unchanged.

use std::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Lifecycle state of the managed instance as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum InstanceState {
    /// Booting after a start request.
    Pending,
    /// Up and serving.
    Running,
    /// Being terminated.
    ShuttingDown,
    /// Gone for good.
    Terminated,
    /// Powering down after a stop request.
    Stopping,
    /// Powered off, can be started.
    Stopped,
    /// A state string this crate does not know about.
    Other(String),
}

impl InstanceState {
    /// Returns the platform's name for this state.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::ShuttingDown => "shutting-down",
            Self::Terminated => "terminated",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Other(s) => s,
        }
    }

    /// Returns `true` for every state other than `running` and `stopped`.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        !matches!(self, Self::Running | Self::Stopped)
    }
}

impl FromStr for InstanceState {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "shutting-down" => Self::ShuttingDown,
            "terminated" => Self::Terminated,
            "stopping" => Self::Stopping,
            "stopped" => Self::Stopped,
            other => Self::Other(other.to_owned()),
        })
    }
}

impl From<String> for InstanceState {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(Self::Other(_)) | Err(_) => Self::Other(s),
            Ok(known) => known,
        }
    }
}

impl From<InstanceState> for String {
    fn from(state: InstanceState) -> Self {
        match state {
            InstanceState::Other(s) => s,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("pending", InstanceState::Pending, true)]
    #[case("running", InstanceState::Running, false)]
    #[case("shutting-down", InstanceState::ShuttingDown, true)]
    #[case("terminated", InstanceState::Terminated, true)]
    #[case("stopping", InstanceState::Stopping, true)]
    #[case("stopped", InstanceState::Stopped, false)]
    fn test_known_states(#[case] raw: &str, #[case] expected: InstanceState, #[case] busy: bool) {
        let parsed: InstanceState = raw.parse().unwrap();
        assert_eq!(parsed, expected);
        assert_eq!(parsed.as_str(), raw);
        assert_eq!(parsed.is_busy(), busy);
    }

    #[test]
    fn test_unknown_state_preserved() {
        let state: InstanceState = "hibernating".parse().unwrap();
        assert_eq!(state, InstanceState::Other("hibernating".into()));
        assert_eq!(state.to_string(), "hibernating");
        assert!(state.is_busy());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        assert_eq!(serde_json::to_string(&InstanceState::ShuttingDown).unwrap(), "\"shutting-down\"");
        let back: InstanceState = serde_json::from_str("\"stopped\"").unwrap();
        assert_eq!(back, InstanceState::Stopped);
    }

    proptest! {
        #[test]
        fn prop_display_is_lossless(raw in "[a-z-]{1,16}") {
            let state: InstanceState = raw.parse().unwrap();
            prop_assert_eq!(state.to_string(), raw);
        }
    }
}
