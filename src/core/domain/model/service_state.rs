//! Service states reported by `api/services`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The state of an operating-system service.
///
/// The numeric codes are what the monitoring side stores as the service
/// `status` datapoint; the strings are what the agent returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    Running,
    Stopped,
    Paused,
    StartPending,
    StopPending,
    PausePending,
    ContinuePending,
    Unknown,
}

impl ServiceState {
    pub const ALL: [ServiceState; 8] = [
        ServiceState::Running,
        ServiceState::Stopped,
        ServiceState::Paused,
        ServiceState::StartPending,
        ServiceState::StopPending,
        ServiceState::PausePending,
        ServiceState::ContinuePending,
        ServiceState::Unknown,
    ];

    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            ServiceState::Running => 0,
            ServiceState::Stopped => 1,
            ServiceState::Paused => 2,
            ServiceState::StartPending => 3,
            ServiceState::StopPending => 4,
            ServiceState::PausePending => 5,
            ServiceState::ContinuePending => 6,
            ServiceState::Unknown => 10,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceState::Running => "running",
            ServiceState::Stopped => "stopped",
            ServiceState::Paused => "paused",
            ServiceState::StartPending => "start_pending",
            ServiceState::StopPending => "stop_pending",
            ServiceState::PausePending => "pause_pending",
            ServiceState::ContinuePending => "continue_pending",
            ServiceState::Unknown => "unknown",
        }
    }

    /// Reverse of [`ServiceState::code`].
    #[must_use]
    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|state| state.code() == code)
    }

    /// Maps an agent string to a state; anything unrecognized is `Unknown`.
    #[must_use]
    pub fn from_agent(state: &str) -> Self {
        state.parse().unwrap_or(ServiceState::Unknown)
    }

    /// Event summary for a service status change.
    ///
    /// `current` is the stored datapoint value, which may arrive as a float.
    #[must_use]
    pub fn summary_for(component: &str, current: f64) -> String {
        let state = Self::from_code(current.trunc() as i64).unwrap_or(ServiceState::Unknown);
        format!("{} service is {}", component, state)
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| format!("Unknown service state '{}'", s))
    }
}
