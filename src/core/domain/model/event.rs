//! Status events produced alongside metrics.

use serde::{Deserialize, Serialize};

/// Event class for Nagios plugin results.
pub const EVENT_CLASS_NAGIOS: &str = "/Status/Nagios";
/// Event class for process monitoring.
pub const EVENT_CLASS_OS_PROCESS: &str = "/Status/OSProcess";

/// Event severity on the monitoring side's 0-5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Clear,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Severity::Clear => 0,
            Severity::Debug => 1,
            Severity::Info => 2,
            Severity::Warning => 3,
            Severity::Error => 4,
            Severity::Critical => 5,
        }
    }
}

/// A status event for the caller's event pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Component the event is about; `None` for device-level events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    pub severity: Severity,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_group: Option<String>,
}

impl Event {
    pub fn new(severity: Severity, summary: impl Into<String>) -> Self {
        Self {
            component: None,
            severity,
            summary: summary.into(),
            event_key: None,
            event_class: None,
            event_group: None,
        }
    }

    #[must_use]
    pub fn component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    #[must_use]
    pub fn event_key(mut self, key: impl Into<String>) -> Self {
        self.event_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn event_class(mut self, class: impl Into<String>) -> Self {
        self.event_class = Some(class.into());
        self
    }

    #[must_use]
    pub fn event_group(mut self, group: impl Into<String>) -> Self {
        self.event_group = Some(group.into());
        self
    }
}
