//! Domain models for the `api/processes` list.

use crate::core::domain::model::unit_value::{Reading, UnitTable};
use serde::{Deserialize, Serialize};

/// Name the Windows agent gives the idle pseudo-process.
///
/// It always reports close to 100% CPU, so it is left out of CPU sums and
/// process counts.
pub const SYSTEM_IDLE_PROCESS: &str = "System Idle Process";

/// Command lines come back as one string, or as an argv list on some agents.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CommandLine {
    Text(String),
    Parts(Vec<String>),
}

impl CommandLine {
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            CommandLine::Text(text) => text.clone(),
            CommandLine::Parts(parts) => parts.join(" "),
        }
    }
}

/// One entry of `api/processes`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProcessInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmd: Option<CommandLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mem_rss: Option<Reading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mem_vms: Option<Reading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mem_percent: Option<Reading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_percent: Option<Reading>,
}

impl ProcessInfo {
    #[must_use]
    pub fn is_system_idle(&self) -> bool {
        self.name.as_deref() == Some(SYSTEM_IDLE_PROCESS)
    }

    /// The text used to match a process against process classes.
    ///
    /// Prefers the command line, then the executable, then the name; the
    /// agent reports `Unknown` where it could not read a value.
    #[must_use]
    pub fn process_text(&self) -> Option<String> {
        let usable = |text: &str| {
            let text = text.trim();
            (!text.is_empty() && text != "Unknown").then(|| text.to_string())
        };

        self.cmd
            .as_ref()
            .and_then(|cmd| usable(&cmd.to_text()))
            .or_else(|| self.exe.as_deref().and_then(usable))
            .or_else(|| self.name.as_deref().and_then(usable))
    }
}

/// The per-process figures used for process-class aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessEntry {
    pub pid: u32,
    /// Resident memory in bytes.
    pub rss: i64,
    /// Current CPU percent; the agent reports utilisation, not CPU time.
    pub cpu: f64,
    pub process_text: String,
}

impl ProcessEntry {
    /// Extracts the aggregation figures, or `None` if a required field is missing.
    #[must_use]
    pub fn from_info(info: &ProcessInfo, units: &UnitTable) -> Option<Self> {
        Some(Self {
            pid: info.pid?,
            rss: info.mem_rss.as_ref()?.canonical(units)?,
            cpu: info.cpu_percent.as_ref()?.magnitude()?,
            process_text: info.process_text()?,
        })
    }
}
