//! Domain models for Nagios plugins run through `api/plugins/{name}`.

use crate::core::domain::model::{
    event::{EVENT_CLASS_NAGIOS, Event, Severity},
    metric::{MetricMap, MetricValue},
};
use serde::{Deserialize, Serialize};

/// Event key used for plugin events unless the caller supplies one.
pub const DEFAULT_PLUGIN_EVENT_KEY: &str = "NcpaPlugin";

/// Raw plugin execution reply.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PluginOutput {
    /// Plugin exit code; `-1` when the agent omits it.
    #[serde(default = "missing_returncode")]
    pub returncode: i64,
    /// First line of plugin output in `STATE TEXT|perfdata` form.
    #[serde(default)]
    pub stdout: String,
}

fn missing_returncode() -> i64 {
    -1
}

/// One parsed line of Nagios plugin output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NagiosPluginResult {
    /// Human-readable state text, everything before the first `|`.
    pub state: String,
    pub severity: Severity,
    /// Performance data with thresholds and unit suffixes removed.
    pub values: MetricMap,
}

/// Metrics and status event derived from one plugin run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginReport {
    /// Parsed performance data plus the `returncode` datapoint.
    pub values: MetricMap,
    pub event: Event,
}

impl PluginReport {
    /// Folds a parsed plugin result into datapoints and a status event.
    pub fn new(
        plugin_name: &str,
        event_key: Option<&str>,
        output: &PluginOutput,
        result: NagiosPluginResult,
    ) -> Self {
        let mut values = result.values;
        values.insert("returncode".to_string(), MetricValue::Int(output.returncode));

        let event = Event::new(result.severity, result.state)
            .component(plugin_name)
            .event_key(event_key.unwrap_or(DEFAULT_PLUGIN_EVENT_KEY))
            .event_class(EVENT_CLASS_NAGIOS);

        Self { values, event }
    }

    /// The report for a plugin run that failed before producing output.
    pub fn from_error(plugin_name: &str, event_key: Option<&str>, error: &impl std::fmt::Display) -> Self {
        let event = Event::new(
            Severity::Error,
            format!("NCPA plugin execution error: {}", error),
        )
        .component(plugin_name)
        .event_key(event_key.unwrap_or(DEFAULT_PLUGIN_EVENT_KEY))
        .event_class(EVENT_CLASS_NAGIOS);

        Self {
            values: MetricMap::new(),
            event,
        }
    }
}
