//! Parser for Nagios plugin output lines (`STATE TEXT|key=value;warn;crit ...`).

use crate::core::domain::model::{
    event::Severity,
    metric::{MetricMap, MetricValue},
    plugin_result::NagiosPluginResult,
};
use tracing::debug;

/// Parses the first line of Nagios plugin output.
///
/// Everything before the first `|` is the state text; everything after it is
/// performance data. Thresholds are dropped, unit suffixes stripped, and a
/// token survives only if it is `key=value` with a numeric value.
///
/// # Examples
///
/// ```
/// use ncpa_agent::{MetricValue, Severity, parse_plugin_output};
///
/// let result = parse_plugin_output("OK|used=42%;80;90");
/// assert_eq!(result.state, "OK");
/// assert_eq!(result.severity, Severity::Clear);
/// assert_eq!(result.values.get("used"), Some(&MetricValue::Int(42)));
/// ```
pub fn parse_plugin_output(line: &str) -> NagiosPluginResult {
    let line = line.lines().next().unwrap_or_default();
    let (state, perfdata) = line.split_once('|').unwrap_or((line, ""));
    let state = state.trim();

    NagiosPluginResult {
        state: state.to_string(),
        severity: severity_of(state),
        values: parse_perfdata(perfdata),
    }
}

/// Derives the event severity from the state text.
///
/// The checks are substring matches applied in order, so a line mentioning
/// both `WARNING` and `CRITICAL` is a warning. Text without any of the
/// known words is treated as a warning rather than an error.
#[must_use]
pub fn severity_of(state: &str) -> Severity {
    let state = state.to_uppercase();
    if state.contains("WARNING") {
        Severity::Warning
    } else if state.contains("CRITICAL") {
        Severity::Error
    } else if !state.contains("OK") {
        Severity::Warning
    } else {
        Severity::Clear
    }
}

fn parse_perfdata(perfdata: &str) -> MetricMap {
    let mut values = MetricMap::new();

    // Thresholds become separate tokens without `=` and fall away.
    for token in perfdata_tokens(&perfdata.replace(';', " ")) {
        let Some((key, raw)) = token.split_once('=') else {
            continue;
        };
        if key.is_empty() {
            continue;
        }

        match parse_value(raw) {
            Some(value) => {
                values.insert(key.to_string(), value);
            }
            None => debug!(token, "Dropping perfdata token without a numeric value"),
        }
    }

    values
}

/// Splits on whitespace, except inside a single-quoted label such as `'rta ms'=1`.
/// Labels are kept as written, quotes included.
fn perfdata_tokens(perfdata: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = None;
    let mut quoted = false;

    for (index, c) in perfdata.char_indices() {
        match c {
            '\'' => {
                quoted = !quoted;
                start.get_or_insert(index);
            }
            c if c.is_whitespace() && !quoted => {
                if let Some(from) = start.take() {
                    tokens.push(&perfdata[from..index]);
                }
            }
            _ => {
                start.get_or_insert(index);
            }
        }
    }
    if let Some(from) = start {
        tokens.push(&perfdata[from..]);
    }

    tokens
}

fn parse_value(raw: &str) -> Option<MetricValue> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-' || *c == '.')
        .collect();

    if cleaned.is_empty() {
        None
    } else if cleaned.contains('.') {
        cleaned.parse::<f64>().ok().map(MetricValue::Float)
    } else {
        cleaned.parse::<i64>().ok().map(MetricValue::Int)
    }
}
