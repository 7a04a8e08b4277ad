//! Normalized metric values and the containers the normalizer fills.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A single numeric datapoint value.
///
/// Byte counts and counters stay integral; percentages stay fractional.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Int(i64),
    Float(f64),
}

impl MetricValue {
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            MetricValue::Int(value) => *value as f64,
            MetricValue::Float(value) => *value,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetricValue::Int(value) => Some(*value),
            MetricValue::Float(_) => None,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Int(value) => write!(f, "{}", value),
            MetricValue::Float(value) => write!(f, "{}", value),
        }
    }
}

impl From<i64> for MetricValue {
    fn from(value: i64) -> Self {
        MetricValue::Int(value)
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Float(value)
    }
}

/// Datapoint name to value.
pub type MetricMap = BTreeMap<String, MetricValue>;

/// Identifies the component a set of metrics belongs to.
///
/// `source` names the kind of component (`cpu`, `intf`, `disk-physical`, ...)
/// and `component` its id, e.g. the core index `"0"` or an interface name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentKey {
    pub source: String,
    pub component: String,
}

impl ComponentKey {
    pub fn new(source: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            component: component.into(),
        }
    }
}

/// The metrics extracted from one agent response.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedMetrics {
    device: MetricMap,
    #[serde(serialize_with = "serialize_components")]
    components: BTreeMap<ComponentKey, MetricMap>,
}

/// JSON object keys must be strings, so components nest as `source -> component -> metrics`.
fn serialize_components<S: Serializer>(
    components: &BTreeMap<ComponentKey, MetricMap>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut nested: BTreeMap<&str, BTreeMap<&str, &MetricMap>> = BTreeMap::new();
    for (key, metrics) in components {
        nested
            .entry(key.source.as_str())
            .or_default()
            .insert(key.component.as_str(), metrics);
    }
    nested.serialize(serializer)
}

impl NormalizedMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_device(&mut self, name: &str, value: impl Into<MetricValue>) {
        self.device.insert(name.to_string(), value.into());
    }

    pub(crate) fn set_component(
        &mut self,
        source: &str,
        component: &str,
        name: &str,
        value: impl Into<MetricValue>,
    ) {
        self.components
            .entry(ComponentKey::new(source, component))
            .or_default()
            .insert(name.to_string(), value.into());
    }

    /// Device-level metrics.
    #[must_use]
    pub fn device(&self) -> &MetricMap {
        &self.device
    }

    /// A device-level metric, if it was produced.
    #[must_use]
    pub fn device_value(&self, name: &str) -> Option<MetricValue> {
        self.device.get(name).copied()
    }

    /// All metrics of one component.
    #[must_use]
    pub fn component(&self, source: &str, component: &str) -> Option<&MetricMap> {
        self.components.get(&ComponentKey::new(source, component))
    }

    /// A component metric, if it was produced.
    #[must_use]
    pub fn component_value(&self, source: &str, component: &str, name: &str) -> Option<MetricValue> {
        self.component(source, component)
            .and_then(|metrics| metrics.get(name))
            .copied()
    }

    /// Component ids reported for a source, in sorted order.
    pub fn components_of<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.components
            .keys()
            .filter(move |key| key.source == source)
            .map(|key| key.component.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.device.is_empty() && self.components.is_empty()
    }

    /// Flattens into a single name to value mapping.
    ///
    /// Device metrics keep their names; component metrics are addressed as
    /// `source/component/name`.
    #[must_use]
    pub fn flatten(&self) -> MetricMap {
        let mut flat = self.device.clone();
        for (key, metrics) in &self.components {
            for (name, value) in metrics {
                flat.insert(format!("{}/{}/{}", key.source, key.component, name), *value);
            }
        }
        flat
    }
}

/// Turns a raw agent name into a component id.
///
/// Characters outside `[A-Za-z0-9-_,.$() ]` become `_`, and leading or
/// trailing underscores are trimmed. An id that ends up empty becomes `-`.
#[must_use]
pub fn prep_id(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || "-_,.$() ".contains(c) {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = replaced.trim_matches('_');
    if trimmed.is_empty() {
        "-".to_string()
    } else {
        trimmed.to_string()
    }
}
