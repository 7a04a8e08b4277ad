//! Unit handling for the `[magnitude, unit]` pairs the agent returns.
//!
//! Every sized quantity in the NCPA API is reported as a pair such as
//! `[1024, "KiB"]`. This module defines the fixed unit vocabulary, the
//! conversion table used to turn pairs into canonical magnitudes, and the
//! [`Reading`] leaf type that tells pairs apart from bare numbers.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A unit of the agent's size vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Unit {
    B,
    KB,
    MB,
    GB,
    TB,
    PB,
    KiB,
    MiB,
    GiB,
    TiB,
    PiB,
}

impl Unit {
    /// Every known unit.
    pub const ALL: [Unit; 11] = [
        Unit::B,
        Unit::KB,
        Unit::MB,
        Unit::GB,
        Unit::TB,
        Unit::PB,
        Unit::KiB,
        Unit::MiB,
        Unit::GiB,
        Unit::TiB,
        Unit::PiB,
    ];

    /// Binary multiples for `*iB`, decimal multiples for `*B`.
    #[must_use]
    pub fn multiplier(self) -> f64 {
        match self {
            Unit::B => 1.0,
            Unit::KB => 1e3,
            Unit::MB => 1e6,
            Unit::GB => 1e9,
            Unit::TB => 1e12,
            Unit::PB => 1e15,
            Unit::KiB => 1024.0,
            Unit::MiB => 1024f64.powi(2),
            Unit::GiB => 1024f64.powi(3),
            Unit::TiB => 1024f64.powi(4),
            Unit::PiB => 1024f64.powi(5),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::B => "B",
            Unit::KB => "KB",
            Unit::MB => "MB",
            Unit::GB => "GB",
            Unit::TB => "TB",
            Unit::PB => "PB",
            Unit::KiB => "KiB",
            Unit::MiB => "MiB",
            Unit::GiB => "GiB",
            Unit::TiB => "TiB",
            Unit::PiB => "PiB",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::ALL
            .into_iter()
            .find(|unit| unit.as_str() == s)
            .ok_or_else(|| format!("Unknown unit '{}'", s))
    }
}

/// Converts a magnitude in the given unit to its canonical integer value.
///
/// Unknown or empty units use a multiplier of 1 and never fail: the agent's
/// unit vocabulary cannot be enumerated in advance (`%`, `s`, `users`, ...).
#[must_use]
pub fn convert(magnitude: f64, unit: &str) -> i64 {
    let multiplier = unit.parse::<Unit>().map(Unit::multiplier).unwrap_or(1.0);
    (magnitude * multiplier).floor() as i64
}

/// A declared unit-conversion table.
///
/// Defaults to the multipliers of [`Unit`]; callers may add or override
/// entries for agents that report non-standard unit names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitTable {
    multipliers: BTreeMap<String, f64>,
}

impl Default for UnitTable {
    fn default() -> Self {
        Self {
            multipliers: Unit::ALL
                .iter()
                .map(|unit| (unit.as_str().to_string(), unit.multiplier()))
                .collect(),
        }
    }
}

impl UnitTable {
    /// Adds or replaces the multiplier for a unit name.
    #[must_use]
    pub fn with_multiplier(mut self, unit: impl Into<String>, multiplier: f64) -> Self {
        self.multipliers.insert(unit.into(), multiplier);
        self
    }

    /// Returns the multiplier for a unit name, 1 when unknown.
    #[must_use]
    pub fn multiplier(&self, unit: &str) -> f64 {
        self.multipliers.get(unit).copied().unwrap_or(1.0)
    }

    /// `floor(magnitude * multiplier(unit))`.
    #[must_use]
    pub fn convert(&self, magnitude: f64, unit: &str) -> i64 {
        (magnitude * self.multiplier(unit)).floor() as i64
    }
}

/// A `(magnitude, unit)` pair as returned by the agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitValue {
    pub magnitude: f64,
    pub unit: String,
}

impl UnitValue {
    pub fn new(magnitude: f64, unit: impl Into<String>) -> Self {
        Self {
            magnitude,
            unit: unit.into(),
        }
    }

    /// Converts with the default table.
    #[must_use]
    pub fn canonical(&self) -> i64 {
        convert(self.magnitude, &self.unit)
    }

    /// Converts with a caller-declared table.
    #[must_use]
    pub fn canonical_with(&self, table: &UnitTable) -> i64 {
        table.convert(self.magnitude, &self.unit)
    }
}

/// A numeric leaf of an agent response.
///
/// The agent is not consistent about leaf shapes: most quantities are
/// `[magnitude, unit]` pairs, some are bare numbers, single-element lists
/// show up for unit-less counts, and per-core CPU figures arrive as
/// `[[v0, v1, ...], unit]`. The root endpoint reports nodes it did not
/// compute as `[]`, which becomes an empty series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Reading {
    Scalar(f64),
    Pair(UnitValue),
    Series(Vec<f64>, String),
}

impl Reading {
    /// The raw magnitude, without unit conversion.
    ///
    /// For a series this is the first element, which is what the
    /// aggregated (`aggregate=avg`) endpoints return.
    #[must_use]
    pub fn magnitude(&self) -> Option<f64> {
        match self {
            Reading::Scalar(value) => Some(*value),
            Reading::Pair(pair) => Some(pair.magnitude),
            Reading::Series(values, _) => values.first().copied(),
        }
    }

    /// The magnitude converted to canonical units.
    ///
    /// Only pairs go through the unit table; bare scalars are floored as-is.
    #[must_use]
    pub fn canonical(&self, table: &UnitTable) -> Option<i64> {
        match self {
            Reading::Pair(pair) => Some(pair.canonical_with(table)),
            Reading::Scalar(value) => Some(value.floor() as i64),
            Reading::Series(..) => None,
        }
    }

    /// The per-index values of a series; a lone magnitude is a one-element series.
    #[must_use]
    pub fn series(&self) -> Vec<f64> {
        match self {
            Reading::Series(values, _) => values.clone(),
            other => other.magnitude().into_iter().collect(),
        }
    }
}

impl<'de> Deserialize<'de> for Reading {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape {
            Empty([f64; 0]),
            Scalar(f64),
            Pair(f64, Option<String>),
            Bare([f64; 1]),
            Series(Vec<f64>, Option<String>),
            BareSeries([Vec<f64>; 1]),
        }

        Ok(match Shape::deserialize(deserializer)? {
            Shape::Empty([]) => Reading::Series(Vec::new(), String::new()),
            Shape::Scalar(value) => Reading::Scalar(value),
            Shape::Pair(magnitude, unit) => {
                Reading::Pair(UnitValue::new(magnitude, unit.unwrap_or_default()))
            }
            Shape::Bare([magnitude]) => Reading::Pair(UnitValue::new(magnitude, "")),
            Shape::Series(values, unit) => Reading::Series(values, unit.unwrap_or_default()),
            Shape::BareSeries([values]) => Reading::Series(values, String::new()),
        })
    }
}
