//! Domain models for the `api/memory` node.

use crate::core::domain::model::unit_value::Reading;
use serde::{Deserialize, Serialize};

/// Physical memory, from `api/memory/virtual`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VirtualMemory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Reading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<Reading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free: Option<Reading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used: Option<Reading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<Reading>,
}

/// Swap space, from `api/memory/swap`.
///
/// The whole node is missing when swap is disabled, and Windows agents
/// never report `swapped_in` / `swapped_out`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SwapMemory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Reading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free: Option<Reading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used: Option<Reading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<Reading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swapped_in: Option<Reading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swapped_out: Option<Reading>,
}
