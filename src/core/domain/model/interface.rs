//! Domain model for the `api/interface` node.

use crate::core::domain::model::unit_value::Reading;
use serde::{Deserialize, Serialize};

/// Counters for one network interface.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NetworkInterface {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_recv: Option<Reading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_sent: Option<Reading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dropin: Option<Reading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dropout: Option<Reading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errin: Option<Reading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errout: Option<Reading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packets_recv: Option<Reading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packets_sent: Option<Reading>,
}
