//! Domain models for the `api/system` and `api/user` nodes.

use crate::core::domain::model::unit_value::Reading;
use serde::{Deserialize, Serialize};

/// Host identification and uptime.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SystemInfo {
    /// Uptime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<Reading>,
    /// Host name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    /// Platform name (`Linux`, `Windows`, `Darwin`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processor: Option<String>,
}

/// Logged-in users.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UserInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<Reading>,
}
