//! Domain models for the `api/disk` node.

use crate::core::domain::model::unit_value::Reading;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A mounted filesystem from `api/disk/logical`.
///
/// The agent keys filesystems by mount point with `/` replaced by `|`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LogicalDisk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Reading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used: Option<Reading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free: Option<Reading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_percent: Option<Reading>,
    /// Backing device; a one-element list on current agents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fstype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opts: Option<String>,
}

impl LogicalDisk {
    /// The backing device name, whichever shape the agent used.
    #[must_use]
    pub fn device(&self) -> Option<String> {
        match self.device_name.as_ref()? {
            Value::String(name) => Some(name.clone()),
            Value::Array(names) => names.first().and_then(Value::as_str).map(str::to_string),
            _ => None,
        }
    }
}

/// A block device from `api/disk/physical`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PhysicalDisk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_count: Option<Reading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_count: Option<Reading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_bytes: Option<Reading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_bytes: Option<Reading>,
}

/// Converts an agent filesystem key into its mount path.
///
/// `|home` becomes `/home`; Windows drive keys such as `C:|` lose the bar.
#[must_use]
pub fn mount_path(key: &str) -> String {
    let replacement = if key.starts_with('|') { "/" } else { "" };
    key.replace('|', replacement)
}

/// Block size assumed when the size gives nothing away.
pub const DEFAULT_BLOCK_SIZE: i64 = 4096;

/// Best guess at a filesystem block size from its total size in bytes.
///
/// The agent does not report block sizes. Sizes tend to be rounded to the
/// block size, so the guess is the largest power of two between 2^9 and
/// 2^15 that still divides `bytes`; when even 2^16 divides it, or the size
/// is unknown, [`DEFAULT_BLOCK_SIZE`] is used.
#[must_use]
pub fn guess_block_size(bytes: i64) -> i64 {
    if bytes > 0 {
        for shift in 10..17 {
            if bytes % (1i64 << shift) != 0 {
                return 1 << (shift - 1);
            }
        }
    }
    DEFAULT_BLOCK_SIZE
}
