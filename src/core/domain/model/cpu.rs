//! Domain model for the `api/cpu` node.

use crate::core::domain::model::unit_value::Reading;
use serde::{Deserialize, Serialize};

/// CPU figures returned by `api/cpu` and its children.
///
/// `percent` is a per-core series (`[[v0, v1, ...], "%"]`), or a
/// one-element series when requested with `aggregate=avg`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CpuNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<Reading>,
    /// Core count; a per-socket series on some platforms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<Reading>,
}

impl CpuNode {
    /// Cores per socket. A scalar count is treated as a single socket.
    #[must_use]
    pub fn cores_per_socket(&self) -> Vec<u32> {
        self.count
            .as_ref()
            .map(|count| {
                count
                    .series()
                    .into_iter()
                    .filter(|cores| *cores >= 0.0)
                    .map(|cores| cores as u32)
                    .collect()
            })
            .unwrap_or_default()
    }
}
