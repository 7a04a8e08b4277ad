//! Client configuration.

use crate::core::domain::{error::ValidationError, model::unit_value::UnitTable};
use governor::Quota;
use std::num::NonZeroU32;
use std::time::Duration;

/// Default time allowed for a single agent request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Request rate limit applied to one client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst_size: u32,
}

impl RateLimitConfig {
    /// Converts into a governor quota. Both values must be non-zero.
    pub(crate) fn quota(&self) -> Result<Quota, ValidationError> {
        let per_second =
            NonZeroU32::new(self.requests_per_second).ok_or_else(|| ValidationError::Field {
                field: "requests_per_second".to_string(),
                message: "Rate limit must allow at least one request per second".to_string(),
            })?;
        let burst = NonZeroU32::new(self.burst_size).ok_or_else(|| ValidationError::Field {
            field: "burst_size".to_string(),
            message: "Burst size must be at least one".to_string(),
        })?;
        Ok(Quota::per_second(per_second).allow_burst(burst))
    }
}

/// Settings shared by every request of an [`NcpaClient`](crate::NcpaClient).
#[derive(Debug, Clone)]
pub struct NcpaConfig {
    pub timeout: Duration,
    pub rate_limit: Option<RateLimitConfig>,
    /// Unit table used to convert `[magnitude, unit]` pairs.
    pub units: UnitTable,
    /// NCPA installs with a self-signed certificate, so this defaults to `true`.
    pub accept_invalid_certs: bool,
}

impl Default for NcpaConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            rate_limit: None,
            units: UnitTable::default(),
            accept_invalid_certs: true,
        }
    }
}
