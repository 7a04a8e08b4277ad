use crate::core::domain::error::ValidationError;
use std::fmt;
use std::net::Ipv6Addr;

const MAX_HOST_LENGTH: usize = 253;

/// A validated agent host: a DNS name, an IPv4 address or a bracketed IPv6 address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NcpaHost(String);

impl NcpaHost {
    /// Creates a new host after validation.
    ///
    /// Bare IPv6 literals (`::1`) are accepted and stored bracketed (`[::1]`)
    /// so they can be placed directly into a URL authority.
    pub fn new(host: impl Into<String>) -> Result<Self, ValidationError> {
        let host = normalize_host(host.into().trim());
        validate_host(&host)?;
        Ok(Self(host))
    }

    /// Creates a new host without validation.
    #[cfg(test)]
    pub(crate) fn new_unchecked(host: String) -> Self {
        Self(host)
    }

    /// Returns the host as it appears in a URL authority.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NcpaHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn normalize_host(host: &str) -> String {
    if host.parse::<Ipv6Addr>().is_ok() {
        format!("[{}]", host)
    } else {
        host.to_string()
    }
}

/// Validates a host string.
pub(crate) fn validate_host(host: &str) -> Result<(), ValidationError> {
    if host.is_empty() {
        return Err(ValidationError::Field {
            field: "host".to_string(),
            message: "Host cannot be empty".to_string(),
        });
    }

    if host.len() > MAX_HOST_LENGTH {
        return Err(ValidationError::ConstraintViolation(format!(
            "Host length exceeds maximum of {} characters",
            MAX_HOST_LENGTH
        )));
    }

    url::Host::parse(host)
        .map_err(|e| ValidationError::Format(format!("Invalid host '{}': {}", host, e)))?;

    Ok(())
}
