use serde_json::Value;
use std::fmt;

/// A lenient NCPA listener port.
///
/// The port usually arrives from loosely typed configuration, so conversion
/// never fails: anything that is not a usable integer or a digit-only string
/// falls back to [`NcpaPort::DEFAULT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NcpaPort(u16);

impl NcpaPort {
    /// The port NCPA listens on out of the box.
    pub const DEFAULT: NcpaPort = NcpaPort(5693);

    /// Creates a new port without validation.
    #[cfg(test)]
    pub(crate) fn new_unchecked(port: u16) -> Self {
        Self(port)
    }

    /// Returns the port number.
    #[must_use]
    pub fn get(&self) -> u16 {
        self.0
    }

    fn from_number(port: u64) -> Self {
        match u16::try_from(port) {
            Ok(port) if validate_port(port) => Self(port),
            _ => Self::DEFAULT,
        }
    }
}

impl Default for NcpaPort {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for NcpaPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for NcpaPort {
    fn from(port: u16) -> Self {
        Self::from_number(u64::from(port))
    }
}

impl From<&str> for NcpaPort {
    fn from(port: &str) -> Self {
        if port.is_empty() || !port.chars().all(|c| c.is_ascii_digit()) {
            return Self::DEFAULT;
        }
        port.parse::<u64>()
            .map(Self::from_number)
            .unwrap_or(Self::DEFAULT)
    }
}

impl From<String> for NcpaPort {
    fn from(port: String) -> Self {
        Self::from(port.as_str())
    }
}

impl From<&Value> for NcpaPort {
    fn from(port: &Value) -> Self {
        match port {
            Value::Number(number) => number
                .as_u64()
                .map(Self::from_number)
                .unwrap_or(Self::DEFAULT),
            Value::String(text) => Self::from(text.as_str()),
            _ => Self::DEFAULT,
        }
    }
}

/// Port 0 cannot be connected to; every other port is usable.
pub(crate) fn validate_port(port: u16) -> bool {
    port != 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer_ports() {
        assert_eq!(NcpaPort::from(5693).get(), 5693);
        assert_eq!(NcpaPort::from(8443).get(), 8443);
        assert_eq!(NcpaPort::from(0), NcpaPort::DEFAULT);
    }

    #[test]
    fn test_string_ports() {
        assert_eq!(NcpaPort::from("8443").get(), 8443);
        assert_eq!(NcpaPort::from("not-a-port"), NcpaPort::DEFAULT);
        assert_eq!(NcpaPort::from(""), NcpaPort::DEFAULT);
        assert_eq!(NcpaPort::from("-1"), NcpaPort::DEFAULT);
        assert_eq!(NcpaPort::from("99999"), NcpaPort::DEFAULT);
        assert_eq!(NcpaPort::from(" 80"), NcpaPort::DEFAULT);
    }

    #[test]
    fn test_json_ports() {
        assert_eq!(NcpaPort::from(&json!(8080)).get(), 8080);
        assert_eq!(NcpaPort::from(&json!("8080")).get(), 8080);
        assert_eq!(NcpaPort::from(&json!(5693.5)), NcpaPort::DEFAULT);
        assert_eq!(NcpaPort::from(&json!(null)), NcpaPort::DEFAULT);
        assert_eq!(NcpaPort::from(&json!(-3)), NcpaPort::DEFAULT);
    }
}
