use crate::core::domain::error::ValidationError;
use std::fmt;

/// The NCPA API token.
///
/// The token travels in the query string, so it is redacted from `Debug`
/// output and from every URL the crate logs.
#[derive(Clone, PartialEq, Eq)]
pub struct NcpaToken(String);

impl NcpaToken {
    /// Creates a new token after validation.
    pub fn new(token: impl Into<String>) -> Result<Self, ValidationError> {
        let token = token.into();
        validate_token(&token)?;
        Ok(Self(token))
    }

    /// Creates a new token without validation.
    #[cfg(test)]
    pub(crate) fn new_unchecked(token: String) -> Self {
        Self(token)
    }

    /// Returns the token value as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for NcpaToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NcpaToken(***)")
    }
}

/// Validates a token string.
pub(crate) fn validate_token(token: &str) -> Result<(), ValidationError> {
    if token.trim().is_empty() {
        return Err(ValidationError::Field {
            field: "token".to_string(),
            message: "Token cannot be empty".to_string(),
        });
    }
    Ok(())
}
