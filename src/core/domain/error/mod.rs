use serde_json::Value;
use thiserror::Error;

/// Message used when the agent returns an `error` object without a `message`.
pub const UNKNOWN_AGENT_ERROR: &str = "An unknown NCPA error occurred";

/// The main error type for NCPA operations.
///
/// This enum represents every failure the crate can report: errors the
/// agent itself returned in its JSON body, transport failures, and
/// validation failures of caller-supplied configuration.
#[derive(Error, Debug)]
pub enum NcpaError {
    /// The agent rejected the API token
    ///
    /// # Fields
    /// * `0` - The message returned by the agent
    #[error("{0}")]
    IncorrectCredentials(String),

    /// The agent does not know the requested API node
    ///
    /// # Fields
    /// * `message` - The message returned by the agent
    /// * `node` - The node name the agent could not resolve (empty if not reported)
    /// * `path` - The API path the agent could not resolve (empty if not reported)
    #[error("{message}")]
    NodeNotFound {
        message: String,
        node: String,
        path: String,
    },

    /// Any other error reply from the agent
    ///
    /// # Fields
    /// * `0` - The message returned by the agent
    #[error("{0}")]
    Agent(String),

    /// Represents errors that occur while talking to the agent
    ///
    /// # Fields
    /// * `0` - A description of what went wrong
    #[error("Connection error: {0}")]
    Connection(String),

    /// Represents validation failures with detailed context
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Why client settings or an agent error object were rejected.
///
/// Covers a missing or malformed host, an empty token or plugin name, a zero
/// rate limit, a process or inventory pattern that does not compile, and an
/// agent error object missing a key it must carry.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A required setting is missing or unusable, e.g. `host`, `token`,
    /// `burst_size`, or a `node` key absent from an agent error object.
    #[error("Field '{field}' validation failed: {message}")]
    Field { field: String, message: String },

    /// Text that does not parse: a host or URL, or a regex.
    #[error("Format error: {0}")]
    Format(String),

    /// A value outside its allowed range, such as an over-long host name.
    #[error("Domain constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Type alias for Results that may fail with a NcpaError
pub type NcpaResult<T> = Result<T, NcpaError>;

/// Inspects a decoded agent reply for a top-level `error` key.
///
/// Returns `None` when the reply carries no error. The agent exposes no
/// machine-readable error codes, so the message text is matched
/// case-insensitively, credentials first, then unknown node, then the
/// generic fallback.
pub fn classify_error(output: &Value) -> Option<NcpaError> {
    let error = output.get("error")?;

    let message = match error {
        Value::Object(fields) => match fields.get("message") {
            Some(Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => UNKNOWN_AGENT_ERROR.to_string(),
        },
        Value::String(message) => message.clone(),
        other => other.to_string(),
    };
    let lowered = message.to_lowercase();

    if lowered.contains("incorrect credentials") {
        return Some(NcpaError::IncorrectCredentials(message));
    }

    if lowered.contains("node requested does not exist") {
        return Some(match error {
            Value::Object(fields) => match (
                required_text(fields.get("node"), "node"),
                required_text(fields.get("path"), "path"),
            ) {
                (Ok(node), Ok(path)) => NcpaError::NodeNotFound {
                    message,
                    node,
                    path,
                },
                (Err(e), _) | (_, Err(e)) => e.into(),
            },
            _ => NcpaError::NodeNotFound {
                message,
                node: String::new(),
                path: String::new(),
            },
        });
    }

    Some(NcpaError::Agent(message))
}

/// Fails with the classified error if the reply carries one.
pub fn error_check(output: &Value) -> NcpaResult<()> {
    match classify_error(output) {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

fn required_text(value: Option<&Value>, field: &str) -> Result<String, ValidationError> {
    match value {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(other) => Ok(other.to_string()),
        None => Err(ValidationError::Field {
            field: field.to_string(),
            message: "Missing from the agent's node-not-found error".to_string(),
        }),
    }
}
