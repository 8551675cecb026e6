use thiserror::Error;

/// Errors raised while building or coercing model values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// A table or topic name contained something other than plain identifier parts.
    #[error("Invalid identifier '{0}': expected 1 to 3 dot-separated parts of [A-Za-z0-9_]")]
    InvalidIdentifier(String),

    /// The message payload was not a JSON object.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// A required field was absent or null.
    #[error("Missing field '{0}'")]
    MissingField(&'static str),

    /// A field was present but could not be coerced to the column type.
    #[error("Cannot coerce field '{field}' value {value} to {target}")]
    Coercion {
        field: &'static str,
        value: String,
        target: &'static str,
    },
}
