//! Structured error types for the mietwerk engine.
//!
//! Three variants cover the real error sources: validation failures caught
//! before rendering (a deposit over the legal cap, a missing required field),
//! resource failures that degrade gracefully at the point of use, and
//! malformed content plans, which are programmer errors and fatal.

use thiserror::Error;

/// The unified error type returned by all public API functions.
#[derive(Debug, Error)]
pub enum MietwerkError {
    /// Input data violates a legal or structural rule. Rendering does not
    /// proceed when one of these is raised.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// An external resource (image, font metrics) could not be used. These
    /// are normally degraded at the point of use and reported as warnings;
    /// this variant exists for callers that choose to treat them as fatal.
    #[error("Resource error: {message}")]
    Resource { message: String },

    /// A content plan operation is malformed. Carries the index of the
    /// offending operation. Not recoverable.
    #[error("Invalid content plan at op {index}: {message}")]
    Plan { index: usize, message: String },
}

impl MietwerkError {
    pub fn validation(message: impl Into<String>) -> Self {
        MietwerkError::Validation {
            message: message.into(),
        }
    }

    pub fn resource(message: impl Into<String>) -> Self {
        MietwerkError::Resource {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for MietwerkError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                " Check for trailing commas, missing quotes, or unescaped characters."
            }
            serde_json::error::Category::Data => {
                " The JSON is valid but doesn't match the expected schema. Check field names and types."
            }
            serde_json::error::Category::Eof => " Unexpected end of input. Is the JSON truncated?",
            serde_json::error::Category::Io => "",
        };
        MietwerkError::Validation {
            message: format!("Failed to parse input: {}.{}", e, hint),
        }
    }
}
