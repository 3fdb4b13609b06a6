//! Error types for the chat pipeline

/// Result type for chat operations.
pub type Result<T> = std::result::Result<T, ChatError>;

/// Errors surfaced by the chat pipeline.
///
/// Knowledge retrieval never produces one of these; a failed search is treated
/// as "no match" and the question goes to the LLM unaugmented.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// No API key was configured for the completion service
    #[error("No API key configured (set DEEPSEEK_API_KEY or pass --api-key)")]
    MissingApiKey,

    /// Configuration is invalid
    #[error("Invalid chat configuration: {message}")]
    InvalidConfig { message: String },

    /// The completion service could not be reached or decoded
    #[error("Completion request failed: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    /// The completion service answered with a non-success status
    #[error("Completion API returned {status}: {body}")]
    ApiStatus { status: u16, body: String },

    /// The completion service answered without any usable text
    #[error("The API returned no usable reply, please try again later")]
    EmptyReply,

    /// No session with the given id exists
    #[error("Session not found: {id}")]
    SessionNotFound { id: String },
}

impl ChatError {
    /// Create an invalid configuration error with a custom message.
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ChatError::invalid_config("temperature out of range");
        assert_eq!(
            err.to_string(),
            "Invalid chat configuration: temperature out of range"
        );

        let err = ChatError::ApiStatus {
            status: 401,
            body: "unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "Completion API returned 401: unauthorized");
    }
}
