use thiserror::Error;

/// Failures reported by the chat clients.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The endpoint answered with a non-success status.
    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The request could not be sent or its response could not be received.
    #[error("Failed to connect to API endpoint {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body broke off while streaming.
    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Failed to decode chat response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request was aborted through its cancellation handle.
    #[error("Request was cancelled")]
    Cancelled,

    #[error(
        "No API key configured\n\n\
         Set it with:\n  \
         oxygen settings set openai.apiKey sk-...\n\
         or export OXYGEN_API_KEY"
    )]
    MissingApiKey,
}

impl ChatError {
    /// HTTP status carried by the error, if any.
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let err = ChatError::Status {
            status: 401,
            body: "invalid api key".to_string(),
        };
        assert_eq!(err.status_code(), Some(401));
        assert_eq!(
            err.to_string(),
            "API request failed with status 401: invalid api key"
        );
    }

    #[test]
    fn test_cancelled_has_no_status() {
        assert!(ChatError::Cancelled.is_cancelled());
        assert_eq!(ChatError::Cancelled.status_code(), None);
    }
}
