//! Remote model error types.

use thiserror::Error;

/// Longest slice of an error body kept in [`ProviderError::Api`].
const MAX_ERROR_BODY: usize = 512;

/// Failures contacting the remote model. All of them end the current turn.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = match body.char_indices().nth(MAX_ERROR_BODY) {
            Some((cut, _)) => format!("{}...", &body[..cut]),
            None => body.to_string(),
        };
        ProviderError::Api { status, message }
    }

    /// Whether a retry could plausibly succeed. Only used for log context;
    /// turns are never retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Api { status, .. } => *status == 429 || *status >= 500,
            ProviderError::Network(_) => true,
            ProviderError::InvalidResponse(_) => false,
        }
    }
}
