use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("DeepSeek API key is required")]
    MissingApiKey,

    #[error("API call timed out after {secs}s, check the network connection")]
    Timeout { secs: u64 },

    #[error("DeepSeek API error ({status}): {body}")]
    Status { status: u16, body: String },

    // The message carries the cause; it is not also chained as a source.
    #[error("request to DeepSeek API failed: {0}")]
    Transport(reqwest::Error),

    #[error("malformed API response: {0}")]
    MalformedResponse(String),

    #[error("DeepSeek API call failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<LlmError> },

    /// Failure injected by [`crate::MockProvider`].
    #[error("{0}")]
    Scripted(String),
}

impl LlmError {
    /// Classify a reqwest failure, keeping timeouts distinct from other transport errors.
    pub(crate) fn from_transport(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            LlmError::Timeout { secs: timeout_secs }
        } else {
            LlmError::Transport(err)
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, LlmError::Timeout { .. })
    }
}
