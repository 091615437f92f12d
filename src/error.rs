use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChatError {
    /// Required settings are missing; raised before any network call.
    #[error("{0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    /// A structured or non-2xx error returned by one of the APIs.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("Could not read the response: {0}")]
    Decode(String),

    /// The caller aborted the request. Not shown to the user.
    #[error("Request cancelled")]
    Cancelled,
}

impl ChatError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ChatError::Cancelled)
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ChatError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ChatError::Decode(err.to_string())
        } else {
            ChatError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
