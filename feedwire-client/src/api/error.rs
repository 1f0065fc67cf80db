use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with an `error` field
    #[error("Server rejected the action: {0}")]
    Application(String),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Response is not JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Message the server wants shown to the user, if it sent one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Application(message) => Some(message),
            _ => None,
        }
    }

    /// Whether the failure happened below the application protocol
    pub fn is_transport(&self) -> bool {
        !matches!(self, ApiError::Application(_))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
