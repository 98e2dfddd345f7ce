use thiserror::Error;

pub type Result<T> = std::result::Result<T, XError>;

#[derive(Debug, Error)]
pub enum XError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    /// The request succeeded but the response carried no confirmation payload.
    #[error("No confirmation from X: {0}")]
    NoConfirmation(&'static str),
}

impl From<reqwest::Error> for XError {
    fn from(err: reqwest::Error) -> Self {
        XError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for XError {
    fn from(err: serde_json::Error) -> Self {
        XError::Parse(err.to_string())
    }
}
