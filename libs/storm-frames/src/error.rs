use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("storm error: {message}")]
    RemoteQuery { code: String, message: String },
    #[error("json {0}")]
    Json(#[from] serde_json::Error),
    #[error("io {0}")]
    Io(#[from] std::io::Error),
    #[error("arrow {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("toml parsing failed {0}")]
    Toml(#[from] toml::de::Error),
    #[error("time {0}")]
    Time(#[from] jiff::Error),
}

impl Error {
    pub fn remote(code: impl ToString, message: impl ToString) -> Self {
        Error::RemoteQuery {
            code: code.to_string(),
            message: message.to_string(),
        }
    }

    /// The remote-supplied message, when this error came from the store.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Error::RemoteQuery { message, .. } => Some(message),
            _ => None,
        }
    }
}
