use crate::config::ConfigError;
use crate::constants::status;
use crate::decode::DecodeError;
use crate::range::RangeError;
use std::io;
use thiserror::Error;

/// Boxed error produced by external collaborators such as view engines, storage and codecs.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error returned by handlers and surfaced to the application's error handler.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{message}")]
    Http { status: u16, message: String },
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("render: {0}")]
    Render(#[source] BoxError),
    #[error("codec: {0}")]
    Codec(#[source] BoxError),
    #[error("format: at least one handler is required")]
    NoHandlers,
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Error carrying an explicit status; the message becomes the response body.
    pub fn new<M: Into<String>>(status: u16, message: M) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Error whose body is the standard reason phrase of `status`.
    pub fn from_status(status: u16) -> Self {
        Self::new(status, status::reason(status))
    }

    pub fn status(&self) -> u16 {
        match self {
            Error::Http { status, .. } => *status,
            Error::Decode(err) => err.status().unwrap_or(400),
            Error::Range(RangeError::Malformed) => 400,
            Error::Range(RangeError::Unsatisfiable) => status::RANGE_NOT_SATISFIABLE,
            _ => status::INTERNAL_SERVER_ERROR,
        }
    }
}
