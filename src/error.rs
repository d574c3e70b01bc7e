use thiserror::Error;

pub use anyhow::Context;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
    /// The remote answered with its own envelope but a non-success status.
    /// The raw envelope stays attached so callers can inspect remote codes.
    #[error("quote API error (ret={ret}): {message}")]
    Remote {
        ret: i64,
        message: String,
        body: serde_json::Value,
    },
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn message<T: Into<String>>(msg: T) -> Self {
        AppError::Message(msg.into())
    }

    pub fn remote(ret: i64, message: impl Into<String>, body: serde_json::Value) -> Self {
        AppError::Remote {
            ret,
            message: message.into(),
            body,
        }
    }

    /// Envelope status code when this error carries one.
    pub fn remote_ret(&self) -> Option<i64> {
        match self {
            AppError::Remote { ret, .. } => Some(*ret),
            _ => None,
        }
    }
}
