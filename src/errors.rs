use std::io;

use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// The analysis backend answered with an explicit `error` field; the
    /// message is shown to the user verbatim.
    #[error("{0}")]
    Rejected(String),
    #[error("transition not allowed: {0}")]
    State(String),
    #[error("{0}")]
    Config(String),
    #[error("session unavailable: {0}")]
    Session(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
