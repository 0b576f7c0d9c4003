use thiserror::Error;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("fetch error: {0}")]
    Fetch(String),

    #[error("forward error: {message}")]
    Forward {
        /// Upstream HTTP status, when the endpoint answered at all.
        status: Option<u16>,
        message: String,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Application-level Result alias
pub type AppResult<T> = Result<T, AppError>;
