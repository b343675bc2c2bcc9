use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("USAGE: {0}")]
    Usage(String),
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),
    #[error("IO_FAILURE: {0}")]
    Io(String),
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

impl AppError {
    pub fn detail(&self) -> &str {
        match self {
            Self::Usage(message)
            | Self::InvalidInput(message)
            | Self::Io(message)
            | Self::Internal(message) => message,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
