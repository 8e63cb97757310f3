use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("index {index} is out of range for a media list of length {len}")]
    OutOfRange { index: usize, len: usize },

    #[error("{0}")]
    Validation(String),

    #[error("transfer failed: {0}")]
    TransferFailed(String),

    #[error("file is not a readable workbook: {0}")]
    MalformedFile(String),

    #[error("session expired, re-authentication required")]
    AuthExpired,
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn transfer(err: impl std::fmt::Display) -> Self {
        Self::TransferFailed(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::TransferFailed(err.to_string())
    }
}
