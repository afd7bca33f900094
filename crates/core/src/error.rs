//! Error types for QR Attend Core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("{0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

impl Error {
    /// True for errors raised before any store call was made
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
