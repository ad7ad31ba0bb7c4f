/*!
 * Error types for the glossfill application.
 *
 * This module contains custom error types for the different collaborators
 * of the batch jobs, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to the translation service
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// Status code reported by the service
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// The service answered successfully but with no usable text
    #[error("API returned an empty translation")]
    EmptyTranslation,

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

/// Structural problems with a source file
#[derive(Error, Debug)]
pub enum ImportError {
    /// The file could not be read from disk
    #[error("Cannot read source file {file}: {message}")]
    UnreadableFile { file: String, message: String },

    /// The file is not valid JSON
    #[error("Invalid JSON in {file}: {message}")]
    InvalidJson { file: String, message: String },

    /// The JSON payload is valid but not a list of entries
    #[error("Source file {file} does not contain a list of entries")]
    NotAList { file: String },
}

/// Errors raised by the persistent store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be reached or opened
    #[error("Database connection failed: {0}")]
    Connection(String),

    /// A statement failed
    #[error("Database query failed: {0}")]
    Query(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the translation service
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from source file processing
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Error from the store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The user interrupted the run
    #[error("Run interrupted by user")]
    Interrupted,

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        let message = format!("{:#}", error);

        if let Some(store) = error.downcast_ref::<StoreError>() {
            return match store {
                StoreError::Connection(_) => Self::Store(StoreError::Connection(message)),
                StoreError::Query(_) => Self::Store(StoreError::Query(message)),
            };
        }
        if error.downcast_ref::<ImportError>().is_some() {
            return Self::File(message);
        }
        if error.downcast_ref::<ProviderError>().is_some() {
            return Self::Provider(ProviderError::RequestFailed(message));
        }

        Self::Unknown(message)
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Query(error.to_string())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                Self::Connection(error.to_string())
            }
            other => Self::Query(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}
