//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration file could not be loaded.
    #[error("Config loading error: {0}")]
    ConfigLoading(#[from] crate::config::ConfigLoadingError),

    /// The configuration file could not be written.
    #[error("Config writing error: {0}")]
    ConfigWriting(#[from] crate::config::ConfigWritingError),

    /// Secret store operation failed.
    #[error("Secret store error: {0}")]
    SecretStore(#[from] crate::credentials::SecretStoreError),

    /// A message could not be parsed.
    #[error("MIME parse error: {0}")]
    Mime(#[from] mailparse::MailParseError),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
