//! Configuration loading and writing errors.

use std::path::PathBuf;

use thiserror::Error;

/// The configuration file could not be turned into server profiles.
#[derive(Debug, Error)]
pub enum ConfigLoadingError {
    /// No home directory to place the settings folder in.
    #[error("Could not determine the home directory")]
    NoHomeDirectory,

    /// The file exists but could not be read.
    #[error("Could not read config file {path}: {source}")]
    Read {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid JSON.
    #[error("Could not parse config file {path}: {source}")]
    Parse {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// The top level of the file is not a JSON object.
    #[error("Could not load config, as JSON file is not an object")]
    NotAnObject,

    /// The value stored under `key` is not a JSON object.
    #[error("The key '{key}' of the JSON config does not contain a server object")]
    EntryNotAnObject {
        /// Offending profile name.
        key: String,
    },

    /// The object stored under `key` does not have the server profile shape.
    #[error("Invalid server object for '{key}': {source}")]
    InvalidEntry {
        /// Offending profile name.
        key: String,
        /// Field mismatch reported by the deserializer.
        source: serde_json::Error,
    },
}

impl ConfigLoadingError {
    /// Profile name the error refers to, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::EntryNotAnObject { key } | Self::InvalidEntry { key, .. } => Some(key),
            _ => None,
        }
    }
}

/// Server profiles could not be written to the configuration file.
#[derive(Debug, Error)]
pub enum ConfigWritingError {
    /// The settings folder could not be created.
    #[error("Could not create settings folder {path}: {source}")]
    CreateDir {
        /// Folder that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A profile could not be serialized.
    #[error("Could not serialize server config '{key}': {source}")]
    Serialize {
        /// Offending profile name.
        key: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// The file could not be written or moved into place.
    #[error("Could not write config file {path}: {source}")]
    Write {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
