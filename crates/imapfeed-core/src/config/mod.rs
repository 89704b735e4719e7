//! Server profile configuration.
//!
//! Provides the profile model and its JSON persistence.

mod error;
mod model;
mod store;

pub use error::{ConfigLoadingError, ConfigWritingError};
pub use model::{DEFAULT_IMAP_PORT, Profile, ProfileMapping, ResolvedProfile, ServerProfile};
pub use store::{ConfigStore, SETTINGS_FILE, SETTINGS_FOLDER};
