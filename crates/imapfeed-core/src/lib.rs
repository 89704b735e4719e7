//! # imapfeed-core
//!
//! Server profile persistence and credential resolution for `ImapFeed`.
//!
//! This crate provides:
//! - **Server profiles** - loaded from and saved to a plaintext JSON file that
//!   never contains a secret
//! - **Credential resolution** - cached secret, then OS secret store, then
//!   interactive prompt
//! - **Secret write-back** - verified secrets cached in the secret store on request
//! - **Message display** - HTML for a fetched message, with a text-only fallback
//!
//! ## Example
//!
//! ```no_run
//! use imapfeed_core::config::ConfigStore;
//! use imapfeed_core::credentials::{CredentialResolver, KeyringStore, terminal_prompt};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = ConfigStore::from_home()?;
//! let profiles = store.load()?;
//! if let Some(profile) = profiles.values().next() {
//!     let resolver = CredentialResolver::new(KeyringStore::new());
//!     let resolved = resolver.resolve(profile.clone().into(), terminal_prompt(profile))?;
//!     // ... log in with `resolved`, then:
//!     resolver.commit_secret_if_wanted(&resolved);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod credentials;
mod error;
pub mod mail;

pub use config::{
    ConfigLoadingError, ConfigStore, ConfigWritingError, Profile, ProfileMapping, ResolvedProfile,
    ServerProfile,
};
pub use credentials::{CommitOutcome, CredentialResolver, KeyringStore, MemoryStore, SecretStore};
pub use error::{Error, Result};
pub use mail::MailContent;
