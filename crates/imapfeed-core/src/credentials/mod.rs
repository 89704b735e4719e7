//! Credential resolution.
//!
//! Turns a [`crate::config::Profile`] into a [`crate::config::ResolvedProfile`]
//! using, in order, the secret the profile already carries, the OS secret
//! store, and an interactive prompt. Newly obtained secrets are only cached
//! in the store after the caller has verified them.

mod prompt;
mod resolver;
mod store;

pub use prompt::{prompt_label, terminal_prompt};
pub use resolver::{CommitOutcome, CredentialResolver, SERVICE_SCHEME, service_identifier};
pub use store::{KeyringStore, MemoryStore, SecretStore, SecretStoreError, SecretStoreResult};
