//! Layered secret resolution: cached secret, then secret store, then prompt.

use tracing::{debug, info, warn};

use super::store::{SecretStore, SecretStoreError};
use crate::config::{Profile, ResolvedProfile, ServerProfile};

/// Scheme prefixed to the server address to form the store service identifier.
pub const SERVICE_SCHEME: &str = "imapfeed";

/// Service identifier under which a server's secrets are stored.
#[must_use]
pub fn service_identifier(server: &str) -> String {
    format!("{SERVICE_SCHEME}://{server}")
}

/// Result of writing to or deleting from the secret store.
///
/// Store failures are reported here rather than raised.
#[derive(Debug)]
pub enum CommitOutcome {
    /// The profile does not use the secret store; nothing was touched.
    Skipped,
    /// The store was updated.
    Updated,
    /// The store rejected the operation.
    Failed(SecretStoreError),
}

impl CommitOutcome {
    /// Whether the store was updated.
    #[must_use]
    pub const fn is_updated(&self) -> bool {
        matches!(self, Self::Updated)
    }
}

/// Produces resolved profiles for server profiles.
///
/// Never writes secrets anywhere except the secret store, and only through
/// [`CredentialResolver::commit_secret_if_wanted`].
#[derive(Debug, Clone, Default)]
pub struct CredentialResolver<S> {
    store: S,
}

impl<S: SecretStore> CredentialResolver<S> {
    /// Create a resolver backed by a secret store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the secret store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Resolve a profile to one carrying a secret.
    ///
    /// A profile that already carries a non-empty secret is returned unchanged.
    /// Otherwise the secret store is consulted if the profile opts in, and
    /// `prompt` is called once if that yields nothing. The secret is not
    /// validated and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns the prompt's error unchanged.
    pub fn resolve<F, E>(&self, profile: Profile, prompt: F) -> Result<ResolvedProfile, E>
    where
        F: FnOnce() -> Result<String, E>,
    {
        let profile = match profile {
            Profile::Resolved(resolved) if !resolved.secret.is_empty() => return Ok(resolved),
            Profile::Resolved(resolved) => resolved.into_profile(),
            Profile::Plain(profile) => profile,
        };

        let mut secret = String::new();
        if profile.use_secret_store {
            secret = self.lookup(&profile).unwrap_or_default();
        }
        if secret.is_empty() {
            debug!("Prompting for secret of {} at {}", profile.user, profile.server);
            secret = prompt()?;
        }

        Ok(profile.with_secret(secret))
    }

    /// Cache a verified secret in the store if the profile opts in.
    ///
    /// Call only after the secret has been shown to work.
    pub fn commit_secret_if_wanted(&self, resolved: &ResolvedProfile) -> CommitOutcome {
        let profile = resolved.profile();
        if !profile.use_secret_store {
            return CommitOutcome::Skipped;
        }

        let service = service_identifier(&profile.server);
        match self.store.set(&service, &profile.user, &resolved.secret) {
            Ok(()) => {
                info!(
                    "Saved secret for {} at {} to the secret store",
                    profile.user, profile.server
                );
                CommitOutcome::Updated
            }
            Err(e) => {
                warn!("Could not save secret for {} at {}: {e}", profile.user, profile.server);
                CommitOutcome::Failed(e)
            }
        }
    }

    /// Delete a stored secret if the profile opts in.
    ///
    /// Used after the server rejected a secret, so the next resolution prompts
    /// instead of replaying it.
    pub fn forget_secret(&self, profile: &ServerProfile) -> CommitOutcome {
        if !profile.use_secret_store {
            return CommitOutcome::Skipped;
        }

        let service = service_identifier(&profile.server);
        match self.store.delete(&service, &profile.user) {
            Ok(()) => {
                info!(
                    "Removed secret for {} at {} from the secret store",
                    profile.user, profile.server
                );
                CommitOutcome::Updated
            }
            Err(e) => {
                warn!("Could not remove secret for {} at {}: {e}", profile.user, profile.server);
                CommitOutcome::Failed(e)
            }
        }
    }

    fn lookup(&self, profile: &ServerProfile) -> Option<String> {
        let service = service_identifier(&profile.server);
        match self.store.get(&service, &profile.user) {
            Ok(Some(secret)) if !secret.is_empty() => {
                debug!(
                    "Found secret for {} at {} in the secret store",
                    profile.user, profile.server
                );
                Some(secret)
            }
            Ok(_) => {
                debug!("No secret for {} at {} in the secret store", profile.user, profile.server);
                None
            }
            Err(e) => {
                warn!("Secret store lookup failed, falling back to prompt: {e}");
                None
            }
        }
    }
}
