//! Resolve credentials and log in, re-prompting after rejected passwords.

use std::sync::Arc;

use anyhow::{Context, bail};
use imapfeed_core::{
    CommitOutcome, CredentialResolver, Profile, ResolvedProfile, SecretStore, ServerProfile,
};
use tracing::warn;

use crate::session::{Authenticate, SessionError};

/// Resolve `profile`, log in, and cache the secret once the server accepted it.
///
/// Resolution runs on the blocking pool since it may wait on the keyring or
/// the terminal. When the server rejects the secret, the stored copy (if any)
/// is forgotten and every later attempt prompts without reading the store, so
/// a store that fails to delete cannot replay a rejected secret. Gives up
/// after `attempts` tries.
///
/// # Errors
///
/// Returns an error if the prompt fails, a non-authentication session error
/// occurs, or every attempt is rejected.
pub async fn login<S, A, F, P>(
    resolver: &Arc<CredentialResolver<S>>,
    connector: &A,
    profile: ServerProfile,
    attempts: u32,
    make_prompt: F,
) -> anyhow::Result<(A::Session, ResolvedProfile)>
where
    S: SecretStore + Send + Sync + 'static,
    A: Authenticate,
    F: Fn(&ServerProfile) -> P,
    P: FnOnce() -> std::io::Result<String> + Send + 'static,
{
    let attempts = attempts.max(1);
    let mut profile = profile;
    let mut attempt = 1;

    loop {
        let prompt = make_prompt(&profile);
        let task_resolver = Arc::clone(resolver);
        let candidate = profile;
        let rejected_before = attempt > 1;
        let resolved = tokio::task::spawn_blocking(move || {
            if rejected_before {
                prompt().map(|secret| candidate.with_secret(secret))
            } else {
                task_resolver.resolve(Profile::Plain(candidate), prompt)
            }
        })
        .await
        .context("Credential resolution task failed")?
        .context("Could not read password")?;

        match connector.authenticate(&resolved).await {
            Ok(session) => {
                commit(resolver, resolved.clone()).await?;
                return Ok((session, resolved));
            }
            Err(SessionError::Authentication(message)) if attempt < attempts => {
                warn!(
                    "Login rejected for {} at {} (attempt {attempt}/{attempts}): {message}",
                    resolved.profile().user,
                    resolved.profile().server
                );
                profile = resolved.into_profile();
                if let CommitOutcome::Failed(e) = forget(resolver, profile.clone()).await? {
                    warn!("Rejected secret stays in the secret store: {e}");
                }
                attempt += 1;
            }
            Err(SessionError::Authentication(message)) => {
                bail!("Login rejected after {attempts} attempt(s): {message}");
            }
            Err(e) => return Err(e.into()),
        }
    }
}

async fn commit<S>(
    resolver: &Arc<CredentialResolver<S>>,
    resolved: ResolvedProfile,
) -> anyhow::Result<CommitOutcome>
where
    S: SecretStore + Send + Sync + 'static,
{
    let resolver = Arc::clone(resolver);
    tokio::task::spawn_blocking(move || resolver.commit_secret_if_wanted(&resolved))
        .await
        .context("Secret store task failed")
}

async fn forget<S>(
    resolver: &Arc<CredentialResolver<S>>,
    profile: ServerProfile,
) -> anyhow::Result<CommitOutcome>
where
    S: SecretStore + Send + Sync + 'static,
{
    let resolver = Arc::clone(resolver);
    tokio::task::spawn_blocking(move || resolver.forget_secret(&profile))
        .await
        .context("Secret store task failed")
}
