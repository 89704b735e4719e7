//! Secret store backends.
//!
//! Secrets are addressed by a service identifier and an account name.
//! [`KeyringStore`] uses the platform's native credential storage:
//! - Linux: Secret Service (GNOME Keyring, `KWallet`)
//! - macOS: Keychain
//! - Windows: Credential Manager
//!
//! [`MemoryStore`] keeps secrets in process memory and counts calls, for tests
//! and for hosts without a usable keyring.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use keyring::Entry;
use tracing::debug;

/// Error type for secret store operations.
#[derive(Debug, thiserror::Error)]
pub enum SecretStoreError {
    /// Failed to access keyring.
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// The store cannot be used at all.
    #[error("Secret store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for secret store operations.
pub type SecretStoreResult<T> = std::result::Result<T, SecretStoreError>;

/// Key-value secret storage.
///
/// Operations are blocking and are not assumed to be atomic across processes.
pub trait SecretStore {
    /// Look up a secret. A missing entry is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    fn get(&self, service: &str, account: &str) -> SecretStoreResult<Option<String>>;

    /// Store a secret, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn set(&self, service: &str, account: &str, secret: &str) -> SecretStoreResult<()>;

    /// Delete a secret. Deleting a missing entry succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn delete(&self, service: &str, account: &str) -> SecretStoreResult<()>;
}

impl<T: SecretStore + ?Sized> SecretStore for &T {
    fn get(&self, service: &str, account: &str) -> SecretStoreResult<Option<String>> {
        (**self).get(service, account)
    }

    fn set(&self, service: &str, account: &str, secret: &str) -> SecretStoreResult<()> {
        (**self).set(service, account, secret)
    }

    fn delete(&self, service: &str, account: &str) -> SecretStoreResult<()> {
        (**self).delete(service, account)
    }
}

/// OS keyring backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyringStore;

impl KeyringStore {
    /// Create a keyring-backed store.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SecretStore for KeyringStore {
    fn get(&self, service: &str, account: &str) -> SecretStoreResult<Option<String>> {
        let entry = Entry::new(service, account)?;
        match entry.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => {
                debug!("No keyring entry for {account} at {service}");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, service: &str, account: &str, secret: &str) -> SecretStoreResult<()> {
        let entry = Entry::new(service, account)?;
        entry.set_password(secret)?;
        debug!("Stored keyring entry for {account} at {service}");
        Ok(())
    }

    fn delete(&self, service: &str, account: &str) -> SecretStoreResult<()> {
        let entry = Entry::new(service, account)?;
        match entry.delete_credential() {
            Ok(()) => {
                debug!("Deleted keyring entry for {account} at {service}");
                Ok(())
            }
            Err(keyring::Error::NoEntry) => {
                debug!("No keyring entry to delete for {account} at {service}");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory backend with call counters.
#[derive(Debug, Default)]
pub struct MemoryStore {
    secrets: Mutex<HashMap<(String, String), String>>,
    unavailable: bool,
    gets: AtomicUsize,
    sets: AtomicUsize,
    deletes: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose every operation fails as unavailable.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Create a store pre-populated with one secret.
    #[must_use]
    pub fn with_secret(service: &str, account: &str, secret: &str) -> Self {
        let store = Self::new();
        store
            .lock()
            .insert((service.to_string(), account.to_string()), secret.to_string());
        store
    }

    /// Current secret for a key, without counting a lookup.
    #[must_use]
    pub fn peek(&self, service: &str, account: &str) -> Option<String> {
        self.lock()
            .get(&(service.to_string(), account.to_string()))
            .cloned()
    }

    /// Number of [`SecretStore::get`] calls so far.
    #[must_use]
    pub fn get_calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Number of [`SecretStore::set`] calls so far.
    #[must_use]
    pub fn set_calls(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    /// Number of [`SecretStore::delete`] calls so far.
    #[must_use]
    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    /// Total number of store operations so far.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.get_calls() + self.set_calls() + self.delete_calls()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(String, String), String>> {
        // A poisoned map is still a valid map.
        self.secrets
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn check_available(&self) -> SecretStoreResult<()> {
        if self.unavailable {
            Err(SecretStoreError::Unavailable("memory store disabled".to_string()))
        } else {
            Ok(())
        }
    }
}

impl SecretStore for MemoryStore {
    fn get(&self, service: &str, account: &str) -> SecretStoreResult<Option<String>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.peek(service, account))
    }

    fn set(&self, service: &str, account: &str, secret: &str) -> SecretStoreResult<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        self.lock()
            .insert((service.to_string(), account.to_string()), secret.to_string());
        Ok(())
    }

    fn delete(&self, service: &str, account: &str) -> SecretStoreResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        self.lock()
            .remove(&(service.to_string(), account.to_string()));
        Ok(())
    }
}
