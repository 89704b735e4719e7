//! JSON persistence of server profiles.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::error::{ConfigLoadingError, ConfigWritingError};
use super::model::{Profile, ProfileMapping, ResolvedProfile, ServerProfile};
use crate::Result;

/// Name of the settings folder inside the base directory.
pub const SETTINGS_FOLDER: &str = ".imapfeed";

/// Name of the server profiles file inside the settings folder.
pub const SETTINGS_FILE: &str = "imap_servers.json";

impl AsRef<ServerProfile> for ServerProfile {
    fn as_ref(&self) -> &ServerProfile {
        self
    }
}

impl AsRef<ServerProfile> for ResolvedProfile {
    fn as_ref(&self) -> &ServerProfile {
        &self.profile
    }
}

impl AsRef<ServerProfile> for Profile {
    fn as_ref(&self) -> &ServerProfile {
        self.server_profile()
    }
}

/// Reads and writes the server profiles file.
///
/// The file lives at `<base>/.imapfeed/imap_servers.json`. Only the
/// non-secret fields of a profile are ever written.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    base_dir: PathBuf,
}

impl ConfigStore {
    /// Create a store rooted at an explicit base directory.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Create a store rooted at the user's home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn from_home() -> std::result::Result<Self, ConfigLoadingError> {
        dirs::home_dir()
            .map(Self::new)
            .ok_or(ConfigLoadingError::NoHomeDirectory)
    }

    /// Folder holding the settings file.
    #[must_use]
    pub fn settings_dir(&self) -> PathBuf {
        self.base_dir.join(SETTINGS_FOLDER)
    }

    /// Full path of the settings file.
    #[must_use]
    pub fn file_path(&self) -> PathBuf {
        self.settings_dir().join(SETTINGS_FILE)
    }

    /// Load all server profiles.
    ///
    /// A missing file yields an empty mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not JSON, or does not
    /// have the `name -> {server, user, useSecretStore}` shape. Shape errors
    /// name the offending key.
    pub fn load(&self) -> std::result::Result<ProfileMapping, ConfigLoadingError> {
        let path = self.file_path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No config file at {}", path.display());
                return Ok(ProfileMapping::new());
            }
            Err(source) => return Err(ConfigLoadingError::Read { path, source }),
        };

        let profiles = parse_profiles(&path, &bytes)?;
        debug!("Loaded {} server configs from {}", profiles.len(), path.display());
        Ok(profiles)
    }

    /// Write server profiles, stripping any secrets.
    ///
    /// Creates the settings folder if needed and replaces the file atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder cannot be created or the file cannot be written.
    pub fn save<P>(
        &self,
        profiles: &BTreeMap<String, P>,
    ) -> std::result::Result<(), ConfigWritingError>
    where
        P: AsRef<ServerProfile>,
    {
        let dir = self.settings_dir();
        fs::create_dir_all(&dir).map_err(|source| ConfigWritingError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        let mut cleaned = Map::new();
        for (name, profile) in profiles {
            let value = serde_json::to_value(profile.as_ref()).map_err(|source| {
                ConfigWritingError::Serialize {
                    key: name.clone(),
                    source,
                }
            })?;
            cleaned.insert(name.clone(), value);
        }

        let path = self.file_path();
        write_atomically(&dir, &path, &Value::Object(cleaned))
            .map_err(|source| ConfigWritingError::Write { path: path.clone(), source })?;

        info!("Server configs saved to {}", path.display());
        Ok(())
    }

    /// Insert or replace one profile and save.
    ///
    /// # Errors
    ///
    /// Returns an error if loading or saving fails.
    pub fn upsert(&self, name: &str, profile: ServerProfile) -> Result<()> {
        let mut profiles = self.load()?;
        profiles.insert(name.to_string(), profile);
        self.save(&profiles)?;
        Ok(())
    }

    /// Remove one profile, saving only if it existed.
    ///
    /// Returns whether a profile was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if loading or saving fails.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let mut profiles = self.load()?;
        if profiles.remove(name).is_none() {
            return Ok(false);
        }
        self.save(&profiles)?;
        Ok(true)
    }
}

fn parse_profiles(
    path: &Path,
    bytes: &[u8],
) -> std::result::Result<ProfileMapping, ConfigLoadingError> {
    let data: Value =
        serde_json::from_slice(bytes).map_err(|source| ConfigLoadingError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let Value::Object(entries) = data else {
        return Err(ConfigLoadingError::NotAnObject);
    };

    let mut profiles = ProfileMapping::new();
    for (key, value) in entries {
        if !value.is_object() {
            return Err(ConfigLoadingError::EntryNotAnObject { key });
        }
        match serde_json::from_value::<ServerProfile>(value) {
            Ok(profile) => {
                profiles.insert(key, profile);
            }
            Err(source) => return Err(ConfigLoadingError::InvalidEntry { key, source }),
        }
    }
    Ok(profiles)
}

fn write_atomically(dir: &Path, path: &Path, document: &Value) -> io::Result<()> {
    let mut tmpfile = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmpfile, document)?;
    tmpfile.write_all(b"\n")?;
    tmpfile.as_file().sync_all()?;
    tmpfile.persist(path).map_err(|e| e.error)?;
    Ok(())
}
