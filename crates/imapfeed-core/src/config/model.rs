//! Server profile model types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Default port for implicit-TLS IMAP.
pub const DEFAULT_IMAP_PORT: u16 = 993;

/// A named IMAP server connection descriptor, as stored on disk.
///
/// Carries no secret. The only way to attach one is [`ServerProfile::with_secret`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerProfile {
    /// Server address as `host[:port]`.
    pub server: String,
    /// Username for authentication.
    pub user: String,
    /// Whether the OS secret store may be read and written for this profile.
    #[serde(rename = "useSecretStore", alias = "use_keyring")]
    pub use_secret_store: bool,
}

impl ServerProfile {
    /// Create a new profile.
    #[must_use]
    pub fn new(server: impl Into<String>, user: impl Into<String>, use_secret_store: bool) -> Self {
        Self {
            server: server.into(),
            user: user.into(),
            use_secret_store,
        }
    }

    /// Attach a secret, producing an in-memory resolved profile.
    #[must_use]
    pub fn with_secret(self, secret: impl Into<String>) -> ResolvedProfile {
        ResolvedProfile {
            profile: self,
            secret: secret.into(),
        }
    }

    /// Split `server` into host and port.
    ///
    /// The port defaults to [`DEFAULT_IMAP_PORT`] when it is missing or not a valid port number.
    #[must_use]
    pub fn host_and_port(&self) -> (&str, u16) {
        match self.server.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() => port
                .parse()
                .map_or((self.server.as_str(), DEFAULT_IMAP_PORT), |port| (host, port)),
            _ => (self.server.as_str(), DEFAULT_IMAP_PORT),
        }
    }
}

/// A server profile together with its secret.
///
/// Only ever held in memory: it deliberately does not implement `Serialize`.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedProfile {
    /// The non-secret profile fields.
    pub profile: ServerProfile,
    /// Secret used to authenticate.
    pub secret: String,
}

impl ResolvedProfile {
    /// Strip the secret, returning the persistable part.
    #[must_use]
    pub fn into_profile(self) -> ServerProfile {
        self.profile
    }

    /// Borrow the non-secret profile fields.
    #[must_use]
    pub const fn profile(&self) -> &ServerProfile {
        &self.profile
    }
}

impl std::fmt::Debug for ResolvedProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedProfile")
            .field("profile", &self.profile)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// A profile that may or may not carry a secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Profile {
    /// Profile as loaded from disk.
    Plain(ServerProfile),
    /// Profile with a secret attached.
    Resolved(ResolvedProfile),
}

impl Profile {
    /// Borrow the non-secret profile fields.
    #[must_use]
    pub const fn server_profile(&self) -> &ServerProfile {
        match self {
            Self::Plain(profile) => profile,
            Self::Resolved(resolved) => &resolved.profile,
        }
    }

    /// Drop any secret, keeping the fields that may be written to disk.
    #[must_use]
    pub fn sanitized(self) -> ServerProfile {
        match self {
            Self::Plain(profile) => profile,
            Self::Resolved(resolved) => resolved.into_profile(),
        }
    }
}

impl From<ServerProfile> for Profile {
    fn from(profile: ServerProfile) -> Self {
        Self::Plain(profile)
    }
}

impl From<ResolvedProfile> for Profile {
    fn from(resolved: ResolvedProfile) -> Self {
        Self::Resolved(resolved)
    }
}

/// Named server profiles as stored in the configuration file.
pub type ProfileMapping = BTreeMap<String, ServerProfile>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod server_profile_tests {
        use super::*;

        #[test]
        fn host_without_port_uses_default() {
            let profile = ServerProfile::new("imap.example.com", "bob", false);
            assert_eq!(profile.host_and_port(), ("imap.example.com", 993));
        }

        #[test]
        fn host_with_port() {
            let profile = ServerProfile::new("imap.example.com:1993", "bob", false);
            assert_eq!(profile.host_and_port(), ("imap.example.com", 1993));
        }

        #[test]
        fn invalid_port_keeps_whole_server_as_host() {
            let profile = ServerProfile::new("imap.example.com:abc", "bob", false);
            assert_eq!(profile.host_and_port(), ("imap.example.com:abc", 993));
        }

        #[test]
        fn serializes_with_camel_case_flag() {
            let profile = ServerProfile::new("x", "y", true);
            let json = serde_json::to_value(&profile).unwrap();
            assert_eq!(
                json,
                serde_json::json!({"server": "x", "user": "y", "useSecretStore": true})
            );
        }

        #[test]
        fn accepts_legacy_flag_name() {
            let profile: ServerProfile =
                serde_json::from_str(r#"{"server":"x","user":"y","use_keyring":true}"#).unwrap();
            assert!(profile.use_secret_store);
        }

        #[test]
        fn rejects_secret_field() {
            let result: Result<ServerProfile, _> = serde_json::from_str(
                r#"{"server":"x","user":"y","useSecretStore":false,"secret":"s"}"#,
            );
            assert!(result.is_err());
        }
    }

    mod profile_tests {
        use super::*;

        #[test]
        fn sanitized_strips_secret() {
            let resolved = ServerProfile::new("x", "y", true).with_secret("hunter2");
            let profile = Profile::from(resolved);
            assert_eq!(profile.sanitized(), ServerProfile::new("x", "y", true));
        }

        #[test]
        fn plain_passes_through() {
            let plain = ServerProfile::new("x", "y", false);
            assert_eq!(Profile::from(plain.clone()).sanitized(), plain);
        }

        #[test]
        fn debug_redacts_secret() {
            let resolved = ServerProfile::new("x", "y", true).with_secret("hunter2");
            let rendered = format!("{resolved:?}");
            assert!(!rendered.contains("hunter2"));
            assert!(rendered.contains("<redacted>"));
        }
    }
}
