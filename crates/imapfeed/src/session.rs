//! Mail session: TLS connection, login, folder listing and message fetch.

use std::sync::Arc;

use async_imap::Session;
use async_imap::types::Fetch;
use futures::TryStreamExt;
use imapfeed_core::ResolvedProfile;
use rustls::pki_types::ServerName;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tracing::{debug, info};

/// Separator shown between levels of a folder hierarchy.
pub const FOLDER_DELIM: &str = " > ";

/// Errors that can occur during a mail session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The server rejected the credentials.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Operation failed.
    #[error("Operation failed: {0}")]
    Operation(String),
}

/// Something that can turn a resolved profile into an authenticated session.
pub trait Authenticate {
    /// Authenticated session type.
    type Session;

    /// Connect and log in.
    async fn authenticate(&self, resolved: &ResolvedProfile) -> Result<Self::Session, SessionError>;
}

/// Connects to IMAP servers over implicit TLS.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImapConnector;

impl Authenticate for ImapConnector {
    type Session = MailSession;

    async fn authenticate(&self, resolved: &ResolvedProfile) -> Result<MailSession, SessionError> {
        MailSession::login(resolved).await
    }
}

/// An authenticated IMAP session.
pub struct MailSession {
    session: Session<TlsStream<TcpStream>>,
}

impl std::fmt::Debug for MailSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailSession").finish_non_exhaustive()
    }
}

impl MailSession {
    /// Connect with TLS and log in with the resolved secret.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Authentication`] if the server rejects the
    /// credentials and [`SessionError::Connection`] for anything else.
    pub async fn login(resolved: &ResolvedProfile) -> Result<Self, SessionError> {
        let profile = resolved.profile();
        let (host, port) = profile.host_and_port();

        let tcp = TcpStream::connect((host, port))
            .await
            .map_err(|e| SessionError::Connection(format!("{host}:{port}: {e}")))?;
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|e| SessionError::Connection(format!("{host}: {e}")))?;
        let tls = create_tls_connector()
            .connect(server_name, tcp)
            .await
            .map_err(|e| SessionError::Connection(format!("TLS handshake with {host}: {e}")))?;
        debug!("Connected to {host}:{port}");

        let client = async_imap::Client::new(tls);
        let session = client
            .login(&profile.user, &resolved.secret)
            .await
            .map_err(|(e, _client)| login_error(e))?;

        info!("Logged in to {} as {}", profile.server, profile.user);
        Ok(Self { session })
    }

    /// List all folders, hierarchy rendered with [`FOLDER_DELIM`], sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the LIST command fails.
    pub async fn list_folders(&mut self) -> Result<Vec<String>, SessionError> {
        let names: Vec<_> = self
            .session
            .list(Some(""), Some("*"))
            .await
            .map_err(operation_error)?
            .try_collect()
            .await
            .map_err(operation_error)?;

        let mut folders: Vec<String> = names
            .iter()
            .map(|name| display_folder_name(name.name(), name.delimiter()))
            .collect();
        folders.sort();
        Ok(folders)
    }

    /// Fetch the raw RFC 5322 bytes of one message without marking it seen.
    ///
    /// `folder` is the server's folder name. Without a `uid` the message with
    /// the highest UID in the folder is fetched.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder cannot be opened, is empty, or has no
    /// message with that UID.
    pub async fn fetch_message(
        &mut self,
        folder: &str,
        uid: Option<u32>,
    ) -> Result<Vec<u8>, SessionError> {
        let mailbox = self.session.examine(folder).await.map_err(operation_error)?;
        debug!("Opened {folder} with {} messages", mailbox.exists);

        let uid = match uid {
            Some(uid) => uid,
            None => self
                .session
                .uid_search("ALL")
                .await
                .map_err(operation_error)?
                .into_iter()
                .max()
                .ok_or_else(|| SessionError::Operation(format!("Folder {folder} is empty")))?,
        };

        let fetches: Vec<_> = self
            .session
            .uid_fetch(uid.to_string(), "BODY.PEEK[]")
            .await
            .map_err(operation_error)?
            .try_collect()
            .await
            .map_err(operation_error)?;

        fetches
            .iter()
            .find_map(Fetch::body)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| {
                SessionError::Operation(format!("No message with UID {uid} in {folder}"))
            })
    }

    /// Log out and close the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the LOGOUT command fails.
    pub async fn logout(mut self) -> Result<(), SessionError> {
        self.session.logout().await.map_err(operation_error)
    }
}

/// Creates a TLS connector with default root certificates.
fn create_tls_connector() -> TlsConnector {
    let root_store = rustls::RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };

    let config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    TlsConnector::from(Arc::new(config))
}

/// Only a NO reply means the credentials were rejected.
fn login_error(error: async_imap::error::Error) -> SessionError {
    match error {
        async_imap::error::Error::No(message) => SessionError::Authentication(message),
        async_imap::error::Error::Bad(message) => SessionError::Operation(message),
        other => SessionError::Connection(other.to_string()),
    }
}

fn operation_error(error: async_imap::error::Error) -> SessionError {
    SessionError::Operation(error.to_string())
}

/// Render a folder name with its hierarchy delimiter replaced by [`FOLDER_DELIM`].
#[must_use]
pub fn display_folder_name(name: &str, delimiter: Option<&str>) -> String {
    match delimiter {
        Some(delim) if !delim.is_empty() => name.replace(delim, FOLDER_DELIM),
        _ => name.to_string(),
    }
}
