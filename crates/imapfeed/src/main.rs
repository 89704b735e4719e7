//! `ImapFeed` - small IMAP mail reader
//!
//! Server profiles live in a plaintext JSON file; passwords come from the
//! system keyring or an interactive prompt and never touch that file.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;
mod login;
mod session;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, anyhow, bail};
use clap::Parser;
use imapfeed_core::credentials::terminal_prompt;
use imapfeed_core::{
    CommitOutcome, ConfigStore, CredentialResolver, KeyringStore, MailContent, ProfileMapping,
    ServerProfile,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command, ProfilesCommand};
use session::{ImapConnector, MailSession};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imapfeed=info,imapfeed_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let store = match cli.config_dir {
        Some(dir) => ConfigStore::new(dir),
        None => ConfigStore::from_home()?,
    };

    match cli.command {
        Command::Profiles { action } => run_profiles(&store, action),
        Command::Folders { profile, attempts } => {
            run_folders(&store, profile.as_deref(), attempts).await
        }
        Command::Show {
            profile,
            folder,
            uid,
            attempts,
        } => run_show(&store, profile.as_deref(), &folder, uid, attempts).await,
        Command::Forget { name } => run_forget(&store, &name).await,
    }
}

fn run_profiles(store: &ConfigStore, action: ProfilesCommand) -> anyhow::Result<()> {
    match action {
        ProfilesCommand::List => {
            let profiles = store.load()?;
            if profiles.is_empty() {
                println!("No server profiles in {}", store.file_path().display());
            }
            for (name, profile) in &profiles {
                println!("{}", describe_profile(name, profile));
            }
        }
        ProfilesCommand::Add {
            name,
            server,
            user,
            use_secret_store,
        } => {
            store.upsert(&name, ServerProfile::new(server, user, use_secret_store))?;
            info!("Saved profile '{name}'");
        }
        ProfilesCommand::Remove { name } => {
            if !store.remove(&name)? {
                bail!("No profile named '{name}'");
            }
            info!("Removed profile '{name}'");
        }
    }
    Ok(())
}

/// Select a profile and log in with keyring and terminal prompt.
async fn connect(
    store: &ConfigStore,
    name: Option<&str>,
    attempts: u32,
) -> anyhow::Result<MailSession> {
    let profiles = store.load()?;
    let (name, profile) = select_profile(&profiles, name, &store.file_path())?;
    info!("Using profile '{name}'");

    let resolver = Arc::new(CredentialResolver::new(KeyringStore::new()));
    let (session, _resolved) =
        login::login(&resolver, &ImapConnector, profile.clone(), attempts, terminal_prompt).await?;
    Ok(session)
}

async fn run_folders(store: &ConfigStore, name: Option<&str>, attempts: u32) -> anyhow::Result<()> {
    let mut session = connect(store, name, attempts).await?;

    let folders = session.list_folders().await?;
    for folder in &folders {
        println!("{folder}");
    }
    session.logout().await?;
    Ok(())
}

async fn run_show(
    store: &ConfigStore,
    name: Option<&str>,
    folder: &str,
    uid: Option<u32>,
    attempts: u32,
) -> anyhow::Result<()> {
    let mut session = connect(store, name, attempts).await?;

    let raw = session.fetch_message(folder, uid).await?;
    session.logout().await?;

    let content = MailContent::parse(&raw)?;
    if let Some(subject) = &content.subject {
        info!("Showing '{subject}' from {folder}");
    }
    println!("{}", content.html_display());
    Ok(())
}

async fn run_forget(store: &ConfigStore, name: &str) -> anyhow::Result<()> {
    let profiles = store.load()?;
    let profile = profiles
        .get(name)
        .cloned()
        .ok_or_else(|| anyhow!("No profile named '{name}'"))?;

    let outcome = tokio::task::spawn_blocking(move || {
        CredentialResolver::new(KeyringStore::new()).forget_secret(&profile)
    })
    .await
    .context("Secret store task failed")?;

    match outcome {
        CommitOutcome::Updated => println!("Removed stored password for '{name}'"),
        CommitOutcome::Skipped => println!("Profile '{name}' does not use the keyring"),
        CommitOutcome::Failed(e) => return Err(imapfeed_core::Error::from(e).into()),
    }
    Ok(())
}

/// Pick the named profile, or the first one by name.
fn select_profile<'a>(
    profiles: &'a ProfileMapping,
    name: Option<&str>,
    config_path: &Path,
) -> anyhow::Result<(&'a str, &'a ServerProfile)> {
    if let Some(name) = name {
        return profiles
            .get_key_value(name)
            .map(|(key, profile)| (key.as_str(), profile))
            .ok_or_else(|| anyhow!("No profile named '{name}' in {}", config_path.display()));
    }
    profiles
        .iter()
        .next()
        .map(|(key, profile)| (key.as_str(), profile))
        .ok_or_else(|| {
            anyhow!(
                "No server profiles configured; add one with `imapfeed profiles add` or edit {}",
                config_path.display()
            )
        })
}

fn describe_profile(name: &str, profile: &ServerProfile) -> String {
    let keyring = if profile.use_secret_store { "keyring" } else { "prompt" };
    format!("{name}\t{}\t{}\t{keyring}", profile.server, profile.user)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn profiles() -> ProfileMapping {
        let mut profiles = ProfileMapping::new();
        profiles.insert("work".to_string(), ServerProfile::new("imap.work.com", "bob", true));
        profiles.insert("home".to_string(), ServerProfile::new("imap.home.net:143", "bob", false));
        profiles
    }

    #[test]
    fn selects_named_profile() {
        let profiles = profiles();
        let (name, profile) =
            select_profile(&profiles, Some("work"), Path::new("cfg.json")).unwrap();
        assert_eq!(name, "work");
        assert_eq!(profile.server, "imap.work.com");
    }

    #[test]
    fn defaults_to_first_profile_by_name() {
        let profiles = profiles();
        let (name, _) = select_profile(&profiles, None, Path::new("cfg.json")).unwrap();
        assert_eq!(name, "home");
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let profiles = profiles();
        let err = select_profile(&profiles, Some("nope"), Path::new("cfg.json")).unwrap_err();
        assert!(err.to_string().contains("'nope'"));
    }

    #[test]
    fn empty_mapping_names_config_file() {
        let err = select_profile(&ProfileMapping::new(), None, Path::new("/x/imap_servers.json"))
            .unwrap_err();
        assert!(err.to_string().contains("/x/imap_servers.json"));
    }

    #[test]
    fn describes_profile() {
        let profile = ServerProfile::new("imap.work.com", "bob", true);
        assert_eq!(describe_profile("work", &profile), "work\timap.work.com\tbob\tkeyring");
    }

    #[test]
    fn add_then_remove_through_commands() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path());

        run_profiles(
            &store,
            ProfilesCommand::Add {
                name: "work".to_string(),
                server: "imap.work.com".to_string(),
                user: "bob".to_string(),
                use_secret_store: true,
            },
        )
        .unwrap();
        assert_eq!(store.load().unwrap()["work"], ServerProfile::new("imap.work.com", "bob", true));

        run_profiles(&store, ProfilesCommand::Remove { name: "work".to_string() }).unwrap();
        assert!(store.load().unwrap().is_empty());
        let again = run_profiles(&store, ProfilesCommand::Remove { name: "work".to_string() });
        assert!(again.is_err());
    }
}
