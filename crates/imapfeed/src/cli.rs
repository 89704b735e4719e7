//! Command line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Default number of login attempts before giving up.
pub const DEFAULT_LOGIN_ATTEMPTS: u32 = 3;

/// Read mail from IMAP servers configured in `~/.imapfeed/imap_servers.json`.
#[derive(Debug, Parser)]
#[command(name = "imapfeed", version, about)]
pub struct Cli {
    /// Base directory containing `.imapfeed/` (defaults to the home directory).
    #[arg(long, global = true, env = "IMAPFEED_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage server profiles.
    Profiles {
        /// Profile operation.
        #[command(subcommand)]
        action: ProfilesCommand,
    },
    /// Log in to a server and list its folders.
    Folders {
        /// Profile to use (defaults to the first profile by name).
        #[arg(long, short)]
        profile: Option<String>,
        /// Number of password attempts when the server rejects the login.
        #[arg(long, default_value_t = DEFAULT_LOGIN_ATTEMPTS)]
        attempts: u32,
    },
    /// Log in to a server and print one message as HTML.
    Show {
        /// Profile to use (defaults to the first profile by name).
        #[arg(long, short)]
        profile: Option<String>,
        /// Server folder name, as the server spells it.
        #[arg(long, short, default_value = "INBOX")]
        folder: String,
        /// Message UID (defaults to the newest message).
        #[arg(long)]
        uid: Option<u32>,
        /// Number of password attempts when the server rejects the login.
        #[arg(long, default_value_t = DEFAULT_LOGIN_ATTEMPTS)]
        attempts: u32,
    },
    /// Remove a profile's password from the system keyring.
    Forget {
        /// Profile name.
        name: String,
    },
}

/// Server profile operations.
#[derive(Debug, Subcommand)]
pub enum ProfilesCommand {
    /// List configured profiles.
    List,
    /// Add or replace a profile.
    Add {
        /// Profile name.
        name: String,
        /// Server address as `host[:port]`.
        #[arg(long)]
        server: String,
        /// Username for authentication.
        #[arg(long)]
        user: String,
        /// Keep the password in the system keyring after a successful login.
        #[arg(long)]
        use_secret_store: bool,
    },
    /// Remove a profile.
    Remove {
        /// Profile name.
        name: String,
    },
}
