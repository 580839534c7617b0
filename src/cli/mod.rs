//! CLI Module
//!
//! Command-line interface using clap derive macros. Mirrors the
//! `ssh-cli ssh <command>` / `ssh-cli tui` layout.

mod commands;
mod prompt;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::store::AuthType;

pub use commands::execute;

/// Save, manage and connect to SSH credentials from the terminal.
#[derive(Parser, Debug)]
#[command(name = "ssh-cli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Credential store file (defaults to ~/.ssh-cred-manager/credentials.json)
    #[arg(long, global = true, env = "SSH_CLI_STORE", value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage and connect to saved SSH credentials
    #[command(visible_aliases = ["s", "ss"])]
    Ssh {
        #[command(subcommand)]
        command: SshCommands,
    },

    /// Open the full-screen terminal menu
    #[command(visible_aliases = ["t", "tu"])]
    Tui,

    /// Print the version number
    #[command(visible_alias = "v")]
    Version,
}

#[derive(Subcommand, Debug)]
pub enum SshCommands {
    /// Save a new SSH credential
    #[command(visible_aliases = ["s", "add", "a"])]
    Save {
        /// Name of the connection
        #[arg(short, long)]
        name: Option<String>,

        /// Host address
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// SSH port
        #[arg(short, long, default_value_t = 22)]
        port: u32,

        /// SSH username
        #[arg(short, long)]
        user: Option<String>,

        /// SSH password (for password auth; prompted when omitted)
        #[arg(short = 'P', long)]
        password: Option<String>,

        /// SSH private key path (defaults to the first key found in ~/.ssh)
        #[arg(short, long)]
        key: Option<String>,

        /// Authentication type: password or key
        #[arg(short, long = "auth-type", default_value = "key")]
        auth_type: AuthType,
    },

    /// Add one or more key-auth credentials from user@host[:port] strings
    #[command(visible_aliases = ["w", "wiz"])]
    Wizard {
        /// Connection strings
        #[arg(value_name = "USER@HOST[:PORT]", required = true)]
        targets: Vec<String>,
    },

    /// List saved credentials
    #[command(visible_aliases = ["ls", "l"])]
    List {
        /// Show every field except secrets
        #[arg(short, long)]
        long: bool,
    },

    /// Delete one credential, or pick several interactively
    #[command(visible_aliases = ["del", "rm", "d"])]
    Delete {
        /// Credential name
        name: Option<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Update an existing credential
    #[command(visible_aliases = ["u", "up"])]
    Update {
        /// Credential name (chosen from a list when omitted)
        name: Option<String>,
    },

    /// Rename a credential
    #[command(visible_alias = "mv")]
    Rename { old: String, new: String },

    /// Find credentials whose name contains the query
    #[command(visible_alias = "find")]
    Search { query: String },

    /// Connect using a saved credential
    #[command(visible_aliases = ["c", "conn"])]
    Connect {
        /// Credential name (prompted when omitted)
        name: Option<String>,

        /// Open the session in tmux
        #[arg(long)]
        tmux: bool,

        /// Skip host key verification
        #[arg(long, env = "SSH_CLI_NO_HOST_KEY_CHECK")]
        no_host_key_check: bool,

        /// Print the command instead of running it
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete every saved credential
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}
