//! ssh-cli - SSH Credential Manager
//!
//! Saves SSH connection details locally and connects with them, either from
//! one-shot subcommands or from a vim-style terminal menu.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod input;
mod ssh;
mod store;
mod ui;

use app::AppConfig;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::new(cli.store.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    init_tracing(&cli, &config);

    if let Err(e) = cli::execute(cli, config) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// RUST_LOG wins over --verbose. The terminal menu owns the screen, so its
/// logs go to a file next to the store.
fn init_tracing(cli: &Cli, config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(cli.verbose)));

    let (writer, ansi) = match cli.command {
        Commands::Tui => match open_log(&config.log_path()) {
            Ok(file) => (BoxMakeWriter::new(Mutex::new(file)), false),
            Err(_) => (BoxMakeWriter::new(io::sink), false),
        },
        _ => (BoxMakeWriter::new(io::stderr), true),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false)
        .init();
}

fn open_log(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Events are targeted at module paths, which start with the crate name
fn default_directive(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "warn" };
    format!("{}={level}", env!("CARGO_CRATE_NAME"))
}
