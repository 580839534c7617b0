//! CLI Command Handlers
//!
//! Each function handles one `ssh` subcommand against an open store. Output
//! and prompts go through a `Prompter`, so every handler can be driven from
//! a test buffer.

use std::io::{self, BufRead, Write};

use anyhow::{anyhow, bail, Context, Result};
use zeroize::Zeroizing;

use crate::app::{self, AppConfig};
use crate::ssh::{default_key_path, expand_tilde, SshCommand, SshOptions};
use crate::store::credential::normalize_name;
use crate::store::{AuthType, Credential, CredentialStore};

use super::prompt::Prompter;
use super::{Cli, Commands, SshCommands};

const RULE: &str = "---------------------";

/// Flags of `ssh save`
struct SaveArgs {
    name: Option<String>,
    host: Option<String>,
    port: u32,
    user: Option<String>,
    password: Option<String>,
    key: Option<String>,
    auth_type: AuthType,
}

/// Execute the parsed CLI command.
pub fn execute(cli: Cli, config: AppConfig) -> Result<()> {
    match cli.command {
        Commands::Version => {
            println!("ssh-cli: {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Tui => app::run(config).map_err(|e| anyhow!("terminal menu failed: {e}")),
        Commands::Ssh { command } => {
            let mut store = CredentialStore::open(config.store_config())
                .context("failed to open credential store")?;
            let mut prompter = Prompter::stdio();
            run_ssh(command, &mut store, &config, &mut prompter)
        }
    }
}

fn run_ssh<R: BufRead, W: Write>(
    command: SshCommands,
    store: &mut CredentialStore,
    config: &AppConfig,
    p: &mut Prompter<R, W>,
) -> Result<()> {
    match command {
        SshCommands::Save {
            name,
            host,
            port,
            user,
            password,
            key,
            auth_type,
        } => cmd_save(
            store,
            p,
            SaveArgs {
                name,
                host,
                port,
                user,
                password,
                key,
                auth_type,
            },
        ),
        SshCommands::Wizard { targets } => cmd_wizard(store, p, &targets),
        SshCommands::List { long } => cmd_list(store, p, long),
        SshCommands::Delete { name, yes } => cmd_delete(store, p, name, yes),
        SshCommands::Update { name } => cmd_update(store, p, name),
        SshCommands::Rename { old, new } => cmd_rename(store, p, &old, &new),
        SshCommands::Search { query } => cmd_search(store, p, &query),
        SshCommands::Connect {
            name,
            tmux,
            no_host_key_check,
            dry_run,
        } => {
            let mut opts = config.ssh.clone();
            opts.use_tmux |= tmux;
            if no_host_key_check {
                opts.strict_host_key_checking = false;
            }
            cmd_connect(store, p, &opts, name, dry_run)
        }
        SshCommands::Clear { yes } => cmd_clear(store, p, yes),
    }
}

// ─── Save / Wizard ───────────────────────────────────────────────────────────

fn cmd_save<R: BufRead, W: Write>(
    store: &mut CredentialStore,
    p: &mut Prompter<R, W>,
    args: SaveArgs,
) -> Result<()> {
    writeln!(p.out(), "Add new SSH credential")?;

    let name = match args.name {
        Some(name) => name,
        None => p.line("Enter connection name")?,
    };
    let name = unique_name(store, p, name)?;
    let host = given_or_prompt(p, args.host, "Enter host address")?;
    let user = given_or_prompt(p, args.user, "Enter username")?;

    let cred = match args.auth_type {
        AuthType::Password => {
            let password = match args.password {
                Some(pw) => Zeroizing::new(pw),
                None => p.password("Enter password")?,
            };
            Credential::with_password(&name, host, args.port, user, password.as_str())
        }
        AuthType::KeyFile => {
            let key = match args.key {
                Some(key) => key,
                None => {
                    let key = default_key_path().display().to_string();
                    writeln!(p.out(), "Using default key: {key}")?;
                    key
                }
            };
            let key = expand_tilde(key.trim()).display().to_string();
            Credential::with_key(&name, host, args.port, user, key)
        }
    };

    store.save(cred).context("failed to save credential")?;
    writeln!(p.out(), "Successfully saved SSH credential for {name}")?;
    Ok(())
}

fn given_or_prompt<R: BufRead, W: Write>(
    p: &mut Prompter<R, W>,
    given: Option<String>,
    prompt: &str,
) -> io::Result<String> {
    match given {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => p.line(prompt),
    }
}

/// Keep asking until the normalized name is non-empty and unused
fn unique_name<R: BufRead, W: Write>(
    store: &CredentialStore,
    p: &mut Prompter<R, W>,
    mut candidate: String,
) -> io::Result<String> {
    loop {
        let name = normalize_name(&candidate);
        if name.is_empty() {
            writeln!(p.out(), "Name cannot be empty. Try again.")?;
            candidate = p.line("Enter connection name")?;
            continue;
        }
        if store.exists(&name, &[]) {
            writeln!(p.out(), "Connection name '{name}' already exists.")?;
            candidate = p.line("Enter a different name")?;
            continue;
        }
        return Ok(name);
    }
}

fn cmd_wizard<R: BufRead, W: Write>(
    store: &mut CredentialStore,
    p: &mut Prompter<R, W>,
    targets: &[String],
) -> Result<()> {
    for target in targets.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        match wizard_entry(store, p, target) {
            Ok(cred) => writeln!(p.out(), "Saved: {} ({})", cred.name, cred.address())?,
            Err(e) => writeln!(p.out(), "Failed to save {target}: {e:#}")?,
        }
    }
    Ok(())
}

fn wizard_entry<R: BufRead, W: Write>(
    store: &mut CredentialStore,
    p: &mut Prompter<R, W>,
    target: &str,
) -> Result<Credential> {
    let (user, host, port) = parse_target(target)?;

    let suggested = format!("{user}@{host}");
    let mut name = normalize_name(&p.with_default(&format!("Enter name for {target}"), &suggested)?);
    while name.is_empty() || store.exists(&name, &[]) {
        if name.is_empty() {
            writeln!(p.out(), "Name cannot be empty. Please enter a valid name.")?;
        } else {
            writeln!(p.out(), "A credential named '{name}' already exists. Please enter a different name.")?;
        }
        name = normalize_name(&p.line(&format!("Enter name for {target}"))?);
    }

    let key = default_key_path().display().to_string();
    let cred = Credential::with_key(&name, host, port, user, key);
    store.save(cred)?;
    Ok(store.get(&name)?.clone())
}

/// `user@host[:port]`, with `[v6addr]:port` for IPv6
fn parse_target(target: &str) -> Result<(String, String, u32)> {
    let invalid = || anyhow!("invalid connection string '{target}': expected user@host[:port]");

    let (user, rest) = target.split_once('@').ok_or_else(invalid)?;
    if user.is_empty() || rest.is_empty() {
        return Err(invalid());
    }

    let (host, port) = match rest.strip_prefix('[') {
        Some(bracketed) => {
            let (host, tail) = bracketed.split_once(']').ok_or_else(invalid)?;
            match tail {
                "" => (host, None),
                tail => (host, Some(tail.strip_prefix(':').ok_or_else(invalid)?)),
            }
        }
        None => match rest.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (rest, None),
        },
    };

    let port = match port {
        Some(port) => port
            .parse::<u32>()
            .with_context(|| format!("invalid port '{port}' in '{target}'"))?,
        None => 22,
    };

    Ok((user.to_string(), host.to_string(), port))
}

// ─── List / Search ───────────────────────────────────────────────────────────

fn cmd_list<R: BufRead, W: Write>(
    store: &CredentialStore,
    p: &mut Prompter<R, W>,
    long: bool,
) -> Result<()> {
    let creds = store.list();
    if creds.is_empty() {
        writeln!(p.out(), "No SSH credentials found")?;
        return Ok(());
    }

    if long {
        writeln!(p.out(), "Saved SSH credentials (long output):")?;
        writeln!(p.out(), "{RULE}")?;
        for (i, cred) in creds.iter().enumerate() {
            writeln!(p.out(), "[{}]", i + 1)?;
            print_details(p.out(), cred, false)?;
            writeln!(p.out(), "    Created: {}", cred.created_at.format("%Y-%m-%d %H:%M"))?;
            writeln!(p.out(), "    Updated: {}", cred.updated_at.format("%Y-%m-%d %H:%M"))?;
            writeln!(p.out(), "{RULE}")?;
        }
        return Ok(());
    }

    writeln!(p.out(), "Saved SSH credentials:")?;
    writeln!(p.out(), "{RULE}")?;
    for (i, cred) in creds.iter().enumerate() {
        writeln!(p.out(), "[{}] {} ({})", i + 1, cred.name, cred.address())?;
    }
    writeln!(p.out(), "{RULE}")?;

    if !p.is_interactive() {
        return Ok(());
    }

    let input = p.line("Enter the numbers of the credentials you want to view (comma-separated, e.g. 1,3)")?;
    let picks = parse_selection(&input, creds.len());
    if picks.is_empty() {
        writeln!(p.out(), "No selection made.")?;
        return Ok(());
    }

    writeln!(p.out(), "\nSelected SSH credentials:")?;
    writeln!(p.out(), "{RULE}")?;
    for idx in picks {
        print_details(p.out(), &creds[idx], false)?;
        writeln!(p.out(), "{RULE}")?;
    }
    Ok(())
}

/// 1-based comma list into sorted, deduplicated 0-based indices; junk is skipped
fn parse_selection(input: &str, len: usize) -> Vec<usize> {
    let mut picks: Vec<usize> = input
        .split(',')
        .filter_map(|s| s.trim().parse::<usize>().ok())
        .filter(|n| (1..=len).contains(n))
        .map(|n| n - 1)
        .collect();
    picks.sort_unstable();
    picks.dedup();
    picks
}

fn print_details<W: Write>(out: &mut W, cred: &Credential, show_sensitive: bool) -> io::Result<()> {
    writeln!(out, "    Name: {}", cred.name)?;
    writeln!(out, "    ID: {}", cred.id)?;
    writeln!(out, "    Host: {}:{}", cred.host, cred.port)?;
    writeln!(out, "    Username: {}", cred.username)?;
    writeln!(out, "    Auth Type: {}", cred.auth_type)?;
    match cred.auth_type {
        AuthType::Password if show_sensitive => {
            writeln!(out, "    Password: {}", cred.password.as_deref().unwrap_or_default())?
        }
        AuthType::Password => writeln!(out, "    Password: ********")?,
        AuthType::KeyFile => writeln!(out, "    Key Path: {}", cred.key_path.as_deref().unwrap_or_default())?,
    }
    Ok(())
}

fn cmd_search<R: BufRead, W: Write>(
    store: &CredentialStore,
    p: &mut Prompter<R, W>,
    query: &str,
) -> Result<()> {
    let matches = store.find_by_name_substring(query);
    if matches.is_empty() {
        writeln!(p.out(), "No credentials match '{query}'")?;
        return Ok(());
    }

    for cred in matches {
        writeln!(p.out(), "{} ({}, {})", cred.name, cred.address(), cred.auth_type)?;
    }
    Ok(())
}

// ─── Delete / Clear ──────────────────────────────────────────────────────────

fn cmd_delete<R: BufRead, W: Write>(
    store: &mut CredentialStore,
    p: &mut Prompter<R, W>,
    name: Option<String>,
    yes: bool,
) -> Result<()> {
    let Some(name) = name else {
        if store.count() == 0 {
            bail!("no credentials found");
        }
        return delete_interactive(store, p, yes);
    };

    let cred = store.get(&name)?.clone();
    writeln!(p.out(), "\nConnection Details:")?;
    print_details(p.out(), &cred, false)?;

    if !yes && !p.confirm("\nDo you want to delete this credential?")? {
        writeln!(p.out(), "Deletion cancelled")?;
        return Ok(());
    }

    store.delete(&cred.name).context("failed to delete credential")?;
    writeln!(p.out(), "Successfully deleted credential '{}'", cred.name)?;
    Ok(())
}

fn delete_interactive<R: BufRead, W: Write>(
    store: &mut CredentialStore,
    p: &mut Prompter<R, W>,
    yes: bool,
) -> Result<()> {
    let creds = store.list().to_vec();
    let mut selected = vec![false; creds.len()];
    let mut show_sensitive = false;
    let mut notice: Option<String> = None;

    loop {
        p.clear_screen()?;
        writeln!(p.out(), "\nAvailable credentials:")?;
        writeln!(p.out(), "{RULE}")?;
        for (i, cred) in creds.iter().enumerate() {
            let mark = if selected[i] { "[x]" } else { "[ ]" };
            writeln!(p.out(), "  {mark} {}. {} ({})", i + 1, cred.name, cred.target())?;
        }
        writeln!(p.out(), "\nCommands:")?;
        writeln!(p.out(), "  1-N: Toggle selection")?;
        writeln!(p.out(), "  v:   View credential details")?;
        writeln!(p.out(), "  t:   Toggle sensitive information")?;
        writeln!(p.out(), "  d:   Delete selected credentials")?;
        writeln!(p.out(), "  q:   Quit without deleting")?;
        if let Some(msg) = notice.take() {
            writeln!(p.out(), "\n{msg}")?;
        }

        let choice = p.line("\nEnter command")?.to_lowercase();
        match choice.as_str() {
            "q" => return Ok(()),
            "v" => {
                let input = p.line("Enter credential number to view")?;
                match input.parse::<usize>().ok().and_then(|n| n.checked_sub(1)).and_then(|i| creds.get(i)) {
                    Some(cred) => print_details(p.out(), cred, show_sensitive)?,
                    None => writeln!(p.out(), "No credential number {input}")?,
                }
                p.pause()?;
            }
            "t" => {
                show_sensitive = !show_sensitive;
                let state = if show_sensitive { "shown" } else { "hidden" };
                notice = Some(format!("Sensitive information is now {state}"));
            }
            "d" => {
                let chosen: Vec<&Credential> = creds
                    .iter()
                    .zip(&selected)
                    .filter_map(|(c, &on)| on.then_some(c))
                    .collect();
                if chosen.is_empty() {
                    notice = Some("No credentials selected".to_string());
                    continue;
                }

                p.clear_screen()?;
                writeln!(p.out(), "Selected credentials to delete:")?;
                writeln!(p.out(), "{RULE}")?;
                for cred in &chosen {
                    print_details(p.out(), cred, false)?;
                    writeln!(p.out(), "{RULE}")?;
                }
                if !yes && !p.confirm("\nAre you sure you want to delete selected credentials?")? {
                    continue;
                }

                for cred in &chosen {
                    store
                        .delete(&cred.name)
                        .with_context(|| format!("failed to delete credential {}", cred.name))?;
                    writeln!(p.out(), "Deleted: {}", cred.name)?;
                }
                writeln!(p.out(), "\nSuccessfully deleted {} credential(s)", chosen.len())?;
                return Ok(());
            }
            other => match other.parse::<usize>() {
                Ok(n) if (1..=creds.len()).contains(&n) => selected[n - 1] = !selected[n - 1],
                _ => notice = Some(format!("Unknown command: {other}")),
            },
        }
    }
}

fn cmd_clear<R: BufRead, W: Write>(
    store: &mut CredentialStore,
    p: &mut Prompter<R, W>,
    yes: bool,
) -> Result<()> {
    let count = store.count();
    if count == 0 {
        writeln!(p.out(), "No SSH credentials found")?;
        return Ok(());
    }

    if !yes && !p.confirm(&format!("Delete all {count} credentials? This cannot be undone"))? {
        writeln!(p.out(), "Cancelled")?;
        return Ok(());
    }

    store.clear_all().context("failed to clear credentials")?;
    writeln!(p.out(), "Deleted {count} credential(s)")?;
    Ok(())
}

// ─── Update / Rename ─────────────────────────────────────────────────────────

fn cmd_update<R: BufRead, W: Write>(
    store: &mut CredentialStore,
    p: &mut Prompter<R, W>,
    name: Option<String>,
) -> Result<()> {
    writeln!(p.out(), "Updating SSH credential...")?;

    let current = match name.filter(|n| !n.trim().is_empty()) {
        Some(name) => store.get(&name)?.clone(),
        None => choose_credential(store, p)?,
    };

    writeln!(p.out(), "\nCurrent credential values:")?;
    print_details(p.out(), &current, false)?;
    writeln!(p.out(), "Leave blank to keep current value.")?;

    let mut next = current.clone();
    next.name = p.with_default("New Name", &current.name)?;
    next.host = p.with_default("New Host", &current.host)?;
    let port = p.with_default("New Port", &current.port.to_string())?;
    next.port = port.parse().with_context(|| format!("invalid port '{port}'"))?;
    next.username = p.with_default("New Username", &current.username)?;
    next.auth_type = p
        .with_default("New AuthType (password/key)", current.auth_type.as_str())?
        .parse()?;

    match next.auth_type {
        AuthType::Password => {
            let password = p.password("New Password (leave blank to keep)")?;
            if !password.trim().is_empty() {
                next.password = Some(password.to_string());
            }
        }
        AuthType::KeyFile => {
            let default = current
                .key_path
                .clone()
                .unwrap_or_else(|| default_key_path().display().to_string());
            let key = p.with_default("New KeyPath", &default)?;
            next.key_path = Some(expand_tilde(&key).display().to_string());
        }
    }

    store
        .update(&current.name, next)
        .context("failed to update credential")?;
    writeln!(p.out(), "Credential updated successfully.")?;
    Ok(())
}

fn choose_credential<R: BufRead, W: Write>(
    store: &CredentialStore,
    p: &mut Prompter<R, W>,
) -> Result<Credential> {
    let creds = store.list();
    if creds.is_empty() {
        bail!("no credentials found");
    }

    writeln!(p.out(), "Available credentials:")?;
    for (i, cred) in creds.iter().enumerate() {
        writeln!(p.out(), "[{}] {} ({})", i + 1, cred.name, cred.address())?;
    }

    let choice = p.line("Select credential by number")?;
    choice
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| creds.get(i))
        .cloned()
        .ok_or_else(|| anyhow!("invalid selection '{choice}'"))
}

fn cmd_rename<R: BufRead, W: Write>(
    store: &mut CredentialStore,
    p: &mut Prompter<R, W>,
    old: &str,
    new: &str,
) -> Result<()> {
    store.rename(old, new).context("failed to rename credential")?;
    writeln!(p.out(), "Renamed '{}' to '{}'", normalize_name(old), normalize_name(new))?;
    Ok(())
}

// ─── Connect ─────────────────────────────────────────────────────────────────

fn cmd_connect<R: BufRead, W: Write>(
    store: &CredentialStore,
    p: &mut Prompter<R, W>,
    opts: &SshOptions,
    name: Option<String>,
    dry_run: bool,
) -> Result<()> {
    let name = match name {
        Some(name) => name,
        None => p.line("Enter credential name")?,
    };
    let cred = store.get(&name)?;
    let command = SshCommand::for_credential(cred, opts);

    if dry_run {
        writeln!(p.out(), "{}", command.display())?;
        return Ok(());
    }

    writeln!(p.out(), "Connecting to {}...", cred.address())?;
    p.out().flush()?;
    command
        .run()
        .with_context(|| format!("connection to '{}' failed", cred.name))
}
