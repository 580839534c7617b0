//! SSH Launcher
//!
//! Turns a saved credential into an `ssh` invocation and runs it with the
//! terminal attached. Passwords travel through the `SSHPASS` environment
//! variable for `sshpass -e` and are never placed in the argument vector.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use zeroize::Zeroizing;

use crate::store::{AuthType, Credential};

const DEFAULT_KEYS: [&str; 4] = ["id_rsa", "id_ed25519", "id_ecdsa", "id_dsa"];

/// Launcher errors
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("'{binary}' was not found in PATH ({hint})")]
    MissingBinary { binary: String, hint: &'static str },

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {code}")]
    Exited { program: String, code: i32 },
}

/// How connections are launched
#[derive(Debug, Clone)]
pub struct SshOptions {
    pub ssh_binary: String,
    pub sshpass_binary: String,
    pub tmux_binary: String,
    pub strict_host_key_checking: bool,
    pub use_tmux: bool,
}

impl Default for SshOptions {
    fn default() -> Self {
        Self {
            ssh_binary: "ssh".to_string(),
            sshpass_binary: "sshpass".to_string(),
            tmux_binary: "tmux".to_string(),
            strict_host_key_checking: true,
            use_tmux: false,
        }
    }
}

/// A fully built launch command
pub struct SshCommand {
    program: String,
    args: Vec<String>,
    password: Option<Zeroizing<String>>,
    required: Vec<String>,
}

impl fmt::Debug for SshCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshCommand")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl SshCommand {
    pub fn for_credential(cred: &Credential, opts: &SshOptions) -> Self {
        let inside_tmux = std::env::var_os("TMUX").is_some_and(|v| !v.is_empty());
        Self::build(cred, opts, inside_tmux)
    }

    fn build(cred: &Credential, opts: &SshOptions, inside_tmux: bool) -> Self {
        let mut ssh_args = vec!["-p".to_string(), cred.port.to_string()];

        if cred.auth_type == AuthType::KeyFile {
            if let Some(key) = cred.key_path.as_deref() {
                ssh_args.push("-i".to_string());
                ssh_args.push(expand_tilde(key).to_string_lossy().into_owned());
            }
        }

        if !opts.strict_host_key_checking {
            ssh_args.extend(
                ["-o", "StrictHostKeyChecking=no", "-o", "UserKnownHostsFile=/dev/null"]
                    .map(String::from),
            );
        }
        ssh_args.push(cred.target());

        // A tmux window does not inherit our environment, so password
        // logins inside tmux fall back to ssh's own prompt.
        let password = match (cred.auth_type, opts.use_tmux) {
            (AuthType::Password, false) => cred.password.clone().map(Zeroizing::new),
            _ => None,
        };

        let mut required = vec![opts.ssh_binary.clone()];
        let (program, args) = if password.is_some() {
            required.push(opts.sshpass_binary.clone());
            let mut args = vec!["-e".to_string(), opts.ssh_binary.clone()];
            args.extend(ssh_args);
            (opts.sshpass_binary.clone(), args)
        } else {
            (opts.ssh_binary.clone(), ssh_args)
        };

        if !opts.use_tmux {
            return Self { program, args, password, required };
        }

        required.push(opts.tmux_binary.clone());
        let mut tmux_args: Vec<String> = if inside_tmux {
            vec!["new-window".into(), "-n".into(), cred.name.clone()]
        } else {
            vec!["new-session".into(), "-A".into(), "-s".into(), format!("ssh-{}", cred.name)]
        };
        tmux_args.push("--".into());
        tmux_args.push(program);
        tmux_args.extend(args);

        Self {
            program: opts.tmux_binary.clone(),
            args: tmux_args,
            password,
            required,
        }
    }

    #[cfg(test)]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[cfg(test)]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Shell-style rendering; the password never appears
    pub fn display(&self) -> String {
        let mut out = String::new();
        if self.password.is_some() {
            out.push_str("SSHPASS=**** ");
        }
        out.push_str(&shell_quote(&self.program));
        for arg in &self.args {
            out.push(' ');
            out.push_str(&shell_quote(arg));
        }
        out
    }

    /// Every binary the command needs must be on PATH
    pub fn check_binaries(&self) -> Result<(), LaunchError> {
        for binary in &self.required {
            if find_in_path(binary).is_none() {
                return Err(LaunchError::MissingBinary {
                    binary: binary.clone(),
                    hint: install_hint(binary),
                });
            }
        }
        Ok(())
    }

    /// Run attached to the current terminal and wait for it to exit
    pub fn run(&self) -> Result<(), LaunchError> {
        self.check_binaries()?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(password) = &self.password {
            cmd.env("SSHPASS", password.as_str());
        }

        tracing::info!(program = %self.program, "launching ssh session");

        let status = cmd.status().map_err(|source| LaunchError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        if status.success() {
            return Ok(());
        }

        let code = status.code().unwrap_or(-1);
        tracing::warn!(program = %self.program, code, "ssh session ended with failure");
        Err(LaunchError::Exited {
            program: self.program.clone(),
            code,
        })
    }
}

fn install_hint(binary: &str) -> &'static str {
    match Path::new(binary).file_name().and_then(|n| n.to_str()) {
        Some("sshpass") => "install sshpass, e.g. `apt install sshpass` or `brew install hudochenkov/sshpass/sshpass`",
        Some("tmux") => "install tmux or connect without --tmux",
        Some("ssh") => "install an OpenSSH client",
        _ => "check your PATH",
    }
}

fn shell_quote(s: &str) -> String {
    let plain = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=@:,+%".contains(c));
    if plain {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}

/// Resolve an executable by name on `$PATH`. Paths with a separator are
/// checked as given.
pub fn find_in_path(binary: &str) -> Option<PathBuf> {
    let candidate = Path::new(binary);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(binary))
        .find(|path| is_executable(path))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path).is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}

/// Replace a leading `~` with the home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (path, home) {
        ("~", Some(home)) => home,
        (p, Some(home)) if p.starts_with("~/") => home.join(&p[2..]),
        (p, _) => PathBuf::from(p),
    }
}

/// First existing conventional private key under `~/.ssh`, else `~/.ssh/id_rsa`
pub fn default_key_path() -> PathBuf {
    let ssh_dir = dirs::home_dir().unwrap_or_default().join(".ssh");
    first_existing_key(&ssh_dir)
}

fn first_existing_key(ssh_dir: &Path) -> PathBuf {
    DEFAULT_KEYS
        .iter()
        .map(|name| ssh_dir.join(name))
        .find(|path| path.is_file())
        .unwrap_or_else(|| ssh_dir.join(DEFAULT_KEYS[0]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn key_cred() -> Credential {
        Credential::with_key("box1", "1.2.3.4", 2222, "ubuntu", "/keys/id_ed25519")
    }

    fn password_cred() -> Credential {
        Credential::with_password("relay", "relay.example.com", 22, "root", "hunter2")
    }

    #[test]
    fn test_key_auth_command() {
        let cmd = SshCommand::build(&key_cred(), &SshOptions::default(), false);

        assert_eq!(cmd.program(), "ssh");
        assert_eq!(cmd.args(), ["-p", "2222", "-i", "/keys/id_ed25519", "ubuntu@1.2.3.4"]);
        assert!(cmd.password.is_none());
    }

    #[test]
    fn test_password_auth_uses_sshpass_env() {
        let cmd = SshCommand::build(&password_cred(), &SshOptions::default(), false);

        assert_eq!(cmd.program(), "sshpass");
        assert_eq!(cmd.args(), ["-e", "ssh", "-p", "22", "root@relay.example.com"]);
        assert!(!cmd.args().iter().any(|a| a.contains("hunter2")));
        assert_eq!(cmd.password.as_deref().map(String::as_str), Some("hunter2"));
        assert_eq!(cmd.required, ["ssh", "sshpass"]);
    }

    #[test]
    fn test_host_key_checking_disabled() {
        let opts = SshOptions {
            strict_host_key_checking: false,
            ..SshOptions::default()
        };
        let cmd = SshCommand::build(&key_cred(), &opts, false);

        assert_eq!(
            cmd.args(),
            [
                "-p",
                "2222",
                "-i",
                "/keys/id_ed25519",
                "-o",
                "StrictHostKeyChecking=no",
                "-o",
                "UserKnownHostsFile=/dev/null",
                "ubuntu@1.2.3.4"
            ]
        );
    }

    #[test]
    fn test_tmux_wrapping() {
        let opts = SshOptions {
            use_tmux: true,
            ..SshOptions::default()
        };

        let session = SshCommand::build(&key_cred(), &opts, false);
        assert_eq!(session.program(), "tmux");
        assert_eq!(&session.args()[..5], ["new-session", "-A", "-s", "ssh-box1", "--"]);
        assert_eq!(session.args()[5], "ssh");

        let window = SshCommand::build(&key_cred(), &opts, true);
        assert_eq!(&window.args()[..4], ["new-window", "-n", "box1", "--"]);
        assert!(window.required.contains(&"tmux".to_string()));
    }

    #[test]
    fn test_tmux_password_falls_back_to_prompt() {
        let opts = SshOptions {
            use_tmux: true,
            ..SshOptions::default()
        };
        let cmd = SshCommand::build(&password_cred(), &opts, false);

        assert!(cmd.password.is_none());
        assert!(!cmd.args().contains(&"sshpass".to_string()));
    }

    #[test]
    fn test_display_hides_password() {
        let cmd = SshCommand::build(&password_cred(), &SshOptions::default(), false);
        let shown = cmd.display();

        assert_eq!(shown, "SSHPASS=**** sshpass -e ssh -p 22 root@relay.example.com");
        assert!(!shown.contains("hunter2"));
        assert!(!format!("{cmd:?}").contains("hunter2"));
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("plain-arg"), "plain-arg");
        assert_eq!(shell_quote("has space"), "'has space'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn test_missing_binary() {
        let opts = SshOptions {
            ssh_binary: "definitely-not-a-real-ssh-binary".to_string(),
            ..SshOptions::default()
        };
        let cmd = SshCommand::build(&key_cred(), &opts, false);

        match cmd.check_binaries() {
            Err(LaunchError::MissingBinary { binary, .. }) => {
                assert_eq!(binary, "definitely-not-a-real-ssh-binary")
            }
            other => panic!("expected MissingBinary, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_find_in_path_explicit_path() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let script = dir.path().join("fake-ssh");
        std::fs::write(&script, "#!/bin/sh\n").unwrap();
        assert_eq!(find_in_path(script.to_str().unwrap()), None);

        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(find_in_path(script.to_str().unwrap()), Some(script));
    }

    #[test]
    fn test_first_existing_key() {
        let dir = TempDir::new().unwrap();
        assert_eq!(first_existing_key(dir.path()), dir.path().join("id_rsa"));

        std::fs::write(dir.path().join("id_ecdsa"), "key").unwrap();
        assert_eq!(first_existing_key(dir.path()), dir.path().join("id_ecdsa"));

        std::fs::write(dir.path().join("id_ed25519"), "key").unwrap();
        assert_eq!(first_existing_key(dir.path()), dir.path().join("id_ed25519"));
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("/abs/key"), PathBuf::from("/abs/key"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/.ssh/id_rsa"), home.join(".ssh/id_rsa"));
        }
    }
}
