//! Credential Validation
//!
//! Pure checks run before any credential reaches disk. Validation never
//! mutates its input; callers normalize first (see `Credential::normalize`).

use std::net::{IpAddr, Ipv6Addr};
use std::path::Path;

use thiserror::Error;

use super::credential::{AuthType, Credential};

pub const MIN_PORT: u32 = 1;
pub const MAX_PORT: u32 = 65535;

const MAX_HOSTNAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// A single violated constraint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name cannot be empty")]
    EmptyName,

    #[error("host cannot be empty")]
    EmptyHost,

    #[error("port must be between {MIN_PORT} and {MAX_PORT}, got {0}")]
    PortOutOfRange(u32),

    #[error("invalid host or port '{host}:{port}': {reason}")]
    InvalidAddress {
        host: String,
        port: u32,
        reason: String,
    },

    #[error("username cannot be empty")]
    EmptyUsername,

    #[error("password cannot be empty when using password authentication")]
    EmptyPassword,

    #[error("key path cannot be empty when using key authentication")]
    EmptyKeyPath,

    #[error("SSH key file does not exist: {0}")]
    KeyFileMissing(String),

    #[error("expected a file but got directory: {0}")]
    KeyPathIsDirectory(String),

    #[error("unable to access SSH key file {path}: {reason}")]
    KeyFileInaccessible { path: String, reason: String },

    #[error("invalid authentication type '{0}': use 'password' or 'key'")]
    InvalidAuthType(String),
}

/// Run every check in order and stop at the first violation.
pub fn validate(cred: &Credential) -> Result<(), ValidationError> {
    let host = cred.host.trim();

    if cred.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if host.is_empty() {
        return Err(ValidationError::EmptyHost);
    }
    if cred.username.trim().is_empty() {
        return Err(ValidationError::EmptyUsername);
    }
    validate_port(cred.port)?;
    validate_address(host, cred.port)?;

    match cred.auth_type {
        AuthType::Password => {
            let empty = cred.password.as_deref().is_none_or(|p| p.trim().is_empty());
            if empty {
                return Err(ValidationError::EmptyPassword);
            }
        }
        AuthType::KeyFile => {
            let path = cred.key_path.as_deref().map(str::trim).unwrap_or_default();
            if path.is_empty() {
                return Err(ValidationError::EmptyKeyPath);
            }
            validate_key_file(path)?;
        }
    }

    Ok(())
}

pub fn validate_port(port: u32) -> Result<(), ValidationError> {
    if !(MIN_PORT..=MAX_PORT).contains(&port) {
        return Err(ValidationError::PortOutOfRange(port));
    }
    Ok(())
}

/// Syntactic host check. Accepts IP literals (IPv6 optionally bracketed)
/// and RFC 1123 hostnames; never touches the network.
pub fn validate_address(host: &str, port: u32) -> Result<(), ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidAddress {
        host: host.to_string(),
        port,
        reason: reason.to_string(),
    };

    if let Some(inner) = host.strip_prefix('[') {
        let inner = inner.strip_suffix(']').ok_or_else(|| invalid("unterminated IPv6 bracket"))?;
        return inner
            .parse::<Ipv6Addr>()
            .map(|_| ())
            .map_err(|_| invalid("not a valid IPv6 address"));
    }

    if host.parse::<IpAddr>().is_ok() {
        return Ok(());
    }

    check_hostname(host).map_err(invalid)
}

fn check_hostname(host: &str) -> Result<(), &'static str> {
    let name = host.strip_suffix('.').unwrap_or(host);

    if name.is_empty() {
        return Err("empty hostname");
    }
    if name.len() > MAX_HOSTNAME_LEN {
        return Err("hostname too long");
    }

    let labels: Vec<&str> = name.split('.').collect();
    for label in &labels {
        if label.is_empty() {
            return Err("empty label in hostname");
        }
        if label.len() > MAX_LABEL_LEN {
            return Err("hostname label too long");
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err("hostname label starts or ends with '-'");
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err("hostname contains invalid characters");
        }
    }

    // Digits-and-dots that failed IP parsing is a malformed IPv4 address
    let all_numeric = labels.iter().all(|l| l.chars().all(|c| c.is_ascii_digit()));
    if all_numeric {
        return Err("not a valid IPv4 address");
    }

    Ok(())
}

fn validate_key_file(path: &str) -> Result<(), ValidationError> {
    match std::fs::metadata(Path::new(path)) {
        Ok(meta) if meta.is_dir() => Err(ValidationError::KeyPathIsDirectory(path.to_string())),
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ValidationError::KeyFileMissing(path.to_string()))
        }
        Err(e) => Err(ValidationError::KeyFileInaccessible {
            path: path.to_string(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    fn key_cred(key_path: &str) -> Credential {
        Credential::with_key("box1", "1.2.3.4", 22, "ubuntu", key_path)
    }

    #[test]
    fn test_valid_key_credential() {
        let key = NamedTempFile::new().unwrap();
        let cred = key_cred(key.path().to_str().unwrap());
        assert_eq!(validate(&cred), Ok(()));
    }

    #[test]
    fn test_valid_password_credential() {
        let cred = Credential::with_password("relay", "relay.example.com", 2222, "root", "pw");
        assert_eq!(validate(&cred), Ok(()));
    }

    #[test]
    fn test_required_fields() {
        let key = NamedTempFile::new().unwrap();
        let path = key.path().to_str().unwrap();

        let mut cred = key_cred(path);
        cred.name = "   ".to_string();
        assert_eq!(validate(&cred), Err(ValidationError::EmptyName));

        let mut cred = key_cred(path);
        cred.host = String::new();
        assert_eq!(validate(&cred), Err(ValidationError::EmptyHost));

        let mut cred = key_cred(path);
        cred.username = " ".to_string();
        assert_eq!(validate(&cred), Err(ValidationError::EmptyUsername));
    }

    #[test]
    fn test_port_bounds() {
        assert_eq!(validate_port(0), Err(ValidationError::PortOutOfRange(0)));
        assert_eq!(validate_port(65536), Err(ValidationError::PortOutOfRange(65536)));
        assert_eq!(validate_port(1), Ok(()));
        assert_eq!(validate_port(65535), Ok(()));
    }

    #[test]
    fn test_address_syntax() {
        for ok in ["1.2.3.4", "::1", "[fe80::1]", "example.com", "my_box.local", "host-1.", "localhost"] {
            assert!(validate_address(ok, 22).is_ok(), "{ok} should be accepted");
        }
        for bad in ["1.2.3.256", "exa mple.com", "-bad.com", "a..b", "user@host", "[::1", "host:22", "[nope]"] {
            assert!(
                matches!(validate_address(bad, 22), Err(ValidationError::InvalidAddress { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_password_auth_requires_password() {
        let mut cred = Credential::with_password("relay", "10.0.0.1", 22, "root", "  ");
        assert_eq!(validate(&cred), Err(ValidationError::EmptyPassword));

        cred.password = None;
        assert_eq!(validate(&cred), Err(ValidationError::EmptyPassword));
    }

    #[test]
    fn test_key_auth_checks_file() {
        assert_eq!(validate(&key_cred("")), Err(ValidationError::EmptyKeyPath));

        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let missing = missing.to_str().unwrap();
        assert_eq!(
            validate(&key_cred(missing)),
            Err(ValidationError::KeyFileMissing(missing.to_string()))
        );

        let as_dir = dir.path().to_str().unwrap();
        assert_eq!(
            validate(&key_cred(as_dir)),
            Err(ValidationError::KeyPathIsDirectory(as_dir.to_string()))
        );
    }

    #[test]
    fn test_first_violation_wins() {
        let mut cred = Credential::with_password("", "", 0, "", "");
        assert_eq!(validate(&cred), Err(ValidationError::EmptyName));

        cred.name = "x".to_string();
        cred.host = "h".to_string();
        cred.username = "u".to_string();
        assert_eq!(validate(&cred), Err(ValidationError::PortOutOfRange(0)));
    }
}
