//! Credential Model
//!
//! One saved SSH connection profile and its on-disk representation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::validation::ValidationError;

/// Authentication method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthType {
    #[serde(rename = "password")]
    Password,
    #[serde(rename = "key")]
    KeyFile,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::KeyFile => "key",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Password => "Password",
            Self::KeyFile => "Key File",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::Password => Self::KeyFile,
            Self::KeyFile => Self::Password,
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "password" => Ok(Self::Password),
            "key" | "keyfile" | "key_file" => Ok(Self::KeyFile),
            other => Err(ValidationError::InvalidAuthType(other.to_string())),
        }
    }
}

/// Credential model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub id: String,
    pub name: String,
    pub host: String,
    pub port: u32,
    pub username: String,
    pub auth_type: AuthType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_path: Option<String>,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
}

impl Credential {
    /// Create a new key-file credential with generated ID
    pub fn with_key(
        name: impl Into<String>,
        host: impl Into<String>,
        port: u32,
        username: impl Into<String>,
        key_path: impl Into<String>,
    ) -> Self {
        let mut cred = Self::blank(name, host, port, username, AuthType::KeyFile);
        cred.key_path = Some(key_path.into());
        cred
    }

    /// Create a new password credential with generated ID
    pub fn with_password(
        name: impl Into<String>,
        host: impl Into<String>,
        port: u32,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let mut cred = Self::blank(name, host, port, username, AuthType::Password);
        cred.password = Some(password.into());
        cred
    }

    fn blank(
        name: impl Into<String>,
        host: impl Into<String>,
        port: u32,
        username: impl Into<String>,
        auth_type: AuthType,
    ) -> Self {
        let now = Local::now();
        Self {
            id: generate_id(),
            name: name.into(),
            host: host.into(),
            port,
            username: username.into(),
            auth_type,
            password: None,
            key_path: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Trim every text field, lowercase the name and drop the inactive secret.
    pub fn normalize(&mut self) {
        self.name = normalize_name(&self.name);
        self.host = self.host.trim().to_string();
        self.username = self.username.trim().to_string();
        self.password = self.password.as_deref().map(|p| p.trim().to_string());
        self.key_path = self.key_path.as_deref().map(|k| k.trim().to_string());

        match self.auth_type {
            AuthType::Password => self.key_path = None,
            AuthType::KeyFile => self.password = None,
        }
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// The secret that matters for this auth type
    pub fn active_secret(&self) -> Option<&str> {
        match self.auth_type {
            AuthType::Password => self.password.as_deref(),
            AuthType::KeyFile => self.key_path.as_deref(),
        }
    }

    /// `user@host`
    pub fn target(&self) -> String {
        format!("{}@{}", self.username, self.host)
    }

    /// `user@host:port`
    pub fn address(&self) -> String {
        format!("{}@{}:{}", self.username, self.host, self.port)
    }
}

/// Lookup key form of a name
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// 8 random bytes, hex encoded
pub fn generate_id() -> String {
    let mut bytes = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
