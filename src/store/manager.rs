//! Store Manager
//!
//! Owns the in-memory credential collection and the JSON file backing it.
//! Every mutation builds the next collection, flushes it to disk, and only
//! then replaces the in-memory copy, so a failed write leaves both the file
//! and the collection as they were.
//!
//! There is no cross-process locking: two processes flushing the same file
//! race and the last write wins.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::credential::{generate_id, normalize_name, Credential};
use super::validation::{validate, ValidationError};
use super::{StoreError, StoreResult};

const STORE_DIR: &str = ".ssh-cred-manager";
const STORE_FILE: &str = "credentials.json";

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the JSON backing file
    pub path: PathBuf,
}

impl StoreConfig {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.ssh-cred-manager/credentials.json`
    pub fn default_path() -> StoreResult<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(STORE_DIR).join(STORE_FILE))
            .ok_or(StoreError::NoHomeDir)
    }
}

#[derive(Serialize)]
struct StoreFileRef<'a> {
    credentials: &'a [Credential],
}

#[derive(Deserialize)]
struct StoreFile {
    #[serde(default)]
    credentials: Vec<Credential>,
}

/// Older files hold a bare array of records instead of the object layout
fn is_legacy_layout(bytes: &[u8]) -> bool {
    bytes.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'[')
}

fn parse_store(path: &Path, bytes: &[u8]) -> StoreResult<Vec<Credential>> {
    let credentials = if is_legacy_layout(bytes) {
        tracing::warn!(path = %path.display(), "store uses the legacy array layout; it will be rewritten on next save");
        serde_json::from_slice::<Vec<Credential>>(bytes)?
    } else {
        serde_json::from_slice::<StoreFile>(bytes)?.credentials
    };

    let mut seen = HashSet::new();
    for cred in &credentials {
        let key = normalize_name(&cred.name);
        if !seen.insert(key.clone()) {
            return Err(StoreError::DuplicateName(key));
        }
    }
    Ok(credentials)
}

/// Credential store
#[derive(Debug)]
pub struct CredentialStore {
    config: StoreConfig,
    credentials: Vec<Credential>,
}

impl CredentialStore {
    #[cfg(test)]
    pub fn open_at(path: impl Into<PathBuf>) -> StoreResult<Self> {
        Self::open(StoreConfig::with_path(path))
    }

    /// Load the backing file. A missing file is an empty store.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        ensure_dir(parent_dir(&config.path))?;

        let credentials = match std::fs::read(&config.path) {
            Ok(bytes) => parse_store(&config.path, &bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(StoreError::Io(e)),
        };

        tracing::debug!(path = %config.path.display(), count = credentials.len(), "opened credential store");
        Ok(Self { config, credentials })
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// All credentials in insertion order
    pub fn list(&self) -> &[Credential] {
        &self.credentials
    }

    pub fn count(&self) -> usize {
        self.credentials.len()
    }

    /// Exact match on the normalized name
    pub fn get(&self, name: &str) -> StoreResult<&Credential> {
        self.position(name)
            .map(|idx| &self.credentials[idx])
            .ok_or_else(|| StoreError::NotFound(name.trim().to_string()))
    }

    /// Case-insensitive substring match on names, storage order preserved
    pub fn find_by_name_substring(&self, query: &str) -> Vec<&Credential> {
        let query = query.to_lowercase();
        self.credentials
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&query))
            .collect()
    }

    /// Whether `name` is taken by a record whose name is not in `excluding`
    pub fn exists(&self, name: &str, excluding: &[&str]) -> bool {
        let key = normalize_name(name);
        let excluded: Vec<String> = excluding.iter().map(|n| normalize_name(n)).collect();

        self.credentials.iter().any(|c| {
            let stored = normalize_name(&c.name);
            stored == key && !excluded.contains(&stored)
        })
    }

    /// Create or replace by name. A replaced record keeps its id, creation
    /// time and position; a new one gets a fresh id and timestamps.
    pub fn save(&mut self, cred: Credential) -> StoreResult<()> {
        let mut cred = cred.normalized();
        validate(&cred)?;

        let mut next = self.credentials.clone();
        match self.position(&cred.name) {
            Some(idx) => {
                let existing = &next[idx];
                cred.id = existing.id.clone();
                cred.created_at = existing.created_at;
                cred.updated_at = Local::now();
                next[idx] = cred;
            }
            None => {
                cred.id = loop {
                    let id = generate_id();
                    if !next.iter().any(|c| c.id == id) {
                        break id;
                    }
                };
                cred.created_at = Local::now();
                cred.updated_at = cred.created_at;
                next.push(cred);
            }
        }

        self.commit(next)?;
        tracing::info!(count = self.count(), "saved credential");
        Ok(())
    }

    /// Replace the record named `name`. A changed name must not collide with
    /// another record.
    pub fn update(&mut self, name: &str, cred: Credential) -> StoreResult<()> {
        let mut cred = cred.normalized();
        validate(&cred)?;

        let idx = self
            .position(name)
            .ok_or_else(|| StoreError::NotFound(name.trim().to_string()))?;

        if let Some(other) = self.position(&cred.name) {
            if other != idx {
                return Err(StoreError::Conflict(cred.name));
            }
        }

        let mut next = self.credentials.clone();
        cred.id = next[idx].id.clone();
        cred.created_at = next[idx].created_at;
        cred.updated_at = Local::now();
        next[idx] = cred;

        self.commit(next)?;
        tracing::info!("updated credential");
        Ok(())
    }

    /// Remove by name, returning the removed record
    pub fn delete(&mut self, name: &str) -> StoreResult<Credential> {
        let idx = self
            .position(name)
            .ok_or_else(|| StoreError::NotFound(name.trim().to_string()))?;

        let mut next = self.credentials.clone();
        let removed = next.remove(idx);

        self.commit(next)?;
        tracing::info!(count = self.count(), "deleted credential");
        Ok(removed)
    }

    /// Change only the name of `old_name`
    pub fn rename(&mut self, old_name: &str, new_name: &str) -> StoreResult<()> {
        let new_name = normalize_name(new_name);
        if new_name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.exists(&new_name, &[old_name]) {
            return Err(StoreError::Conflict(new_name));
        }

        let idx = self
            .position(old_name)
            .ok_or_else(|| StoreError::NotFound(old_name.trim().to_string()))?;

        let mut next = self.credentials.clone();
        next[idx].name = new_name;
        next[idx].updated_at = Local::now();
        validate(&next[idx])?;

        self.commit(next)?;
        tracing::info!("renamed credential");
        Ok(())
    }

    /// Remove every credential. Irrecoverable.
    pub fn clear_all(&mut self) -> StoreResult<()> {
        self.commit(Vec::new())?;
        tracing::warn!(path = %self.path().display(), "cleared all credentials");
        Ok(())
    }

    fn position(&self, name: &str) -> Option<usize> {
        let key = normalize_name(name);
        self.credentials.iter().position(|c| normalize_name(&c.name) == key)
    }

    fn commit(&mut self, next: Vec<Credential>) -> StoreResult<()> {
        self.flush(&next)?;
        self.credentials = next;
        Ok(())
    }

    /// Write to a sibling temp file and rename it over the backing file
    fn flush(&self, credentials: &[Credential]) -> StoreResult<()> {
        let dir = parent_dir(&self.config.path);
        ensure_dir(dir)?;

        let mut data = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut data, formatter);
        StoreFileRef { credentials }.serialize(&mut ser)?;
        data.push(b'\n');

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&data)?;
        tmp.as_file().sync_all()?;
        set_owner_only(tmp.path())?;
        tmp.persist(&self.config.path).map_err(|e| StoreError::Io(e.error))?;

        tracing::debug!(path = %self.config.path.display(), count = credentials.len(), "flushed credential store");
        Ok(())
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

fn ensure_dir(dir: &Path) -> std::io::Result<()> {
    if dir.exists() {
        return Ok(());
    }

    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)
}

#[cfg(unix)]
fn set_owner_only(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn set_owner_only(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
