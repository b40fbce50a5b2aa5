//! Stored access tokens
//!
//! `folio login` checks a token against the backend and keeps it in a JSON
//! file keyed by repository, so later commands run without `--token`. Writes
//! take an exclusive lock on the credential file.

use anyhow::Context;
use file_guard::Lock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{Read, Seek, SeekFrom, Write};
use std::ops::DerefMut;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CREDENTIALS_ENV: &str = "FOLIO_CREDENTIALS";
const CREDENTIALS_FILE: &str = "credentials.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub backend: String,
    pub token: String,
    #[serde(default)]
    pub login: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: Box<Path>,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CredentialStore {
            path: path.into().into_boxed_path(),
        }
    }

    /// `$FOLIO_CREDENTIALS`, else `<config dir>/folio/credentials.json`
    pub fn default_location() -> anyhow::Result<Self> {
        if let Some(path) = std::env::var_os(CREDENTIALS_ENV) {
            return Ok(Self::new(path));
        }

        let config_dir = dirs::config_dir().context("no user configuration directory")?;
        Ok(Self::new(config_dir.join("folio").join(CREDENTIALS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every stored credential, keyed by repository
    pub fn load(&self) -> anyhow::Result<BTreeMap<String, Credential>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read credentials at {:?}", self.path))?;
        Self::decode(&content)
    }

    pub fn load_for(&self, key: &str) -> anyhow::Result<Option<Credential>> {
        Ok(self.load()?.remove(key))
    }

    pub fn save(&self, key: &str, credential: Credential) -> anyhow::Result<()> {
        self.update(|credentials| {
            credentials.insert(key.to_string(), credential);
        })
    }

    /// Drop the credential stored for `key`; returns whether one existed.
    /// The file is removed once no credential is left.
    pub fn forget(&self, key: &str) -> anyhow::Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }

        let mut removed = false;
        self.update(|credentials| {
            removed = credentials.remove(key).is_some();
        })?;

        if self.load()?.is_empty() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("failed to remove credentials at {:?}", self.path))?;
        }

        Ok(removed)
    }

    /// Read-modify-write of the credential file under an exclusive lock
    fn update(&self, change: impl FnOnce(&mut BTreeMap<String, Credential>)) -> anyhow::Result<()> {
        let parent = self
            .path
            .parent()
            .with_context(|| format!("invalid credentials path {:?}", self.path))?;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {:?}", parent))?;

        let mut options = std::fs::OpenOptions::new();
        options.read(true).write(true).create(true).truncate(false);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options
            .open(&self.path)
            .with_context(|| format!("failed to open credentials at {:?}", self.path))?;
        let mut lock = file_guard::lock(&mut file, Lock::Exclusive, 0, 1)?;

        let mut content = String::new();
        lock.deref_mut().read_to_string(&mut content)?;
        let mut credentials = Self::decode(&content)?;
        change(&mut credentials);

        let encoded = serde_json::to_string_pretty(&credentials)?;
        lock.set_len(0)?;
        lock.seek(SeekFrom::Start(0))?;
        lock.deref_mut().write_all(encoded.as_bytes())?;
        lock.deref_mut().write_all(b"\n")?;

        debug!(path = ?self.path, count = credentials.len(), "wrote credentials");
        Ok(())
    }

    fn decode(content: &str) -> anyhow::Result<BTreeMap<String, Credential>> {
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(content).context("credential file is not valid JSON")
    }
}
