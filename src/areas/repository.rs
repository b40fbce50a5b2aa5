use crate::areas::backend::{self, FileInfo, GitApi, normalize_path};
use crate::areas::cache::BlobCache;
use crate::areas::credentials::CredentialStore;
use crate::artifacts::config::Config;
use anyhow::Context;
use bytes::Bytes;
use std::cell::{RefCell, RefMut};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// An open content repository: the configuration, the backend it names, the
/// blob cache and the credential store.
pub struct Repository {
    config: Config,
    api: Arc<dyn GitApi>,
    cache: BlobCache,
    credentials: CredentialStore,
    token: Option<String>,
    writer: RefCell<Box<dyn std::io::Write>>,
}

impl Repository {
    pub fn new(
        config: Config,
        api: Arc<dyn GitApi>,
        credentials: CredentialStore,
        token: Option<String>,
        writer: Box<dyn std::io::Write>,
    ) -> Self {
        let cache = BlobCache::open(config.cache_dir.as_deref());

        Repository {
            config,
            api,
            cache,
            credentials,
            token,
            writer: RefCell::new(writer),
        }
    }

    /// Load the configuration at `config_path` and connect to its backend.
    ///
    /// `token` (from `--token` or `FOLIO_TOKEN`) wins over the credential
    /// stored by a previous `login`.
    pub async fn open(
        config_path: &Path,
        token: Option<String>,
        writer: Box<dyn std::io::Write>,
    ) -> anyhow::Result<Self> {
        let config = Config::load(config_path)?;
        let credentials = CredentialStore::default_location()?;

        let token = match token {
            Some(token) => Some(token),
            None => credentials
                .load_for(&config.backend.credential_key())?
                .map(|credential| credential.token),
        };

        let api = backend::connect(&config.backend, token.clone())
            .await
            .with_context(|| {
                format!(
                    "failed to connect to {} backend",
                    config.backend.name.as_str()
                )
            })?;

        Ok(Self::new(config, api, credentials, token, writer))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn api(&self) -> &dyn GitApi {
        self.api.as_ref()
    }

    pub fn cache(&self) -> &BlobCache {
        &self.cache
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    /// Listing entry of the file at `path`, `None` when there is no such file
    pub async fn stat(&self, path: &str) -> anyhow::Result<Option<FileInfo>> {
        let path = normalize_path(path)?;
        let parent = path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");

        let listing = self.api.list_files(parent).await?;
        Ok(listing
            .into_iter()
            .find(|info| info.path == path && info.is_file()))
    }

    /// Content of a listed file, served from the cache when its blob is known
    pub async fn read_blob(&self, info: &FileInfo) -> anyhow::Result<Bytes> {
        if let Some(content) = self.cache.get(&info.sha)? {
            debug!(path = %info.path, sha = %info.sha, "cache hit");
            return Ok(content);
        }

        let content = self
            .api
            .read_file(&info.path)
            .await
            .with_context(|| format!("failed to read {}", info.path))?;
        self.cache.put(&info.sha, &content)?;

        Ok(content)
    }

    pub async fn read_path(&self, path: &str) -> anyhow::Result<Bytes> {
        let info = self
            .stat(path)
            .await?
            .with_context(|| format!("{path} not found"))?;

        self.read_blob(&info).await
    }
}
