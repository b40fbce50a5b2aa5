//! Git hosting backends
//!
//! Every backend exposes the same narrow REST-shaped surface ([`GitApi`]):
//! raw file reads, directory listings, blob/tree/commit creation, branch ref
//! updates and file deletion. Higher layers (tree sync, entries) only ever talk
//! to this trait.
//!
//! - `http`: GitHub's REST API and local Git proxies exposing the same routes
//! - `memory`: an in-process object store used as the `test-repo` backend

pub mod http;
pub mod memory;

use crate::artifacts::config::{BackendConfig, BackendKind};
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::{Tree, TreeEntry};
use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Failures reported by a backend.
///
/// Authentication (bad or missing credential) and authorization (valid
/// credential without write access) are kept apart so the caller can tell the
/// user whether to log in again or to ask for access.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("authorization failed: {0}")]
    AuthorizationFailed(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("invalid repository path {0:?}")]
    InvalidPath(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("request failed with status {status}: {message}")]
    Http { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Kind of a directory listing entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Dir,
    Symlink,
    Submodule,
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub path: String,
    pub sha: ObjectId,
    #[serde(rename = "type")]
    pub kind: FileKind,
    #[serde(default)]
    pub size: u64,
}

impl FileInfo {
    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }
}

/// The authenticated account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// REST surface of a Git hosting service, scoped to one repository branch.
#[async_trait]
pub trait GitApi: Send + Sync {
    /// Raw content of the file at `path` on the branch head
    async fn read_file(&self, path: &str) -> ApiResult<Bytes>;

    /// Entries of the directory at `path`; a missing directory lists as empty
    async fn list_files(&self, path: &str) -> ApiResult<Vec<FileInfo>>;

    async fn upload_blob(&self, content: Bytes) -> ApiResult<ObjectId>;

    async fn read_tree(&self, sha: &ObjectId) -> ApiResult<Tree>;

    /// Create a tree holding exactly `entries`
    async fn create_tree(&self, entries: Vec<TreeEntry>) -> ApiResult<ObjectId>;

    async fn read_commit(&self, sha: &ObjectId) -> ApiResult<Commit>;

    async fn create_commit(
        &self,
        message: &str,
        tree: &ObjectId,
        parents: Vec<ObjectId>,
    ) -> ApiResult<ObjectId>;

    /// Commit the branch currently points at
    async fn branch_head(&self) -> ApiResult<ObjectId>;

    /// Point the branch at `commit`, unconditionally
    async fn update_ref(&self, commit: &ObjectId) -> ApiResult<()>;

    /// Delete the file at `path`, whose current blob must be `sha`
    async fn delete_file(&self, path: &str, sha: &ObjectId, message: &str) -> ApiResult<()>;

    /// Check the credential and write access to the repository
    async fn authorize(&self) -> ApiResult<User>;
}

/// Build the backend named by the configuration.
pub async fn connect(
    config: &BackendConfig,
    token: Option<String>,
) -> anyhow::Result<Arc<dyn GitApi>> {
    match config.name {
        BackendKind::Github => {
            let repo = config
                .repo
                .clone()
                .context("the github backend requires `backend.repo`")?;
            let api = http::HttpGitApi::new(
                http::Flavor::GitHub { repo },
                config.api_root(),
                config.branch.clone(),
                token,
            )?;
            Ok(Arc::new(api))
        }
        BackendKind::Local => {
            let api = http::HttpGitApi::new(
                http::Flavor::Local,
                config.api_root(),
                config.branch.clone(),
                token,
            )?;
            Ok(Arc::new(api))
        }
        BackendKind::TestRepo => {
            let api = match &config.seed_dir {
                Some(seed_dir) => memory::MemoryApi::from_dir(seed_dir).await?,
                None => memory::MemoryApi::new()?,
            };
            Ok(Arc::new(api))
        }
    }
}

/// Split a repository path into its segments.
///
/// Leading/trailing slashes and empty or `.` segments are dropped; `..` is
/// rejected since it could escape the repository root.
pub fn split_path(path: &str) -> ApiResult<Vec<String>> {
    let segments = path
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .map(str::to_string)
        .collect::<Vec<_>>();

    if segments.iter().any(|segment| segment == "..") {
        return Err(ApiError::InvalidPath(path.to_string()));
    }

    Ok(segments)
}

/// Normalized form of a repository path (`a//b/` -> `a/b`)
pub fn normalize_path(path: &str) -> ApiResult<String> {
    Ok(split_path(path)?.join("/"))
}
