//! Tree synchronization
//!
//! Turns a flat list of uploads into a new commit on the branch:
//!
//! 1. raw contents are uploaded as blobs, in input order
//! 2. the paths are partitioned into a [`FileTree`]
//! 3. starting at the root tree of the current head, each touched directory is
//!    fetched (or treated as empty when it does not exist yet), merged with the
//!    new entries by name and written back, children before parents
//! 4. a commit pointing at the new root tree, with the old head as parent, is
//!    created and the branch ref is force-moved to it
//!
//! There is no compare-and-swap on the ref: when two writers race, the last
//! ref update wins and the other commit drops out of the branch history.

use crate::areas::backend::{ApiError, ApiResult, GitApi, normalize_path};
use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::TreeEntry;
use crate::artifacts::sync::file_tree::{FileNode, FileTree};
use bytes::Bytes;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::collections::BTreeMap;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSource {
    /// Raw file content, uploaded as a new blob
    Content(Bytes),
    /// A blob that already exists in the repository
    Blob(ObjectId),
}

/// One file to add or replace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub path: String,
    pub source: UploadSource,
}

impl Upload {
    pub fn content(path: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Upload {
            path: path.into(),
            source: UploadSource::Content(content.into()),
        }
    }

    pub fn blob(path: impl Into<String>, sha: ObjectId) -> Self {
        Upload {
            path: path.into(),
            source: UploadSource::Blob(sha),
        }
    }
}

/// Result of a successful synchronization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub commit: ObjectId,
    pub tree: ObjectId,
    pub parent: ObjectId,
}

pub struct TreeSync<'a> {
    api: &'a dyn GitApi,
}

impl<'a> TreeSync<'a> {
    pub fn new(api: &'a dyn GitApi) -> Self {
        TreeSync { api }
    }

    /// Commit `uploads` on top of the current branch head.
    pub async fn commit_files(
        &self,
        uploads: Vec<Upload>,
        message: &str,
    ) -> ApiResult<CommitOutcome> {
        let head = self.api.branch_head().await?;
        self.commit_onto(&head, uploads, message).await
    }

    /// Commit `uploads` with `head` as parent and move the branch to the result.
    pub async fn commit_onto(
        &self,
        head: &ObjectId,
        uploads: Vec<Upload>,
        message: &str,
    ) -> ApiResult<CommitOutcome> {
        if uploads.is_empty() {
            return Err(ApiError::Other(anyhow::anyhow!("nothing to commit")));
        }
        // reject impossible layouts before anything is uploaded
        FileTree::from_files(uploads.iter().map(|upload| (upload.path.as_str(), ())))?;

        let files = self.upload_blobs(uploads).await?;
        let base_tree = self.api.read_commit(head).await?.tree;
        let tree = self.write_tree(Some(base_tree), &files).await?;

        let commit = self
            .api
            .create_commit(message, &tree, vec![head.clone()])
            .await?;
        self.api.update_ref(&commit).await?;

        info!(%commit, %tree, parent = %head, files = files.file_count(), "committed files");
        Ok(CommitOutcome {
            commit,
            tree,
            parent: head.clone(),
        })
    }

    async fn upload_blobs(&self, uploads: Vec<Upload>) -> ApiResult<FileTree> {
        let mut files = FileTree::default();

        for upload in uploads {
            let sha = match upload.source {
                UploadSource::Content(content) => self.api.upload_blob(content).await?,
                UploadSource::Blob(sha) => sha,
            };
            debug!(path = %upload.path, %sha, "staged blob");
            files.insert(&upload.path, sha)?;
        }

        Ok(files)
    }

    /// Merge `files` into the tree `base` (empty when `None`) and write the
    /// result, recursing into every touched directory first.
    pub fn write_tree<'s>(
        &'s self,
        base: Option<ObjectId>,
        files: &'s FileTree,
    ) -> BoxFuture<'s, ApiResult<ObjectId>> {
        async move {
            let existing = match &base {
                Some(sha) => self.api.read_tree(sha).await?.entries,
                None => Vec::new(),
            };
            let mut merged = existing
                .into_iter()
                .map(|entry| (entry.path.clone(), entry))
                .collect::<BTreeMap<_, _>>();

            for (name, node) in files.iter() {
                let entry = match node {
                    FileNode::File(sha) => {
                        let mode = match merged.get(name) {
                            Some(current) if current.mode == EntryMode::Executable => {
                                EntryMode::Executable
                            }
                            _ => EntryMode::File,
                        };
                        TreeEntry::new(name.clone(), mode, ObjectType::Blob, sha.clone())
                    }
                    FileNode::Directory(children) => {
                        let subtree = merged
                            .get(name)
                            .filter(|current| current.is_tree())
                            .map(|current| current.sha.clone());
                        let sha = self.write_tree(subtree, children).await?;
                        TreeEntry::tree(name.clone(), sha)
                    }
                };
                merged.insert(name.clone(), entry);
            }

            self.api.create_tree(merged.into_values().collect()).await
        }
        .boxed()
    }

    /// Delete the file at `path`: its blob sha is looked up by listing the
    /// parent directory, then a delete is issued for that path and sha.
    pub async fn delete_file(&self, path: &str, message: &str) -> ApiResult<ObjectId> {
        let path = normalize_path(path)?;
        let parent = path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");

        let listing = self.api.list_files(parent).await?;
        let info = listing
            .into_iter()
            .find(|info| info.path == path && info.is_file())
            .ok_or_else(|| ApiError::NotFound(path.clone()))?;

        self.api.delete_file(&path, &info.sha, message).await?;
        Ok(info.sha)
    }
}
