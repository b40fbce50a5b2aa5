//! In-memory Git object store (the `test-repo` backend)
//!
//! Objects are hashed exactly like Git hashes them, so ids handed out here are
//! interchangeable with `hash-object` output. The store keeps a single branch
//! whose head always points at a commit: a fresh store starts with an empty
//! root commit.

use crate::areas::backend::{
    ApiError, ApiResult, FileInfo, FileKind, GitApi, User, normalize_path, split_path,
};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::{Commit, Signature};
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::{Tree, TreeEntry};
use crate::artifacts::sync::tree_sync::{TreeSync, Upload};
use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tracing::info;
use walkdir::WalkDir;

const TEST_USER: &str = "test-user";

#[derive(Debug, Clone)]
enum StoredObject {
    Blob(Bytes),
    Tree(Tree),
    Commit(Commit),
}

#[derive(Debug)]
struct ObjectStore {
    objects: HashMap<ObjectId, StoredObject>,
    head: ObjectId,
}

impl ObjectStore {
    fn put_blob(&mut self, content: Bytes) -> anyhow::Result<ObjectId> {
        let blob = Blob::new(content);
        let sha = blob.object_id()?;
        self.objects
            .insert(sha.clone(), StoredObject::Blob(blob.into_content()));

        Ok(sha)
    }

    fn put_tree(&mut self, entries: Vec<TreeEntry>) -> ApiResult<ObjectId> {
        for entry in &entries {
            let known = match (self.objects.get(&entry.sha), entry.kind) {
                (Some(StoredObject::Blob(_)), ObjectType::Blob) => true,
                (Some(StoredObject::Tree(_)), ObjectType::Tree) => true,
                (_, ObjectType::Commit) => true,
                _ => false,
            };
            if !known {
                return Err(ApiError::Http {
                    status: 422,
                    message: format!("tree entry {} references unknown {}", entry.path, entry.sha),
                });
            }
        }

        let tree = Tree::from_entries(entries)?;
        let sha = tree.sha.clone();
        self.objects.insert(sha.clone(), StoredObject::Tree(tree));

        Ok(sha)
    }

    fn put_commit(
        &mut self,
        message: &str,
        tree: ObjectId,
        parents: Vec<ObjectId>,
        author: &Signature,
    ) -> ApiResult<ObjectId> {
        self.tree(&tree)?;
        for parent in &parents {
            self.commit(parent)?;
        }

        let commit = Commit::create(tree, parents, message.to_string(), author)?;
        let sha = commit.sha.clone();
        self.objects.insert(sha.clone(), StoredObject::Commit(commit));

        Ok(sha)
    }

    fn blob(&self, sha: &ObjectId) -> ApiResult<&Bytes> {
        match self.objects.get(sha) {
            Some(StoredObject::Blob(content)) => Ok(content),
            _ => Err(ApiError::NotFound(format!("blob {sha}"))),
        }
    }

    fn tree(&self, sha: &ObjectId) -> ApiResult<&Tree> {
        match self.objects.get(sha) {
            Some(StoredObject::Tree(tree)) => Ok(tree),
            _ => Err(ApiError::NotFound(format!("tree {sha}"))),
        }
    }

    fn commit(&self, sha: &ObjectId) -> ApiResult<&Commit> {
        match self.objects.get(sha) {
            Some(StoredObject::Commit(commit)) => Ok(commit),
            _ => Err(ApiError::NotFound(format!("commit {sha}"))),
        }
    }

    fn head_tree(&self) -> ApiResult<ObjectId> {
        Ok(self.commit(&self.head)?.tree.clone())
    }

    /// Walk `segments` from the head tree; `None` when any segment is missing.
    fn lookup(&self, segments: &[String]) -> ApiResult<Option<TreeEntry>> {
        let mut current = TreeEntry::tree("", self.head_tree()?);

        for segment in segments {
            if !current.is_tree() {
                return Ok(None);
            }
            match self.tree(&current.sha)?.entry(segment) {
                Some(entry) => current = entry.clone(),
                None => return Ok(None),
            }
        }

        Ok(Some(current))
    }

    /// Remove the blob at `segments` below `tree_sha`, pruning directories left
    /// empty. Returns the new tree id, or `None` when the tree became empty.
    fn remove(
        &mut self,
        tree_sha: &ObjectId,
        segments: &[String],
        expected: &ObjectId,
    ) -> ApiResult<Option<ObjectId>> {
        let (name, rest) = segments
            .split_first()
            .ok_or_else(|| ApiError::InvalidPath(String::new()))?;
        let mut entries = self.tree(tree_sha)?.entries.clone();
        let position = entries
            .iter()
            .position(|entry| &entry.path == name)
            .ok_or_else(|| ApiError::NotFound(name.clone()))?;

        if rest.is_empty() {
            let entry = &entries[position];
            if entry.is_tree() {
                return Err(ApiError::InvalidPath(name.clone()));
            }
            if &entry.sha != expected {
                return Err(ApiError::Conflict(format!(
                    "{name} is at {} but {expected} was expected",
                    entry.sha
                )));
            }
            entries.remove(position);
        } else {
            let subtree = entries[position].sha.clone();
            match self.remove(&subtree, rest, expected)? {
                Some(sha) => entries[position].sha = sha,
                None => {
                    entries.remove(position);
                }
            }
        }

        if entries.is_empty() {
            Ok(None)
        } else {
            self.put_tree(entries).map(Some)
        }
    }

    fn collect_files(
        &self,
        prefix: &str,
        tree_sha: &ObjectId,
        files: &mut BTreeMap<String, Bytes>,
    ) -> ApiResult<()> {
        for entry in &self.tree(tree_sha)?.entries {
            let path = join_path(prefix, &entry.path);
            match entry.kind {
                ObjectType::Tree => self.collect_files(&path, &entry.sha, files)?,
                ObjectType::Blob => {
                    files.insert(path, self.blob(&entry.sha)?.clone());
                }
                ObjectType::Commit => {}
            }
        }

        Ok(())
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

/// Git object store living in process memory
#[derive(Debug)]
pub struct MemoryApi {
    store: Mutex<ObjectStore>,
    author: Signature,
    reads: AtomicUsize,
}

impl MemoryApi {
    /// Empty repository whose branch points at an empty root commit
    pub fn new() -> anyhow::Result<Self> {
        let author = Signature::load_from_env();
        let mut store = ObjectStore {
            objects: HashMap::new(),
            head: ObjectId::default(),
        };

        let empty_tree = store.put_tree(Vec::new())?;
        let root = Commit::create(empty_tree, Vec::new(), "Initial commit".to_string(), &author)?;
        store.head = root.sha.clone();
        store
            .objects
            .insert(root.sha.clone(), StoredObject::Commit(root));

        Ok(MemoryApi {
            store: Mutex::new(store),
            author,
            reads: AtomicUsize::new(0),
        })
    }

    /// Repository whose first commit holds `files`
    pub async fn seeded(
        files: impl IntoIterator<Item = (String, Bytes)>,
    ) -> anyhow::Result<Self> {
        let api = Self::new()?;
        let uploads = files
            .into_iter()
            .map(|(path, content)| Upload::content(path, content))
            .collect::<Vec<_>>();

        if !uploads.is_empty() {
            TreeSync::new(&api)
                .commit_files(uploads, "Seed repository")
                .await
                .context("Unable to seed the test repository")?;
        }

        Ok(api)
    }

    /// Repository seeded with every file below `dir` (`.git` excluded)
    pub async fn from_dir(dir: &Path) -> anyhow::Result<Self> {
        let mut files = Vec::new();

        for entry in WalkDir::new(dir)
            .into_iter()
            .filter_entry(|entry| entry.file_name() != ".git")
        {
            let entry = entry.with_context(|| format!("Unable to walk {}", dir.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry.path().strip_prefix(dir)?;
            let path = relative
                .components()
                .map(|component| component.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let content = std::fs::read(entry.path())
                .with_context(|| format!("Unable to read {}", entry.path().display()))?;

            files.push((path, Bytes::from(content)));
        }

        info!(dir = %dir.display(), files = files.len(), "seeding test repository");
        Self::seeded(files).await
    }

    /// Every file reachable from the branch head, keyed by path
    pub async fn snapshot(&self) -> ApiResult<BTreeMap<String, Bytes>> {
        let store = self.store.lock().await;
        let mut files = BTreeMap::new();
        store.collect_files("", &store.head_tree()?, &mut files)?;

        Ok(files)
    }

    /// Number of `read_file` calls served so far
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GitApi for MemoryApi {
    async fn read_file(&self, path: &str) -> ApiResult<Bytes> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        let segments = split_path(path)?;
        let store = self.store.lock().await;
        match store.lookup(&segments)? {
            Some(entry) if entry.kind == ObjectType::Blob => Ok(store.blob(&entry.sha)?.clone()),
            Some(_) => Err(ApiError::InvalidPath(path.to_string())),
            None => Err(ApiError::NotFound(path.to_string())),
        }
    }

    async fn list_files(&self, path: &str) -> ApiResult<Vec<FileInfo>> {
        let segments = split_path(path)?;
        let dir = segments.join("/");
        let store = self.store.lock().await;

        let tree = match store.lookup(&segments)? {
            Some(entry) if entry.is_tree() => store.tree(&entry.sha)?,
            Some(_) => return Err(ApiError::InvalidPath(path.to_string())),
            None => return Ok(Vec::new()),
        };

        tree.entries
            .iter()
            .map(|entry| {
                let (kind, size) = match entry.kind {
                    ObjectType::Blob => (FileKind::File, store.blob(&entry.sha)?.len() as u64),
                    ObjectType::Tree => (FileKind::Dir, 0),
                    ObjectType::Commit => (FileKind::Submodule, 0),
                };

                Ok(FileInfo {
                    name: entry.path.clone(),
                    path: join_path(&dir, &entry.path),
                    sha: entry.sha.clone(),
                    kind,
                    size,
                })
            })
            .collect()
    }

    async fn upload_blob(&self, content: Bytes) -> ApiResult<ObjectId> {
        Ok(self.store.lock().await.put_blob(content)?)
    }

    async fn read_tree(&self, sha: &ObjectId) -> ApiResult<Tree> {
        self.store.lock().await.tree(sha).cloned()
    }

    async fn create_tree(&self, entries: Vec<TreeEntry>) -> ApiResult<ObjectId> {
        self.store.lock().await.put_tree(entries)
    }

    async fn read_commit(&self, sha: &ObjectId) -> ApiResult<Commit> {
        self.store.lock().await.commit(sha).cloned()
    }

    async fn create_commit(
        &self,
        message: &str,
        tree: &ObjectId,
        parents: Vec<ObjectId>,
    ) -> ApiResult<ObjectId> {
        self.store
            .lock()
            .await
            .put_commit(message, tree.clone(), parents, &self.author)
    }

    async fn branch_head(&self) -> ApiResult<ObjectId> {
        Ok(self.store.lock().await.head.clone())
    }

    async fn update_ref(&self, commit: &ObjectId) -> ApiResult<()> {
        let mut store = self.store.lock().await;
        store.commit(commit)?;
        store.head = commit.clone();

        Ok(())
    }

    async fn delete_file(&self, path: &str, sha: &ObjectId, message: &str) -> ApiResult<()> {
        let segments = split_path(path)?;
        let mut store = self.store.lock().await;

        let root = store.head_tree()?;
        let tree = match store.remove(&root, &segments, sha)? {
            Some(tree) => tree,
            None => store.put_tree(Vec::new())?,
        };
        let parent = store.head.clone();
        let commit = store.put_commit(message, tree, vec![parent], &self.author)?;
        store.head = commit;

        info!(path = %normalize_path(path)?, "deleted file");
        Ok(())
    }

    async fn authorize(&self) -> ApiResult<User> {
        Ok(User {
            login: TEST_USER.to_string(),
            name: None,
        })
    }
}
