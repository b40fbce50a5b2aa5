//! Entry operations
//!
//! Reads go through directory listings so every file comes with its blob id
//! (and can be served from the blob cache). Every save or delete is exactly
//! one commit on the configured branch.

use crate::areas::backend::User;
use crate::areas::credentials::Credential;
use crate::areas::repository::Repository;
use crate::artifacts::config::{Collection, CollectionKind};
use crate::artifacts::content::entry::Entry;
use crate::artifacts::content::{slug, validation};
use crate::artifacts::core::entry_commit_message;
use crate::artifacts::formats::Fields;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::sync::tree_sync::{CommitOutcome, TreeSync, Upload};
use anyhow::Context;
use bytes::Bytes;
use std::path::Path;
use tracing::info;

/// Result of saving an entry
#[derive(Debug, Clone)]
pub struct SavedEntry {
    pub entry: Entry,
    pub created: bool,
    pub commit: CommitOutcome,
}

impl Repository {
    /// Every existing entry of `collection`, in repository order
    pub async fn list_entries(&self, collection: &str) -> anyhow::Result<Vec<Entry>> {
        let collection = self.config().collection(collection)?;
        let mut entries = Vec::new();

        match collection.kind() {
            CollectionKind::Folder(folder) => {
                let listing = self
                    .api()
                    .list_files(folder)
                    .await
                    .with_context(|| format!("failed to list {}", collection.name))?;

                for info in listing.iter().filter(|info| info.is_file()) {
                    let Some(slug) = collection.slug_for_path(&info.path) else {
                        continue;
                    };
                    let content = self.read_blob(info).await?;
                    entries.push(Self::decode_entry(
                        collection,
                        slug,
                        info.path.clone(),
                        info.sha.clone(),
                        &content,
                    )?);
                }
            }
            CollectionKind::Files(files) => {
                for file in files {
                    if let Some(entry) = self.load_entry(collection, &file.name).await? {
                        entries.push(entry);
                    }
                }
            }
        }

        Ok(entries)
    }

    pub async fn read_entry(&self, collection: &str, slug: &str) -> anyhow::Result<Entry> {
        let collection = self.config().collection(collection)?;

        self.load_entry(collection, slug)
            .await?
            .with_context(|| format!("entry {}/{slug} not found", collection.name))
    }

    /// Create a new entry in a folder collection.
    ///
    /// Defaults are applied and the fields validated before anything is sent
    /// to the backend; the slug is rendered from the collection's template.
    pub async fn create_entry(
        &self,
        collection: &str,
        mut data: Fields,
    ) -> anyhow::Result<SavedEntry> {
        let collection = self.config().collection(collection)?;
        if !collection.is_folder() || !collection.create {
            anyhow::bail!(
                "collection {} does not allow creating entries",
                collection.name
            );
        }

        validation::apply_defaults(&collection.fields, &mut data);
        validation::validate(&collection.fields, &data)
            .with_context(|| format!("failed to save entry in {}", collection.name))?;

        let mut entry = Entry::new(collection.name.clone(), String::new(), String::new(), data);
        let title = entry.title().to_string();
        entry.slug = slug::render(
            collection.slug_template(),
            &title,
            &entry.data,
            &chrono::Local::now(),
        )
        .with_context(|| format!("failed to save entry in {}", collection.name))?;
        entry.path = collection.entry_path(&entry.slug)?;

        if self.stat(&entry.path).await?.is_some() {
            anyhow::bail!(
                "failed to save entry {}/{}: {} already exists",
                collection.name,
                entry.slug,
                entry.path
            );
        }

        self.persist_entry(collection, entry).await
    }

    /// Overlay `changes` on an existing entry and save it.
    ///
    /// Entries of file collections whose file does not exist yet start out
    /// empty (with defaults applied) and are created.
    pub async fn update_entry(
        &self,
        collection: &str,
        slug: &str,
        changes: Fields,
    ) -> anyhow::Result<SavedEntry> {
        let collection = self.config().collection(collection)?;
        let schema = collection.fields_for(slug)?;

        let mut entry = match (self.load_entry(collection, slug).await?, collection.kind()) {
            (Some(entry), _) => entry,
            (None, CollectionKind::Files(_)) => {
                let mut data = Fields::new();
                validation::apply_defaults(schema, &mut data);
                Entry::new(
                    collection.name.clone(),
                    slug.to_string(),
                    collection.entry_path(slug)?,
                    data,
                )
            }
            (None, CollectionKind::Folder(_)) => {
                anyhow::bail!("entry {}/{slug} not found", collection.name)
            }
        };

        entry.merge(changes);
        validation::validate(schema, &entry.data).with_context(|| {
            format!("failed to save entry {}/{}", collection.name, entry.slug)
        })?;

        self.persist_entry(collection, entry).await
    }

    async fn persist_entry(
        &self,
        collection: &Collection,
        mut entry: Entry,
    ) -> anyhow::Result<SavedEntry> {
        let created = entry.is_new();
        let action = if created { "Create" } else { "Update" };
        let message = entry_commit_message(action, &collection.name, &entry.slug);

        let content = Bytes::from(
            collection
                .format_for(&entry.path)
                .serialize(&entry.data)
                .with_context(|| format!("failed to serialize {}", entry.path))?,
        );
        let sha = Blob::new(content.clone()).object_id()?;

        let commit = TreeSync::new(self.api())
            .commit_files(vec![Upload::content(entry.path.clone(), content.clone())], &message)
            .await
            .with_context(|| {
                format!("failed to save entry {}/{}", collection.name, entry.slug)
            })?;

        self.cache().put(&sha, &content)?;
        entry.sha = Some(sha);
        info!(
            collection = %collection.name,
            slug = %entry.slug,
            commit = %commit.commit,
            "{message}"
        );

        Ok(SavedEntry {
            entry,
            created,
            commit,
        })
    }

    /// Delete an entry of a folder collection; returns the removed blob id.
    pub async fn delete_entry(&self, collection: &str, slug: &str) -> anyhow::Result<ObjectId> {
        let collection = self.config().collection(collection)?;
        if !collection.is_folder() {
            anyhow::bail!(
                "entries of file collection {} cannot be deleted",
                collection.name
            );
        }

        let path = collection.entry_path(slug)?;
        let message = entry_commit_message("Delete", &collection.name, slug);

        let sha = TreeSync::new(self.api())
            .delete_file(&path, &message)
            .await
            .with_context(|| format!("failed to delete entry {}/{slug}", collection.name))?;
        info!(collection = %collection.name, %slug, "{message}");

        Ok(sha)
    }

    /// Commit the local file at `file` into the media folder; returns its
    /// repository path.
    pub async fn upload_media(&self, file: &Path) -> anyhow::Result<String> {
        let media_folder = self.config().media_folder()?;
        let name = file
            .file_name()
            .and_then(|name| name.to_str())
            .with_context(|| format!("invalid media file name {}", file.display()))?;
        let content = std::fs::read(file)
            .with_context(|| format!("failed to read {}", file.display()))?;

        let path = format!("{}/{name}", media_folder.trim_matches('/'));
        let message = format!("Upload “{name}”");

        TreeSync::new(self.api())
            .commit_files(vec![Upload::content(path.clone(), content)], &message)
            .await
            .with_context(|| format!("failed to upload {name}"))?;

        Ok(path)
    }

    /// Check the current token against the backend and store it.
    pub async fn login(&self) -> anyhow::Result<User> {
        let token = self
            .token()
            .context("no access token given (use --token or FOLIO_TOKEN)")?
            .to_string();
        let user = self.api().authorize().await.context("login failed")?;

        let backend = &self.config().backend;
        self.credentials().save(
            &backend.credential_key(),
            Credential {
                backend: backend.name.as_str().to_string(),
                token,
                login: Some(user.login.clone()),
            },
        )?;

        Ok(user)
    }

    /// Forget the stored credential; returns whether one was stored.
    pub fn logout(&self) -> anyhow::Result<bool> {
        self.credentials()
            .forget(&self.config().backend.credential_key())
    }

    async fn load_entry(
        &self,
        collection: &Collection,
        slug: &str,
    ) -> anyhow::Result<Option<Entry>> {
        let path = collection.entry_path(slug)?;
        let Some(info) = self.stat(&path).await? else {
            return Ok(None);
        };

        let content = self.read_blob(&info).await?;
        Self::decode_entry(collection, slug.to_string(), path, info.sha, &content).map(Some)
    }

    fn decode_entry(
        collection: &Collection,
        slug: String,
        path: String,
        sha: ObjectId,
        content: &[u8],
    ) -> anyhow::Result<Entry> {
        let text = std::str::from_utf8(content)
            .with_context(|| format!("{path} is not valid UTF-8"))?;
        let data = collection
            .format_for(&path)
            .parse(text)
            .with_context(|| format!("failed to parse {path}"))?;

        let mut entry = Entry::new(collection.name.clone(), slug, path, data);
        entry.sha = Some(sha);
        Ok(entry)
    }
}
