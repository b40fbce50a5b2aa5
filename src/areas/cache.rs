//! Blob cache
//!
//! File contents fetched from the backend are cached by blob id. Directory
//! listings already carry blob ids, so reading an unchanged file twice costs a
//! single content request.
//!
//! The disk cache mirrors Git's loose object layout: zlib-compressed blobs at
//! `<dir>/<sha[0..2]>/<sha[2..]>`, written to a temporary file first and then
//! renamed into place. When the cache directory cannot be created the cache
//! falls back to process memory.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug)]
pub enum BlobCache {
    Disk(DiskCache),
    Memory(MemoryCache),
}

impl BlobCache {
    /// Disk cache at `dir`, or a memory cache when `dir` is unusable or absent
    pub fn open(dir: Option<&Path>) -> Self {
        let Some(dir) = dir else {
            return BlobCache::Memory(MemoryCache::default());
        };

        match DiskCache::create(dir) {
            Ok(cache) => BlobCache::Disk(cache),
            Err(err) => {
                warn!(dir = %dir.display(), error = %err, "blob cache falls back to memory");
                BlobCache::Memory(MemoryCache::default())
            }
        }
    }

    pub fn get(&self, sha: &ObjectId) -> anyhow::Result<Option<Bytes>> {
        let cached = match self {
            BlobCache::Disk(cache) => cache.get(sha)?,
            BlobCache::Memory(cache) => cache.get(sha),
        };

        // entries that no longer hash to their key are treated as misses
        match cached {
            Some(content) if &Blob::new(content.clone()).object_id()? == sha => Ok(Some(content)),
            Some(_) => {
                warn!(%sha, "discarding corrupt cache entry");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    pub fn put(&self, sha: &ObjectId, content: &Bytes) -> anyhow::Result<()> {
        debug!(%sha, size = content.len(), "caching blob");
        match self {
            BlobCache::Disk(cache) => cache.put(sha, content),
            BlobCache::Memory(cache) => {
                cache.put(sha, content);
                Ok(())
            }
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, BlobCache::Disk(_))
    }
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    blobs: Mutex<HashMap<ObjectId, Bytes>>,
}

impl MemoryCache {
    fn get(&self, sha: &ObjectId) -> Option<Bytes> {
        self.blobs
            .lock()
            .ok()
            .and_then(|blobs| blobs.get(sha).cloned())
    }

    fn put(&self, sha: &ObjectId, content: &Bytes) {
        if let Ok(mut blobs) = self.blobs.lock() {
            blobs.insert(sha.clone(), content.clone());
        }
    }
}

#[derive(Debug)]
pub struct DiskCache {
    path: Box<Path>,
}

impl DiskCache {
    pub fn create(path: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Unable to create cache directory {}", path.display()))?;

        Ok(DiskCache { path: path.into() })
    }

    fn blob_path(&self, sha: &ObjectId) -> PathBuf {
        let (dir, file) = sha.as_ref().split_at(2);
        self.path.join(dir).join(file)
    }

    fn get(&self, sha: &ObjectId) -> anyhow::Result<Option<Bytes>> {
        let blob_path = self.blob_path(sha);
        if !blob_path.exists() {
            return Ok(None);
        }

        let compressed = std::fs::read(&blob_path)
            .with_context(|| format!("Unable to read cached blob {}", blob_path.display()))?;

        // an undecodable file is a miss, it gets rewritten on the next put
        Ok(Self::decompress(&compressed).ok())
    }

    fn put(&self, sha: &ObjectId, content: &Bytes) -> anyhow::Result<()> {
        let blob_path = self.blob_path(sha);
        let blob_dir = blob_path
            .parent()
            .context(format!("Invalid cache path {}", blob_path.display()))?;
        std::fs::create_dir_all(blob_dir)
            .with_context(|| format!("Unable to create cache directory {}", blob_dir.display()))?;

        let temp_path = blob_dir.join(Self::generate_temp_name());
        let compressed = Self::compress(content)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .with_context(|| format!("Unable to open cache file {}", temp_path.display()))?;
        file.write_all(&compressed)
            .with_context(|| format!("Unable to write cache file {}", temp_path.display()))?;

        // rename the temp file to the blob file to make it atomic
        std::fs::rename(&temp_path, &blob_path)
            .with_context(|| format!("Unable to rename cache file to {}", blob_path.display()))?;

        Ok(())
    }

    fn compress(data: &[u8]) -> anyhow::Result<Vec<u8>> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(data)
            .context("Unable to compress blob content")?;

        encoder
            .finish()
            .context("Unable to finish compressing blob content")
    }

    fn decompress(data: &[u8]) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress blob content")?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-blob-{}", rand::random::<u32>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;

    fn blob(content: &'static str) -> (ObjectId, Bytes) {
        let content = Bytes::from(content);
        (Blob::new(content.clone()).object_id().unwrap(), content)
    }

    #[test]
    fn test_disk_cache_round_trips_blobs() {
        let dir = TempDir::new().unwrap();
        let cache = BlobCache::open(Some(dir.path()));
        let (sha, content) = blob("hello\n");

        assert!(cache.is_persistent());
        assert_eq!(cache.get(&sha).unwrap(), None);

        cache.put(&sha, &content).unwrap();
        assert_eq!(cache.get(&sha).unwrap(), Some(content));
        assert!(dir.path().join("ce").join("013625030ba8dba906f756967f9e9ca394464a").exists());
    }

    #[test]
    fn test_unusable_directory_falls_back_to_memory() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, "occupied").unwrap();

        let cache = BlobCache::open(Some(&file));
        let (sha, content) = blob("fallback");

        assert!(!cache.is_persistent());
        cache.put(&sha, &content).unwrap();
        assert_eq!(cache.get(&sha).unwrap(), Some(content));
    }

    #[test]
    fn test_entries_not_matching_their_key_are_misses() {
        let cache = BlobCache::open(None);
        let (sha, _) = blob("expected");

        cache.put(&sha, &Bytes::from("tampered")).unwrap();
        assert_eq!(cache.get(&sha).unwrap(), None);
    }

    #[test]
    fn test_corrupt_disk_entry_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = BlobCache::open(Some(dir.path()));
        let (sha, _) = blob("garbage");

        let path = dir.path().join(&sha.as_ref()[..2]);
        std::fs::create_dir_all(&path).unwrap();
        std::fs::write(path.join(&sha.as_ref()[2..]), "not zlib").unwrap();

        assert_eq!(cache.get(&sha).unwrap(), None);
    }
}
