//! Git tree object
//!
//! Trees represent directory snapshots. They contain entries for files (blobs)
//! and subdirectories (other trees), along with their names and modes.
//!
//! ## Format
//!
//! Hashed as: `tree <size>\0<entries>`
//! Each entry: `<mode> <name>\0<20-byte-sha1>`
//!
//! Entries are ordered by name, where directory names compare as if they had a
//! trailing `/`. Remote APIs sort for us; the in-memory store uses
//! [`Tree::from_entries`] which applies the same ordering before hashing.

use crate::artifacts::objects::entry_mode::EntryMode;
use crate::artifacts::objects::object::{Object, Packable, with_header};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// One named entry of a tree, as exchanged with the Git REST surface.
///
/// `path` is the entry name relative to its parent tree, never a full path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct TreeEntry {
    pub path: String,
    pub mode: EntryMode,
    #[serde(rename = "type")]
    pub kind: ObjectType,
    pub sha: ObjectId,
}

impl TreeEntry {
    pub fn blob(path: impl Into<String>, sha: ObjectId) -> Self {
        TreeEntry::new(path.into(), EntryMode::File, ObjectType::Blob, sha)
    }

    pub fn tree(path: impl Into<String>, sha: ObjectId) -> Self {
        TreeEntry::new(path.into(), EntryMode::Directory, ObjectType::Tree, sha)
    }

    pub fn is_tree(&self) -> bool {
        self.kind == ObjectType::Tree
    }

    fn sort_key(&self) -> String {
        if self.is_tree() {
            format!("{}/", self.path)
        } else {
            self.path.clone()
        }
    }
}

/// Git tree object representing a directory snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    pub sha: ObjectId,
    #[serde(rename = "tree")]
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// Build a tree from its entries, computing the Git object id locally.
    pub fn from_entries(mut entries: Vec<TreeEntry>) -> anyhow::Result<Self> {
        entries.sort_by_key(TreeEntry::sort_key);
        let sha = RawTree(&entries).object_id()?;

        Ok(Tree { sha, entries })
    }

    pub fn entry(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|entry| entry.path == name)
    }
}

/// Borrowed view used to hash a sorted entry list.
struct RawTree<'t>(&'t [TreeEntry]);

impl Packable for RawTree<'_> {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut content_bytes = Vec::new();

        for entry in self.0 {
            let header = format!("{:o} {}", entry.mode.as_u32(), entry.path);
            content_bytes.write_all(header.as_bytes())?;
            content_bytes.push(0);
            entry.sha.write_h40_to(&mut content_bytes)?;
        }

        Ok(with_header(self.object_type(), &content_bytes))
    }
}

impl Object for RawTree<'_> {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }
}
