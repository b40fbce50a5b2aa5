use crate::areas::backend::{ApiError, ApiResult, split_path};
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::BTreeMap;

/// A node of a [`FileTree`]: either a leaf file or a nested directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileNode<T> {
    File(T),
    Directory(FileTree<T>),
}

/// Nested mapping from directory segment to sub-mapping or leaf file.
///
/// Inserting the same path twice keeps the last value. A path that would be
/// both a file and a directory is a [`ApiError::Conflict`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTree<T = ObjectId> {
    nodes: BTreeMap<String, FileNode<T>>,
}

impl<T> Default for FileTree<T> {
    fn default() -> Self {
        FileTree {
            nodes: BTreeMap::new(),
        }
    }
}

impl<T> FileTree<T> {
    pub fn from_files<P: AsRef<str>>(
        files: impl IntoIterator<Item = (P, T)>,
    ) -> ApiResult<Self> {
        let mut tree = Self::default();
        for (path, value) in files {
            tree.insert(path.as_ref(), value)?;
        }

        Ok(tree)
    }

    pub fn insert(&mut self, path: &str, value: T) -> ApiResult<()> {
        let segments = split_path(path)?;
        if segments.is_empty() {
            return Err(ApiError::InvalidPath(path.to_string()));
        }

        self.insert_segments(path, &segments, value)
    }

    fn insert_segments(&mut self, path: &str, segments: &[String], value: T) -> ApiResult<()> {
        let Some((name, rest)) = segments.split_first() else {
            return Err(ApiError::InvalidPath(path.to_string()));
        };

        if rest.is_empty() {
            if let Some(FileNode::Directory(_)) = self.nodes.get(name) {
                return Err(ApiError::Conflict(format!(
                    "{path} is used both as a file and as a directory"
                )));
            }
            self.nodes.insert(name.clone(), FileNode::File(value));
            return Ok(());
        }

        match self
            .nodes
            .entry(name.clone())
            .or_insert_with(|| FileNode::Directory(FileTree::default()))
        {
            FileNode::Directory(tree) => tree.insert_segments(path, rest, value),
            FileNode::File(_) => Err(ApiError::Conflict(format!(
                "{path} is nested below a file named {name}"
            ))),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FileNode<T>)> {
        self.nodes.iter()
    }

    pub fn get(&self, name: &str) -> Option<&FileNode<T>> {
        self.nodes.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of leaf files, at any depth
    pub fn file_count(&self) -> usize {
        self.nodes
            .values()
            .map(|node| match node {
                FileNode::File(_) => 1,
                FileNode::Directory(tree) => tree.file_count(),
            })
            .sum()
    }
}
