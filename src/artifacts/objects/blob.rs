//! Git blob object
//!
//! Blobs store file content. They contain only the raw file data, without any
//! metadata like filename or permissions (those are stored in trees).
//!
//! ## Format
//!
//! Hashed as: `blob <size>\0<content>`

use crate::artifacts::objects::object::{Object, Packable, with_header};
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;

/// Git blob object representing file content
///
/// Content is kept as raw bytes so binary media uploads hash the same way Git
/// hashes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    content: Bytes,
}

impl Blob {
    pub fn new(content: impl Into<Bytes>) -> Self {
        Blob {
            content: content.into(),
        }
    }

    pub fn into_content(self) -> Bytes {
        self.content
    }
}

impl Packable for Blob {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        Ok(with_header(self.object_type(), &self.content))
    }
}

impl Object for Blob {
    fn object_type(&self) -> ObjectType {
        ObjectType::Blob
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blob_id_matches_git_hash_object() {
        let blob = Blob::new("hello\n");
        assert_eq!(
            blob.object_id().unwrap().as_ref(),
            "ce013625030ba8dba906f756967f9e9ca394464a"
        );
    }

    #[test]
    fn test_empty_blob_id_matches_git() {
        let blob = Blob::new(Bytes::new());
        assert_eq!(
            blob.object_id().unwrap().as_ref(),
            "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391"
        );
    }
}
