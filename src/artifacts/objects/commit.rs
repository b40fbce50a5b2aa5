//! Git commit object
//!
//! Commits point at a root tree and at their parent commit(s). Remote APIs
//! create and hash commits on their side; the in-memory store builds the
//! canonical text form itself:
//!
//! ```text
//! commit <size>\0
//! tree <tree-sha>
//! parent <parent-sha>
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//!
//! <commit message>
//! ```

use crate::artifacts::objects::object::{Object, Packable, with_header};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Author or committer information
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub email: String,
    #[serde(rename = "date")]
    pub timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl Signature {
    /// Create a signature stamped with the current local time
    pub fn new(name: String, email: String) -> Self {
        Signature {
            name,
            email,
            timestamp: chrono::Local::now().fixed_offset(),
        }
    }

    /// Read `GIT_AUTHOR_NAME`, `GIT_AUTHOR_EMAIL` and optionally
    /// `GIT_AUTHOR_DATE`, falling back to a generic editor identity.
    pub fn load_from_env() -> Self {
        let name = std::env::var("GIT_AUTHOR_NAME").unwrap_or_else(|_| "folio".to_string());
        let email =
            std::env::var("GIT_AUTHOR_EMAIL").unwrap_or_else(|_| "folio@localhost".to_string());
        let timestamp = std::env::var("GIT_AUTHOR_DATE").ok().and_then(|date_str| {
            chrono::DateTime::parse_from_rfc2822(&date_str)
                .or_else(|_| chrono::DateTime::parse_from_str(&date_str, "%Y-%m-%d %H:%M:%S %z"))
                .ok()
        });

        match timestamp {
            Some(timestamp) => Signature {
                name,
                email,
                timestamp,
            },
            None => Signature::new(name, email),
        }
    }

    /// Format as `Name <email> timestamp timezone`
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }
}

/// Git commit object as seen through the REST surface
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    pub sha: ObjectId,
    pub tree: ObjectId,
    pub parents: Vec<ObjectId>,
    pub message: String,
}

impl Commit {
    /// Build a commit locally, hashing it the way Git does.
    pub fn create(
        tree: ObjectId,
        parents: Vec<ObjectId>,
        message: String,
        author: &Signature,
    ) -> anyhow::Result<Self> {
        let sha = RawCommit {
            tree: &tree,
            parents: &parents,
            message: &message,
            author,
        }
        .object_id()?;

        Ok(Commit {
            sha,
            tree,
            parents,
            message,
        })
    }
}

struct RawCommit<'c> {
    tree: &'c ObjectId,
    parents: &'c [ObjectId],
    message: &'c str,
    author: &'c Signature,
}

impl Packable for RawCommit<'_> {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut object_content = vec![];

        object_content.push(format!("tree {}", self.tree));
        for parent in self.parents {
            object_content.push(format!("parent {}", parent));
        }
        object_content.push(format!("author {}", self.author.display()));
        object_content.push(format!("committer {}", self.author.display()));
        object_content.push(String::new());
        object_content.push(self.message.to_string());

        let object_content = object_content.join("\n");

        Ok(with_header(self.object_type(), object_content.as_bytes()))
    }
}

impl Object for RawCommit<'_> {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }
}
