//! Git object types and operations
//!
//! Git stores all content as objects identified by SHA-1 hashes:
//!
//! - **Blob**: File content (raw bytes)
//! - **Tree**: Directory listing (names, modes, and object IDs)
//! - **Commit**: Snapshot with metadata (message, parent commits, tree)
//!
//! Remote backends hand these objects back as JSON documents, so every type here
//! is serde-aware. The in-memory backend hashes them itself using the Git object
//! format `<type> <size>\0<content>`, which yields the same ids Git would.

pub mod blob;
pub mod commit;
pub mod entry_mode;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;
