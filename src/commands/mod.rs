//! Command implementations
//!
//! - `plumbing`: low-level access to the branch's Git objects (hash-object,
//!   ls-tree, cat-file)
//! - `porcelain`: content editing workflows (entries, new, edit, delete,
//!   upload, login)
//!
//! Commands write their output to the repository's writer; the data they
//! print comes from the entry operations in `areas::entries`.

pub mod plumbing;
pub mod porcelain;
