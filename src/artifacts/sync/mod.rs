//! Building commits from flat file lists
//!
//! - `file_tree`: partitions repository paths into a nested directory mapping
//! - `tree_sync`: merges that mapping into the existing trees of the branch,
//!   writes the changed trees bottom-up, commits and moves the branch ref

pub mod file_tree;
pub mod tree_sync;
