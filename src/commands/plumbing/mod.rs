//! Plumbing commands
//!
//! - `hash-object`: compute the blob id of a local file
//! - `ls-tree`: list the branch head tree, or one directory of it
//! - `cat-file`: print the raw content of a file on the branch

pub mod cat_file;
pub mod hash_object;
pub mod ls_tree;
