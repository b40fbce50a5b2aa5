//! Content and Git data structures
//!
//! - `config`: the YAML CMS configuration (backend, collections, fields)
//! - `content`: entries, slugs and validation
//! - `core`: shared utilities (logging setup)
//! - `formats`: JSON, YAML, TOML and front matter documents
//! - `objects`: Git object types (blob, tree, commit)
//! - `sync`: building commits from flat file lists

pub mod config;
pub mod content;
pub mod core;
pub mod formats;
pub mod objects;
pub mod sync;
