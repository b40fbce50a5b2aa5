//! Porcelain commands
//!
//! ## Commands
//!
//! - `collections`: list the configured collections
//! - `entries`: list the entries of a collection
//! - `show`: print one entry
//! - `new` / `edit`: create or update an entry from `key=value` fields
//! - `delete`: remove an entry
//! - `upload`: add a media file
//! - `login` / `logout`: store or forget an access token

pub mod auth;
pub mod collections;
pub mod delete;
pub mod entries;
pub mod save;
pub mod show;
pub mod upload;
