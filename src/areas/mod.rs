//! Storage areas
//!
//! - `backend`: the Git hosting services content is read from and committed to
//! - `cache`: fetched blob contents, keyed by blob id
//! - `credentials`: access tokens stored by `login`
//! - `entries`: collection entry operations on a [`repository::Repository`]
//! - `repository`: configuration, backend, cache and credentials tied together

pub mod backend;
pub mod cache;
pub mod credentials;
pub mod entries;
pub mod repository;
