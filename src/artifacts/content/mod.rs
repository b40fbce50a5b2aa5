//! Entries and the rules applied before they are saved
//!
//! - `entry`: a document of a collection, as field values plus its location
//! - `slug`: slug generation from titles and slug templates
//! - `validation`: field defaults and required/widget checks

pub mod entry;
pub mod slug;
pub mod validation;
