//! Git tree entry modes
//!
//! Trees record a mode per entry. REST APIs transmit it as the six digit octal
//! string (`"100644"`), while the binary tree format writes it without leading
//! zeros (`40000` for directories).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EntryMode {
    #[default]
    File,
    Executable,
    Symlink,
    Directory,
    Submodule,
}

impl EntryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryMode::File => "100644",
            EntryMode::Executable => "100755",
            EntryMode::Symlink => "120000",
            EntryMode::Directory => "040000",
            EntryMode::Submodule => "160000",
        }
    }

    pub fn as_u32(&self) -> u32 {
        match self {
            EntryMode::File => 0o100644,
            EntryMode::Executable => 0o100755,
            EntryMode::Symlink => 0o120000,
            EntryMode::Directory => 0o040000,
            EntryMode::Submodule => 0o160000,
        }
    }

    pub fn from_octal_str(mode: &str) -> anyhow::Result<Self> {
        match u32::from_str_radix(mode, 8) {
            Ok(0o100644) => Ok(EntryMode::File),
            Ok(0o100755) => Ok(EntryMode::Executable),
            Ok(0o120000) => Ok(EntryMode::Symlink),
            Ok(0o040000) => Ok(EntryMode::Directory),
            Ok(0o160000) => Ok(EntryMode::Submodule),
            _ => Err(anyhow::anyhow!("Invalid entry mode {mode}")),
        }
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, EntryMode::Directory)
    }
}

impl TryFrom<String> for EntryMode {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_octal_str(&value)
    }
}

impl From<EntryMode> for String {
    fn from(value: EntryMode) -> Self {
        value.as_str().to_string()
    }
}
