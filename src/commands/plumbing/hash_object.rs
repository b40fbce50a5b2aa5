use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use std::path::Path;

/// Print the Git blob id of the local file at `file`.
///
/// Needs no configuration: the id is what any backend assigns the same bytes.
pub fn hash_object(file: &Path, writer: &mut dyn std::io::Write) -> anyhow::Result<ObjectId> {
    let content =
        std::fs::read(file).with_context(|| format!("Unable to read {}", file.display()))?;
    let object_id = Blob::new(content).object_id()?;

    writeln!(writer, "{}", object_id)?;

    Ok(object_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hash_object_matches_git() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("hello.txt");
        std::fs::write(&file, "hello\n").unwrap();

        let mut output = Vec::new();
        let object_id = hash_object(&file, &mut output).unwrap();

        assert_eq!(object_id.as_ref(), "ce013625030ba8dba906f756967f9e9ca394464a");
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "ce013625030ba8dba906f756967f9e9ca394464a\n"
        );
    }
}
