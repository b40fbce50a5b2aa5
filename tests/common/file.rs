use derive_new::new;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Eq, PartialEq, new)]
pub struct FileSpec {
    pub path: PathBuf,
    pub content: String,
}

pub fn write_file(file_spec: FileSpec) {
    if let Some(parent) = file_spec.path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory");
    }

    std::fs::write(&file_spec.path, file_spec.content).expect("Failed to write file");
}

/// Write `files` (repository-relative path, content) below `root`
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        write_file(FileSpec::new(root.join(path), content.to_string()));
    }
}
