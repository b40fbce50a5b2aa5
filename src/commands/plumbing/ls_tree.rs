use crate::areas::backend::{normalize_path, split_path};
use crate::areas::repository::Repository;
use crate::artifacts::objects::tree::Tree;
use anyhow::Context;

impl Repository {
    /// List the tree of `dir` (the root when `None`) at the branch head.
    pub async fn ls_tree(&self, dir: Option<&str>, recursive: bool) -> anyhow::Result<()> {
        let head = self.api().branch_head().await?;
        let commit = self.api().read_commit(&head).await?;
        let mut tree = self.api().read_tree(&commit.tree).await?;

        let prefix = normalize_path(dir.unwrap_or_default())?;
        for segment in split_path(&prefix)? {
            let entry = tree
                .entry(&segment)
                .filter(|entry| entry.is_tree())
                .with_context(|| format!("{prefix} is not a directory on the branch"))?;
            tree = self.api().read_tree(&entry.sha.clone()).await?;
        }

        self.print_tree(&tree, &prefix, recursive).await
    }

    async fn print_tree(&self, tree: &Tree, prefix: &str, recursive: bool) -> anyhow::Result<()> {
        for entry in &tree.entries {
            let path = if prefix.is_empty() {
                entry.path.clone()
            } else {
                format!("{prefix}/{}", entry.path)
            };

            if recursive && entry.is_tree() {
                let subtree = self.api().read_tree(&entry.sha).await?;
                Box::pin(self.print_tree(&subtree, &path, recursive)).await?;
            } else {
                writeln!(
                    self.writer(),
                    "{} {} {}\t{}",
                    entry.mode.as_str(),
                    entry.kind.as_str(),
                    entry.sha,
                    path
                )?;
            }
        }

        Ok(())
    }
}
