use crate::areas::repository::Repository;

impl Repository {
    /// Print the raw content of the file at `path` on the branch head.
    pub async fn cat_file(&self, path: &str) -> anyhow::Result<()> {
        let content = self.read_path(path).await?;

        self.writer().write_all(&content)?;

        Ok(())
    }
}
