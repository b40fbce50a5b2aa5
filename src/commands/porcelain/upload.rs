use crate::areas::repository::Repository;
use colored::Colorize;
use std::path::Path;

impl Repository {
    pub async fn upload(&self, file: &Path) -> anyhow::Result<()> {
        let path = self.upload_media(file).await?;

        writeln!(self.writer(), "{} {path}", "Uploaded".green())?;

        Ok(())
    }
}
