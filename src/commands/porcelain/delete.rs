use crate::areas::repository::Repository;
use colored::Colorize;

impl Repository {
    pub async fn delete(&self, collection: &str, slug: &str) -> anyhow::Result<()> {
        let sha = self.delete_entry(collection, slug).await?;

        writeln!(
            self.writer(),
            "{} {collection}/{slug} ({})",
            "Deleted".red(),
            sha.to_short_oid()
        )?;

        Ok(())
    }
}
