use crate::areas::repository::Repository;
use colored::Colorize;

impl Repository {
    /// Print `slug<TAB>title` for every entry of `collection`.
    pub async fn entries(&self, collection: &str) -> anyhow::Result<()> {
        let entries = self.list_entries(collection).await?;

        for entry in &entries {
            writeln!(self.writer(), "{}\t{}", entry.slug.yellow(), entry.title())?;
        }

        Ok(())
    }
}
