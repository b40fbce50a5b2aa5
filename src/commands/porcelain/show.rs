use crate::areas::repository::Repository;

impl Repository {
    /// Print an entry as its stored document, or as JSON with `json`.
    pub async fn show(&self, collection: &str, slug: &str, json: bool) -> anyhow::Result<()> {
        let entry = self.read_entry(collection, slug).await?;

        let output = if json {
            format!("{}\n", serde_json::to_string_pretty(&entry)?)
        } else {
            self.config()
                .collection(collection)?
                .format_for(&entry.path)
                .serialize(&entry.data)?
        };

        write!(self.writer(), "{}", output)?;

        Ok(())
    }
}
