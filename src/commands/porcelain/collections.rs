use crate::areas::repository::Repository;
use crate::artifacts::config::CollectionKind;
use colored::Colorize;

impl Repository {
    pub fn collections(&self) -> anyhow::Result<()> {
        for collection in &self.config().collections {
            let location = match collection.kind() {
                CollectionKind::Folder(folder) => {
                    format!("folder {folder} (*.{})", collection.extension())
                }
                CollectionKind::Files(files) => format!(
                    "files {}",
                    files
                        .iter()
                        .map(|file| file.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            };

            writeln!(
                self.writer(),
                "{}\t{}\t{}",
                collection.name.bold(),
                collection.label(),
                location
            )?;
        }

        Ok(())
    }
}
