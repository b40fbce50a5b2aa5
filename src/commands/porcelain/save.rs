use crate::areas::entries::SavedEntry;
use crate::areas::repository::Repository;
use crate::artifacts::formats::{BODY_FIELD, Fields};
use anyhow::Context;
use colored::Colorize;
use serde_json::Value;
use std::path::Path;

/// Field changes given on the command line
#[derive(Debug, Default)]
pub struct FieldArgs<'a> {
    pub assignments: &'a [String],
    pub body_file: Option<&'a Path>,
}

impl FieldArgs<'_> {
    /// `key=value` assignments as fields; values are read as YAML scalars so
    /// `draft=true` is a boolean and `count=3` a number.
    pub fn to_fields(&self) -> anyhow::Result<Fields> {
        let mut fields = Fields::new();

        for assignment in self.assignments {
            let (key, value) = parse_assignment(assignment)?;
            fields.insert(key, value);
        }

        if let Some(body_file) = self.body_file {
            let body = std::fs::read_to_string(body_file)
                .with_context(|| format!("Unable to read {}", body_file.display()))?;
            fields.insert(BODY_FIELD.to_string(), Value::String(body));
        }

        Ok(fields)
    }
}

pub fn parse_assignment(assignment: &str) -> anyhow::Result<(String, Value)> {
    let (key, raw) = assignment
        .split_once('=')
        .with_context(|| format!("expected key=value, got {assignment:?}"))?;
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("missing field name in {assignment:?}");
    }

    let value = match serde_yaml::from_str::<Value>(raw) {
        _ if raw.trim().is_empty() => Value::String(String::new()),
        Ok(value @ (Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_))) => value,
        // collections and unparsable input are taken literally
        _ => Value::String(raw.to_string()),
    };

    Ok((key.to_string(), value))
}

impl Repository {
    pub async fn new_entry(&self, collection: &str, args: FieldArgs<'_>) -> anyhow::Result<()> {
        let saved = self.create_entry(collection, args.to_fields()?).await?;
        self.report_saved(&saved)
    }

    pub async fn edit_entry(
        &self,
        collection: &str,
        slug: &str,
        args: FieldArgs<'_>,
    ) -> anyhow::Result<()> {
        let saved = self
            .update_entry(collection, slug, args.to_fields()?)
            .await?;
        self.report_saved(&saved)
    }

    fn report_saved(&self, saved: &SavedEntry) -> anyhow::Result<()> {
        let action = if saved.created {
            "Created".green()
        } else {
            "Updated".green()
        };

        writeln!(
            self.writer(),
            "{} {}/{} [{}] {}",
            action,
            saved.entry.collection,
            saved.entry.slug,
            saved.commit.commit.to_short_oid().yellow(),
            saved.entry.path
        )?;

        Ok(())
    }
}
