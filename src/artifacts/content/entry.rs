use crate::artifacts::formats::{BODY_FIELD, Fields};
use crate::artifacts::objects::object_id::ObjectId;
use serde::Serialize;
use serde_json::Value;

const TITLE_FIELDS: [&str; 3] = ["title", "name", "label"];

/// One document of a collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub collection: String,
    pub slug: String,
    pub path: String,
    pub data: Fields,
    /// Blob the entry was read from; `None` for entries not saved yet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<ObjectId>,
}

impl Entry {
    pub fn new(collection: String, slug: String, path: String, data: Fields) -> Self {
        Entry {
            collection,
            slug,
            path,
            data,
            sha: None,
        }
    }

    /// Human readable name: the first of `title`, `name` or `label` that is a
    /// non-empty string, else the slug.
    pub fn title(&self) -> &str {
        TITLE_FIELDS
            .iter()
            .filter_map(|field| self.data.get(*field).and_then(Value::as_str))
            .find(|title| !title.trim().is_empty())
            .unwrap_or(&self.slug)
    }

    pub fn body(&self) -> Option<&str> {
        self.data.get(BODY_FIELD).and_then(Value::as_str)
    }

    pub fn is_new(&self) -> bool {
        self.sha.is_none()
    }

    /// Overlay `changes` on the current field values, keeping field order.
    pub fn merge(&mut self, changes: Fields) {
        for (field, value) in changes {
            self.data.insert(field, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn entry(data: Value) -> Entry {
        Entry::new(
            "posts".to_string(),
            "hello".to_string(),
            "_posts/hello.md".to_string(),
            data.as_object().unwrap().clone(),
        )
    }

    #[test]
    fn test_title_prefers_title_field() {
        assert_eq!(entry(json!({"title": "Hello", "name": "x"})).title(), "Hello");
        assert_eq!(entry(json!({"title": " ", "name": "Named"})).title(), "Named");
        assert_eq!(entry(json!({"weight": 1})).title(), "hello");
    }

    #[test]
    fn test_merge_overrides_and_appends() {
        let mut entry = entry(json!({"title": "Old", "draft": true}));
        entry.merge(json!({"title": "New", "tags": ["a"]}).as_object().unwrap().clone());

        assert_eq!(
            Value::Object(entry.data.clone()),
            json!({"title": "New", "draft": true, "tags": ["a"]})
        );
        assert_eq!(
            entry.data.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["title", "draft", "tags"]
        );
        assert!(entry.is_new());
        assert_eq!(entry.body(), None);
    }
}
