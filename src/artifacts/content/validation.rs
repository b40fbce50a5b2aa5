use crate::artifacts::config::Field;
use crate::artifacts::formats::Fields;
use serde_json::Value;

/// Every problem found in an entry, reported together
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid entry: {}", problems.join("; "))]
pub struct ValidationError {
    pub problems: Vec<String>,
}

/// Fill missing (or null) fields that declare a default.
pub fn apply_defaults(schema: &[Field], data: &mut Fields) {
    for field in schema {
        let Some(default) = &field.default else {
            continue;
        };
        if data.get(&field.name).is_none_or(Value::is_null) {
            data.insert(field.name.clone(), default.clone());
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn widget_accepts(widget: &str, value: &Value) -> bool {
    match widget {
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "list" => value.is_array(),
        "object" => value.is_object(),
        "string" | "text" | "markdown" | "datetime" | "date" | "image" | "file" | "select" => {
            !value.is_array() && !value.is_object()
        }
        _ => true,
    }
}

/// Check required fields and widget value kinds against `schema`.
pub fn validate(schema: &[Field], data: &Fields) -> Result<(), ValidationError> {
    let mut problems = Vec::new();

    for field in schema {
        match data.get(&field.name) {
            Some(value) if !is_blank(value) => {
                if !widget_accepts(&field.widget, value) {
                    problems.push(format!(
                        "{} does not hold a valid {} value",
                        field.label(),
                        field.widget
                    ));
                }
            }
            _ if field.required => problems.push(format!("{} is required", field.label())),
            _ => {}
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { problems })
    }
}
