use crate::artifacts::formats::Fields;
use anyhow::Context;
use serde_json::Value;

fn into_fields(value: Value, format: &str) -> anyhow::Result<Fields> {
    match value {
        Value::Object(fields) => Ok(fields),
        Value::Null => Ok(Fields::new()),
        other => anyhow::bail!("expected a {format} mapping at the top level, found {other}"),
    }
}

pub fn parse_json(text: &str) -> anyhow::Result<Fields> {
    if text.trim().is_empty() {
        return Ok(Fields::new());
    }
    let value = serde_json::from_str::<Value>(text).context("Invalid JSON document")?;
    into_fields(value, "JSON")
}

pub fn to_json(fields: &Fields) -> anyhow::Result<String> {
    Ok(format!("{}\n", serde_json::to_string_pretty(fields)?))
}

pub fn parse_yaml(text: &str) -> anyhow::Result<Fields> {
    if text.trim().is_empty() {
        return Ok(Fields::new());
    }
    let value = serde_yaml::from_str::<Value>(text).context("Invalid YAML document")?;
    into_fields(value, "YAML")
}

pub fn to_yaml(fields: &Fields) -> anyhow::Result<String> {
    if fields.is_empty() {
        return Ok(String::new());
    }
    Ok(serde_yaml::to_string(fields)?)
}

/// Dates and times come back as their RFC 3339 text.
pub fn parse_toml(text: &str) -> anyhow::Result<Fields> {
    let table = toml::from_str::<toml::Table>(text).context("Invalid TOML document")?;
    Ok(from_toml_table(table))
}

/// TOML has no null: null fields and null array items are left out. Strings
/// that spell a TOML date or time exactly are written back as native values.
pub fn to_toml(fields: &Fields) -> anyhow::Result<String> {
    toml::to_string(&to_toml_table(fields)).context("Unable to encode document as TOML")
}

fn from_toml_table(table: toml::Table) -> Fields {
    table
        .into_iter()
        .map(|(key, value)| (key, from_toml_value(value)))
        .collect()
}

fn from_toml_value(value: toml::Value) -> Value {
    match value {
        toml::Value::String(text) => Value::String(text),
        toml::Value::Integer(number) => Value::from(number),
        toml::Value::Float(number) => {
            serde_json::Number::from_f64(number).map_or(Value::Null, Value::Number)
        }
        toml::Value::Boolean(flag) => Value::Bool(flag),
        toml::Value::Datetime(datetime) => Value::String(datetime.to_string()),
        toml::Value::Array(items) => {
            Value::Array(items.into_iter().map(from_toml_value).collect())
        }
        toml::Value::Table(table) => Value::Object(from_toml_table(table)),
    }
}

fn to_toml_table(fields: &Fields) -> toml::Table {
    fields
        .iter()
        .filter_map(|(key, value)| Some((key.clone(), to_toml_value(value)?)))
        .collect()
}

fn to_toml_value(value: &Value) -> Option<toml::Value> {
    let value = match value {
        Value::Null => return None,
        Value::Bool(flag) => toml::Value::Boolean(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => toml::Value::Integer(integer),
            None => toml::Value::Float(number.as_f64()?),
        },
        Value::String(text) => match as_toml_datetime(text) {
            Some(datetime) => toml::Value::Datetime(datetime),
            None => toml::Value::String(text.clone()),
        },
        Value::Array(items) => {
            toml::Value::Array(items.iter().filter_map(to_toml_value).collect())
        }
        Value::Object(fields) => toml::Value::Table(to_toml_table(fields)),
    };
    Some(value)
}

fn as_toml_datetime(text: &str) -> Option<toml::value::Datetime> {
    text.parse::<toml::value::Datetime>()
        .ok()
        .filter(|datetime| datetime.to_string() == text)
}
