//! Typed column values to the JSON shapes mutations expect.

use crate::columns::{ColumnValue, DATE_FORMAT};
use crate::error::{MondayError, Result};
use serde_json::{json, Map, Value};

/// Encode one column value in its outbound shape.
///
/// Simple columns are bare strings (numbers included); everything else is an
/// object. A value with no payload becomes the service's "clear" form: `""` for
/// simple columns, `{}` for object columns.
pub fn serialize_value(value: &ColumnValue) -> Value {
    match value {
        ColumnValue::Text(c) => Value::String(c.text.clone().unwrap_or_default()),
        ColumnValue::Number(c) => {
            Value::String(c.number.map(|n| n.to_string()).unwrap_or_default())
        }
        ColumnValue::Status(c) => label_object(c.label.as_deref()),
        ColumnValue::ColorPicker(c) => label_object(c.label.as_deref()),
        ColumnValue::Checkbox(c) => match c.checked {
            Some(checked) => json!({ "checked": checked.to_string() }),
            None => json!({}),
        },
        ColumnValue::Date(c) => match c.date {
            Some(date) => json!({ "date": date.format(DATE_FORMAT).to_string() }),
            None => json!({}),
        },
        ColumnValue::Timeline(c) => json!({
            "from": c.from.format(DATE_FORMAT).to_string(),
            "to": c.to.format(DATE_FORMAT).to_string(),
        }),
        ColumnValue::Link(c) => json!({ "url": c.url, "text": c.link_text }),
        ColumnValue::Dropdown(c) => json!({ "labels": c.labels }),
        ColumnValue::Tag(c) => json!({ "tag_ids": c.tag_ids.iter().collect::<Vec<_>>() }),
        ColumnValue::LongText(c) => json!({ "text": c.normalized() }),
    }
}

fn label_object(label: Option<&str>) -> Value {
    match label {
        Some(label) => json!({ "label": label }),
        None => json!({}),
    }
}

/// Encode a set of column values as a mapping keyed by column identifier.
///
/// Fails with [`MondayError::DuplicateColumn`] if an identifier repeats.
pub fn serialize(values: &[ColumnValue]) -> Result<Map<String, Value>> {
    let mut map = Map::new();
    for value in values {
        let id = value.id();
        if map.insert(id.to_string(), serialize_value(value)).is_some() {
            return Err(MondayError::DuplicateColumn { id: id.to_string() });
        }
    }
    Ok(map)
}

/// The JSON-encoded `column_values` argument of item mutations.
pub fn to_column_values_json(values: &[ColumnValue]) -> Result<String> {
    let map = serialize(values)?;
    Ok(serde_json::to_string(&map)?)
}
