//! Inbound `{id, text, value}` entries to typed column values.
//!
//! The service reports every column twice: a human-readable `text`
//! projection and a `value` field whose content is a JSON document encoded as
//! a JSON string. Structured kinds therefore take two parses: the response
//! parse yields the string, and [`parse_value`] decodes the string itself.

use crate::columns::*;
use crate::error::{MondayError, Result};
use crate::types::RawColumnValue;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

/// Decode one raw column entry as `kind`.
///
/// Returns `Ok(None)` when the column is present but empty: a null or blank
/// `value` for kinds read from `value`, or a blank `text` for kinds read from
/// `text`. Malformed payloads fail with [`MondayError::ColumnParse`].
pub fn deserialize(kind: ColumnKind, raw: &RawColumnValue) -> Result<Option<ColumnValue>> {
    let id = raw.id.clone();
    match kind {
        ColumnKind::Text => from_text(raw, |text| {
            Ok(ColumnValue::Text(ColumnText {
                id,
                text: Some(text.to_string()),
            }))
        }),
        ColumnKind::Number => from_text(raw, |text| {
            let number = Decimal::from_str(text.trim())
                .map_err(|e| MondayError::column_parse(&id, kind, e))?;
            Ok(ColumnValue::Number(ColumnNumber {
                id,
                number: Some(number),
            }))
        }),
        ColumnKind::LongText => from_text(raw, |text| {
            let value = ColumnLongText::new(id, text);
            let text = value.normalized().to_string();
            Ok(ColumnValue::LongText(ColumnLongText { text, ..value }))
        }),
        ColumnKind::Tag => from_text(raw, |text| {
            ColumnTag::parse(&id, text)
                .map(ColumnValue::Tag)
                .map_err(|e| MondayError::column_parse(&id, kind, e))
        }),
        ColumnKind::Status => from_document(kind, raw, |doc| {
            Ok(ColumnValue::Status(ColumnStatus {
                label: Some(required_str(doc, "label", &id, kind)?),
                id,
            }))
        }),
        ColumnKind::ColorPicker => from_document(kind, raw, |doc| {
            Ok(ColumnValue::ColorPicker(ColumnColorPicker {
                label: Some(required_str(doc, "label", &id, kind)?),
                id,
            }))
        }),
        ColumnKind::Checkbox => from_document(kind, raw, |doc| {
            Ok(ColumnValue::Checkbox(ColumnCheckBox {
                checked: Some(parse_checked(doc, &id)?),
                id,
            }))
        }),
        ColumnKind::Date => from_document(kind, raw, |doc| {
            let date = required_str(doc, "date", &id, kind)?;
            Ok(ColumnValue::Date(ColumnDateTime {
                date: Some(parse_date(&date, &id, kind)?),
                id,
            }))
        }),
        ColumnKind::Timeline => from_document(kind, raw, |doc| {
            let from = required_str(doc, "from", &id, kind)?;
            let to = required_str(doc, "to", &id, kind)?;
            Ok(ColumnValue::Timeline(ColumnTimeline {
                from: parse_date(&from, &id, kind)?,
                to: parse_date(&to, &id, kind)?,
                id,
            }))
        }),
        ColumnKind::Link => from_document(kind, raw, |doc| {
            Ok(ColumnValue::Link(ColumnLink {
                url: required_str(doc, "url", &id, kind)?,
                link_text: required_str(doc, "text", &id, kind)?,
                id,
            }))
        }),
        ColumnKind::Dropdown => from_document(kind, raw, |doc| {
            Ok(ColumnValue::Dropdown(ColumnDropDown {
                labels: parse_labels(doc, &id)?,
                id,
            }))
        }),
    }
}

/// Decode from the `text` projection; a missing or blank projection is an empty column.
fn from_text(
    raw: &RawColumnValue,
    decode: impl FnOnce(&str) -> Result<ColumnValue>,
) -> Result<Option<ColumnValue>> {
    raw.text
        .as_deref()
        .filter(|text| !text.is_empty())
        .map(decode)
        .transpose()
}

/// Decode from the embedded `value` document; see [`parse_value`] for empty columns.
fn from_document(
    kind: ColumnKind,
    raw: &RawColumnValue,
    decode: impl FnOnce(&Map<String, Value>) -> Result<ColumnValue>,
) -> Result<Option<ColumnValue>> {
    parse_value(kind, raw)?.map(|doc| decode(&doc)).transpose()
}

/// Second parse of the `value` string into a JSON object.
///
/// `None` for a missing, blank, or literal `null` value.
pub fn parse_value(kind: ColumnKind, raw: &RawColumnValue) -> Result<Option<Map<String, Value>>> {
    let Some(encoded) = raw.value.as_deref().map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let parsed: Value = serde_json::from_str(encoded)
        .map_err(|e| MondayError::column_parse(&raw.id, kind, e))?;
    match parsed {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        other => Err(MondayError::column_parse(
            &raw.id,
            kind,
            format!("expected a JSON object, found {other}"),
        )),
    }
}

fn required_str(doc: &Map<String, Value>, name: &str, id: &str, kind: ColumnKind) -> Result<String> {
    match doc.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(MondayError::column_parse(
            id,
            kind,
            format!("field '{name}' is not a string: {other}"),
        )),
        None => Err(MondayError::column_parse(
            id,
            kind,
            format!("missing field '{name}'"),
        )),
    }
}

fn parse_date(text: &str, id: &str, kind: ColumnKind) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|e| MondayError::column_parse(id, kind, e))
}

/// `checked` arrives either as a JSON bool or as the strings `"true"`/`"false"`.
fn parse_checked(doc: &Map<String, Value>, id: &str) -> Result<bool> {
    let kind = ColumnKind::Checkbox;
    match doc.get("checked") {
        Some(Value::Bool(checked)) => Ok(*checked),
        Some(Value::String(s)) => s
            .parse::<bool>()
            .map_err(|e| MondayError::column_parse(id, kind, e)),
        Some(other) => Err(MondayError::column_parse(
            id,
            kind,
            format!("field 'checked' is not a boolean: {other}"),
        )),
        None => Err(MondayError::column_parse(id, kind, "missing field 'checked'")),
    }
}

fn parse_labels(doc: &Map<String, Value>, id: &str) -> Result<Vec<String>> {
    let kind = ColumnKind::Dropdown;
    let labels = doc
        .get("labels")
        .and_then(Value::as_array)
        .ok_or_else(|| MondayError::column_parse(id, kind, "missing field 'labels'"))?;
    labels
        .iter()
        .map(|label| {
            label
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| MondayError::column_parse(id, kind, "label is not a string"))
        })
        .collect()
}
