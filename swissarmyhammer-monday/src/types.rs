//! Item records as the service returns them and as callers submit them.

use crate::codec;
use crate::columns::{ColumnKind, ColumnValue};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One `{id, text, value}` entry of an item's `column_values`.
///
/// `value` is itself a JSON document encoded as a string; see [`crate::codec`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawColumnValue {
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "encoded_json")]
    pub value: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub column_type: Option<String>,
}

impl RawColumnValue {
    pub fn new(id: impl Into<String>, text: Option<&str>, value: Option<&str>) -> Self {
        Self {
            id: id.into(),
            text: text.map(str::to_string),
            value: value.map(str::to_string),
            column_type: None,
        }
    }
}

/// Accept `value` either as the usual JSON-encoded string or, from API versions
/// that inline it, as a JSON document that is re-encoded to a string.
fn encoded_json<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(encoded)) => Some(encoded),
        Some(inline) => Some(inline.to_string()),
    })
}

/// A board group (section of a board).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Group {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

/// A file attached to an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub public_url: Option<String>,
    #[serde(default)]
    pub file_extension: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// An activity entry posted on an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub id: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub text_body: Option<String>,
    #[serde(default)]
    pub creator_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Which optional item attributes a query should project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemFields {
    pub group: bool,
    pub assets: bool,
    pub updates: bool,
}

impl ItemFields {
    pub const NONE: Self = Self {
        group: false,
        assets: false,
        updates: false,
    };

    pub const ALL: Self = Self {
        group: true,
        assets: true,
        updates: true,
    };
}

/// An item exactly as a query returned it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub group: Option<Group>,
    #[serde(default)]
    pub assets: Option<Vec<Asset>>,
    #[serde(default)]
    pub updates: Option<Vec<Update>>,
    #[serde(default)]
    pub column_values: Vec<RawColumnValue>,
}

impl RawItem {
    /// Decode every column using the `type` the service reports for it.
    ///
    /// Columns without a reported type are skipped. Empty columns are omitted.
    pub fn into_item(self) -> Result<Item> {
        let mut column_values = Vec::with_capacity(self.column_values.len());
        for raw in &self.column_values {
            let Some(wire_type) = raw.column_type.as_deref() else {
                continue;
            };
            let kind = ColumnKind::from_wire_type(wire_type)?;
            if let Some(value) = codec::deserialize(kind, raw)? {
                column_values.push(value);
            }
        }

        Ok(Item {
            id: Some(self.id),
            name: self.name,
            group: self.group,
            column_values,
            assets: self.assets,
            updates: self.updates,
        })
    }

    /// Split off the attributes that are bound directly rather than through columns.
    pub(crate) fn take_meta(&mut self) -> ItemMeta {
        ItemMeta {
            id: Some(std::mem::take(&mut self.id)),
            name: std::mem::take(&mut self.name),
            group: self.group.take(),
            assets: self.assets.take(),
            updates: self.updates.take(),
        }
    }
}

/// Non-column attributes of an item handed to [`BoardRow::assign_item`](crate::BoardRow::assign_item).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemMeta {
    pub id: Option<String>,
    pub name: String,
    pub group: Option<Group>,
    pub assets: Option<Vec<Asset>>,
    pub updates: Option<Vec<Update>>,
}

/// A board item with typed column values.
///
/// `id` is assigned by the service and is `None` until the item is created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item {
    pub id: Option<String>,
    pub name: String,
    pub group: Option<Group>,
    pub column_values: Vec<ColumnValue>,
    pub assets: Option<Vec<Asset>>,
    pub updates: Option<Vec<Update>>,
}

impl Item {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_column(mut self, value: impl Into<ColumnValue>) -> Self {
        self.column_values.push(value.into());
        self
    }

    pub fn with_columns(mut self, values: impl IntoIterator<Item = ColumnValue>) -> Self {
        self.column_values.extend(values);
        self
    }

    /// Place the item in a group when it is created.
    pub fn with_group(mut self, group: Group) -> Self {
        self.group = Some(group);
        self
    }

    /// Look up a column value by identifier.
    pub fn column(&self, id: &str) -> Option<&ColumnValue> {
        self.column_values.iter().find(|value| value.id() == id)
    }
}
