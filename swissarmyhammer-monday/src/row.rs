//! Binding between caller-defined row structs and item column values.
//!
//! A row type implements [`BoardRow`], usually through `#[derive(BoardRow)]`,
//! which emits a static registry of [`ColumnBinding`]s: one per tagged field,
//! each knowing the column id, the column kind (taken from the field's type),
//! and how to set and read the field. The registry is built once per type at
//! compile time and reused for every item.
//!
//! Binding is by column identifier. A row may declare any subset of a board's
//! columns in any order; entries the row does not declare are ignored and
//! declared columns missing from an item leave the field at its default.
//!
//! ```
//! use swissarmyhammer_monday::{BoardRow, ColumnNumber, ColumnStatus, ColumnText};
//!
//! #[derive(Debug, Default, BoardRow)]
//! struct TaskRow {
//!     #[monday(id)]
//!     id: Option<String>,
//!     #[monday(name)]
//!     name: String,
//!     #[monday(column = "text0")]
//!     owner: Option<ColumnText>,
//!     #[monday(column = "numbers9")]
//!     estimate: Option<ColumnNumber>,
//!     #[monday(column = "status")]
//!     status: Option<ColumnStatus>,
//! }
//! ```

use crate::codec;
use crate::columns::{ColumnKind, ColumnValue};
use crate::error::Result;
use crate::types::{Item, ItemFields, ItemMeta, RawColumnValue, RawItem};
use std::collections::HashMap;
use std::fmt;

/// Stores a decoded value into its field.
pub type ColumnSetter<R> = fn(&mut R, ColumnValue) -> Result<()>;

/// Reads a field back out as a column value, `None` when the field is unset.
pub type ColumnGetter<R> = fn(&R) -> Option<ColumnValue>;

/// Registry entry tying one row field to one column identifier.
pub struct ColumnBinding<R: 'static> {
    pub id: &'static str,
    pub kind: ColumnKind,
    pub set: ColumnSetter<R>,
    pub get: ColumnGetter<R>,
}

impl<R: 'static> fmt::Debug for ColumnBinding<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnBinding")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// A typed record shape whose fields map to board columns.
pub trait BoardRow: Default + Sized + 'static {
    /// The column registry for this shape.
    fn columns() -> &'static [ColumnBinding<Self>];

    /// Optional item attributes this shape wants fetched.
    fn item_fields() -> ItemFields {
        ItemFields::NONE
    }

    /// Store the non-column attributes of an item (id, name, group, assets, updates).
    fn assign_item(&mut self, _meta: ItemMeta) {}

    fn binding(id: &str) -> Option<&'static ColumnBinding<Self>> {
        Self::columns().iter().find(|binding| binding.id == id)
    }
}

/// Materialize one fetched item into a row.
///
/// Each declared column is decoded with the kind of its field. The first
/// malformed column fails the whole item.
pub fn bind<R: BoardRow>(mut raw: RawItem) -> Result<R> {
    let mut row = R::default();
    {
        let entries: HashMap<&str, &RawColumnValue> = raw
            .column_values
            .iter()
            .map(|entry| (entry.id.as_str(), entry))
            .collect();

        for binding in R::columns() {
            let Some(entry) = entries.get(binding.id) else {
                continue;
            };
            if let Some(value) = codec::deserialize(binding.kind, entry)? {
                (binding.set)(&mut row, value)?;
            }
        }
    }
    row.assign_item(raw.take_meta());
    Ok(row)
}

/// Read every set column field of a row, each addressed by its binding's id.
pub fn extract<R: BoardRow>(row: &R) -> Vec<ColumnValue> {
    R::columns()
        .iter()
        .filter_map(|binding| (binding.get)(row).map(|value| value.with_id(binding.id)))
        .collect()
}

impl Item {
    /// Build a creation request from a populated row.
    pub fn from_row<R: BoardRow>(name: impl Into<String>, row: &R) -> Self {
        Item::new(name).with_columns(extract(row))
    }
}
