//! Typed column values.
//!
//! [`ColumnValue`] is a closed sum over every column kind the codec understands.
//! Adding a kind means adding one variant here plus one arm in each direction of
//! [`crate::codec`]; the compiler points at every match that needs the new arm.

mod kinds;

pub use kinds::{
    ColumnCheckBox, ColumnColorPicker, ColumnDateTime, ColumnDropDown, ColumnLink,
    ColumnLongText, ColumnNumber, ColumnStatus, ColumnTag, ColumnText, ColumnTimeline,
};

use crate::error::{MondayError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date format used for every date on the wire.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The kind of a column, which decides how its payload is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Text,
    Number,
    Status,
    ColorPicker,
    Checkbox,
    Date,
    Timeline,
    Link,
    Dropdown,
    Tag,
    LongText,
}

impl ColumnKind {
    /// Map the service's column `type` name to a kind.
    pub fn from_wire_type(wire_type: &str) -> Result<Self> {
        match wire_type {
            "text" => Ok(Self::Text),
            "numbers" | "numeric" => Ok(Self::Number),
            "status" | "color" => Ok(Self::Status),
            "color_picker" => Ok(Self::ColorPicker),
            "checkbox" | "boolean" => Ok(Self::Checkbox),
            "date" => Ok(Self::Date),
            "timeline" | "timerange" => Ok(Self::Timeline),
            "link" => Ok(Self::Link),
            "dropdown" => Ok(Self::Dropdown),
            "tags" | "tag" => Ok(Self::Tag),
            "long_text" | "long-text" => Ok(Self::LongText),
            other => Err(MondayError::UnsupportedColumnKind {
                kind: other.to_string(),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Status => "status",
            Self::ColorPicker => "color_picker",
            Self::Checkbox => "checkbox",
            Self::Date => "date",
            Self::Timeline => "timeline",
            Self::Link => "link",
            Self::Dropdown => "dropdown",
            Self::Tag => "tag",
            Self::LongText => "long_text",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed column value belonging to one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnValue {
    Text(ColumnText),
    Number(ColumnNumber),
    Status(ColumnStatus),
    ColorPicker(ColumnColorPicker),
    Checkbox(ColumnCheckBox),
    Date(ColumnDateTime),
    Timeline(ColumnTimeline),
    Link(ColumnLink),
    Dropdown(ColumnDropDown),
    Tag(ColumnTag),
    LongText(ColumnLongText),
}

impl ColumnValue {
    /// Column identifier this value belongs to.
    pub fn id(&self) -> &str {
        match self {
            Self::Text(c) => &c.id,
            Self::Number(c) => &c.id,
            Self::Status(c) => &c.id,
            Self::ColorPicker(c) => &c.id,
            Self::Checkbox(c) => &c.id,
            Self::Date(c) => &c.id,
            Self::Timeline(c) => &c.id,
            Self::Link(c) => &c.id,
            Self::Dropdown(c) => &c.id,
            Self::Tag(c) => &c.id,
            Self::LongText(c) => &c.id,
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Self::Text(_) => ColumnKind::Text,
            Self::Number(_) => ColumnKind::Number,
            Self::Status(_) => ColumnKind::Status,
            Self::ColorPicker(_) => ColumnKind::ColorPicker,
            Self::Checkbox(_) => ColumnKind::Checkbox,
            Self::Date(_) => ColumnKind::Date,
            Self::Timeline(_) => ColumnKind::Timeline,
            Self::Link(_) => ColumnKind::Link,
            Self::Dropdown(_) => ColumnKind::Dropdown,
            Self::Tag(_) => ColumnKind::Tag,
            Self::LongText(_) => ColumnKind::LongText,
        }
    }

    /// Return the same value re-addressed to another column identifier.
    pub fn with_id(self, id: impl Into<String>) -> Self {
        let id = id.into();
        match self {
            Self::Text(c) => Self::Text(ColumnText { id, ..c }),
            Self::Number(c) => Self::Number(ColumnNumber { id, ..c }),
            Self::Status(c) => Self::Status(ColumnStatus { id, ..c }),
            Self::ColorPicker(c) => Self::ColorPicker(ColumnColorPicker { id, ..c }),
            Self::Checkbox(c) => Self::Checkbox(ColumnCheckBox { id, ..c }),
            Self::Date(c) => Self::Date(ColumnDateTime { id, ..c }),
            Self::Timeline(c) => Self::Timeline(ColumnTimeline { id, ..c }),
            Self::Link(c) => Self::Link(ColumnLink { id, ..c }),
            Self::Dropdown(c) => Self::Dropdown(ColumnDropDown { id, ..c }),
            Self::Tag(c) => Self::Tag(ColumnTag { id, ..c }),
            Self::LongText(c) => Self::LongText(ColumnLongText { id, ..c }),
        }
    }

    /// Textual projection of the value, matching what the service reports in
    /// an item's `text` field. Used for column-value filters.
    pub fn display_text(&self) -> String {
        match self {
            Self::Text(c) => c.text.clone().unwrap_or_default(),
            Self::Number(c) => c.number.map(|n| n.to_string()).unwrap_or_default(),
            Self::Status(c) => c.label.clone().unwrap_or_default(),
            Self::ColorPicker(c) => c.label.clone().unwrap_or_default(),
            Self::Checkbox(c) => match c.checked {
                Some(true) => "v".to_string(),
                Some(false) | None => String::new(),
            },
            Self::Date(c) => c
                .date
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            Self::Timeline(c) => format!(
                "{} - {}",
                c.from.format(DATE_FORMAT),
                c.to.format(DATE_FORMAT)
            ),
            Self::Link(c) => format!("{} - {}", c.link_text, c.url),
            Self::Dropdown(c) => c.labels.join(", "),
            Self::Tag(c) => c
                .tag_ids
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(","),
            Self::LongText(c) => c.normalized().to_string(),
        }
    }
}

/// A value struct that can stand in a typed row field.
///
/// The associated [`KIND`](Column::KIND) is how the row binder knows which
/// decoding rule applies to a field: it comes from the field's declared type,
/// never from the wire payload.
pub trait Column: Sized {
    const KIND: ColumnKind;

    fn into_value(self) -> ColumnValue;

    /// Unwrap the matching variant, failing if `value` is of another kind.
    fn from_value(value: ColumnValue) -> Result<Self>;
}

macro_rules! impl_column {
    ($ty:ident, $variant:ident) => {
        impl Column for $ty {
            const KIND: ColumnKind = ColumnKind::$variant;

            fn into_value(self) -> ColumnValue {
                ColumnValue::$variant(self)
            }

            fn from_value(value: ColumnValue) -> Result<Self> {
                match value {
                    ColumnValue::$variant(inner) => Ok(inner),
                    other => Err(MondayError::column_parse(
                        other.id(),
                        Self::KIND,
                        format!("found a {} value", other.kind()),
                    )),
                }
            }
        }

        impl From<$ty> for ColumnValue {
            fn from(column: $ty) -> Self {
                column.into_value()
            }
        }
    };
}

impl_column!(ColumnText, Text);
impl_column!(ColumnNumber, Number);
impl_column!(ColumnStatus, Status);
impl_column!(ColumnColorPicker, ColorPicker);
impl_column!(ColumnCheckBox, Checkbox);
impl_column!(ColumnDateTime, Date);
impl_column!(ColumnTimeline, Timeline);
impl_column!(ColumnLink, Link);
impl_column!(ColumnDropDown, Dropdown);
impl_column!(ColumnTag, Tag);
impl_column!(ColumnLongText, LongText);

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn wire_type_names_map_to_kinds() {
        assert_eq!(ColumnKind::from_wire_type("numbers").unwrap(), ColumnKind::Number);
        assert_eq!(ColumnKind::from_wire_type("tags").unwrap(), ColumnKind::Tag);
        assert_eq!(
            ColumnKind::from_wire_type("long_text").unwrap(),
            ColumnKind::LongText
        );
    }

    #[test]
    fn unknown_wire_type_is_unsupported() {
        let err = ColumnKind::from_wire_type("mirror").unwrap_err();
        assert!(matches!(err, MondayError::UnsupportedColumnKind { kind } if kind == "mirror"));
    }

    #[test]
    fn with_id_keeps_payload() {
        let value = ColumnValue::from(ColumnStatus::new("status", "Done")).with_id("status_19");
        assert_eq!(value.id(), "status_19");
        assert_eq!(value.display_text(), "Done");
    }

    #[test]
    fn from_value_rejects_other_kind() {
        let err = ColumnText::from_value(ColumnCheckBox::new("checkbox", true).into()).unwrap_err();
        assert!(matches!(err, MondayError::ColumnParse { kind: ColumnKind::Text, .. }));
    }

    #[test]
    fn display_text_formats_dates_and_tags() {
        let date = ColumnValue::from(ColumnDateTime::new(
            "date",
            NaiveDate::from_ymd_opt(2023, 11, 29).unwrap(),
        ));
        assert_eq!(date.display_text(), "2023-11-29");

        let tags = ColumnValue::from(ColumnTag::new("tags", [21057674, 21057675]));
        assert_eq!(tags.display_text(), "21057674,21057675");
    }
}
