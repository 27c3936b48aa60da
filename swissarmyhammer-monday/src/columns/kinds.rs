//! One value struct per column kind.
//!
//! Each struct carries the column identifier it belongs to plus the payload
//! for that kind. The structs are plain values; the wire shapes live in
//! [`crate::codec`].

use chrono::NaiveDate;
use indexmap::IndexSet;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Plain single-line text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnText {
    pub id: String,
    pub text: Option<String>,
}

impl ColumnText {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: Some(text.into()),
        }
    }
}

/// Numeric column. Sent to the service as a string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNumber {
    pub id: String,
    pub number: Option<Decimal>,
}

impl ColumnNumber {
    pub fn new(id: impl Into<String>, number: impl Into<Decimal>) -> Self {
        Self {
            id: id.into(),
            number: Some(number.into()),
        }
    }
}

/// Status column, also used for label columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnStatus {
    pub id: String,
    pub label: Option<String>,
}

impl ColumnStatus {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: Some(label.into()),
        }
    }
}

/// Color picker column, addressed by its color label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnColorPicker {
    pub id: String,
    pub label: Option<String>,
}

impl ColumnColorPicker {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: Some(label.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCheckBox {
    pub id: String,
    pub checked: Option<bool>,
}

impl ColumnCheckBox {
    pub fn new(id: impl Into<String>, checked: bool) -> Self {
        Self {
            id: id.into(),
            checked: Some(checked),
        }
    }
}

/// Date column without a time component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDateTime {
    pub id: String,
    pub date: Option<NaiveDate>,
}

impl ColumnDateTime {
    pub fn new(id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            date: Some(date),
        }
    }
}

/// Inclusive date range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnTimeline {
    pub id: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl ColumnTimeline {
    pub fn new(id: impl Into<String>, from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            id: id.into(),
            from,
            to,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLink {
    pub id: String,
    pub url: String,
    pub link_text: String,
}

impl ColumnLink {
    pub fn new(id: impl Into<String>, url: impl Into<String>, link_text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            link_text: link_text.into(),
        }
    }
}

/// Multi-label dropdown. Label order is preserved on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDropDown {
    pub id: String,
    pub labels: Vec<String>,
}

impl ColumnDropDown {
    pub fn new<I, S>(id: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }
}

/// Tag column holding the numeric ids of the attached tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnTag {
    pub id: String,
    pub tag_ids: IndexSet<u64>,
}

impl ColumnTag {
    pub fn new(id: impl Into<String>, tag_ids: impl IntoIterator<Item = u64>) -> Self {
        Self {
            id: id.into(),
            tag_ids: tag_ids.into_iter().collect(),
        }
    }

    /// Build a tag column from the comma-separated form the service uses in
    /// its `text` projection, e.g. `"21057674,21057675"`.
    ///
    /// Empty segments are skipped; a segment that is not an integer is an error.
    pub fn parse(id: impl Into<String>, text: &str) -> Result<Self, std::num::ParseIntError> {
        let tag_ids = text
            .split(',')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(str::parse::<u64>)
            .collect::<Result<IndexSet<_>, _>>()?;
        Ok(Self {
            id: id.into(),
            tag_ids,
        })
    }
}

/// Multi-line text. Trailing newlines are not significant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLongText {
    pub id: String,
    pub text: String,
}

impl ColumnLongText {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    /// Text with trailing line breaks removed, as the service stores it.
    pub fn normalized(&self) -> &str {
        self.text.trim_end_matches(['\n', '\r'])
    }
}
