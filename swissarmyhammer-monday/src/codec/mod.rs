//! Wire codec between [`ColumnValue`](crate::ColumnValue) and the service's JSON.
//!
//! Outbound (mutations): [`serialize`] produces a mapping from column id to a
//! per-kind JSON value, wrapped as a string by [`to_column_values_json`].
//!
//! Inbound (queries): [`deserialize`] decodes one `{id, text, value}` entry,
//! dispatching on a [`ColumnKind`](crate::ColumnKind) supplied by the caller.

mod deserialize;
mod serialize;

pub use deserialize::{deserialize, parse_value};
pub use serialize::{serialize, serialize_value, to_column_values_json};
