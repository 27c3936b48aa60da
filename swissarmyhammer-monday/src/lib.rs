//! Typed access to monday.com boards over GraphQL
//!
//! This crate maps board items to caller-defined row structs and back. Each
//! column kind has its own value type; the codec converts those values to the
//! per-kind JSON shapes mutations expect and decodes the `{id, text, value}`
//! entries queries return.
//!
//! ## Overview
//!
//! - **Closed column model** - [`ColumnValue`] has one variant per supported column kind
//! - **Bind by identifier** - `#[derive(BoardRow)]` builds a static registry from column ids to fields
//! - **Lazy pagination** - [`MondayClient::board_items`] fetches the next page only when the stream asks for it
//! - **Pluggable transport** - [`Transport`] is the only network seam; [`HttpTransport`] is the default
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use swissarmyhammer_monday::{
//!     BoardRow, ColumnStatus, ColumnText, ColumnValue, Item, MondayClient, MondayConfig,
//! };
//!
//! #[derive(Debug, Default, BoardRow)]
//! struct Task {
//!     #[monday(id)]
//!     id: Option<String>,
//!     #[monday(name)]
//!     name: String,
//!     #[monday(column = "text0")]
//!     owner: Option<ColumnText>,
//!     #[monday(column = "status")]
//!     status: Option<ColumnStatus>,
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MondayClient::new(&MondayConfig::load()?)?;
//!
//! // Stream rows whose status is Done
//! let filter: [ColumnValue; 1] = [ColumnStatus::new("status", "Done").into()];
//! let mut rows = Box::pin(client.board_items::<Task>(1234, &filter));
//! while let Some(row) = rows.next().await {
//!     if let Some(task) = row? {
//!         println!("{} {:?}", task.name, task.owner);
//!     }
//! }
//!
//! // Create an item
//! let created = client
//!     .create_board_items(1234, &[Item::new("Write docs").with_column(ColumnText::new("text0", "me"))])
//!     .await?;
//! println!("created {:?}", created.keys().collect::<Vec<_>>());
//! # Ok(())
//! # }
//! ```

// Lets the derive's `::swissarmyhammer_monday::` paths resolve inside this crate.
extern crate self as swissarmyhammer_monday;

pub mod client;
pub mod codec;
pub mod columns;
pub mod config;
pub mod error;
pub mod query;
pub mod row;
pub mod stream;
pub mod transport;
pub mod types;

pub use client::MondayClient;
pub use columns::{
    Column, ColumnCheckBox, ColumnColorPicker, ColumnDateTime, ColumnDropDown, ColumnKind,
    ColumnLink, ColumnLongText, ColumnNumber, ColumnStatus, ColumnTag, ColumnText,
    ColumnTimeline, ColumnValue,
};
pub use config::{MondayConfig, MondayConfigBuilder};
pub use error::{MondayError, Result, TransportError};
pub use row::{bind, extract, BoardRow, ColumnBinding, ColumnGetter, ColumnSetter};
pub use stream::{ItemPager, ItemQuery};
pub use swissarmyhammer_monday_macros::BoardRow;
pub use transport::{HttpTransport, Transport};
pub use types::{Asset, Group, Item, ItemFields, ItemMeta, RawColumnValue, RawItem, Update};
