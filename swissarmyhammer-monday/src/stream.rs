//! Cursor pagination over a board's items.
//!
//! [`ItemPager`] is a pull state machine: a page is fetched only when the
//! previous one has been drained and the caller asks for another item, so at
//! most one request is outstanding and nothing is fetched ahead of demand.
//! Dropping the pager (or the stream built from it) drops any in-flight
//! request with it.

use crate::error::{MondayError, Result};
use crate::query::{self, FilterRule};
use crate::row::{self, BoardRow};
use crate::transport::Transport;
use crate::types::{ItemFields, RawItem};
use futures::stream::{self, Stream};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::vec;
use tracing::{debug, trace, warn};

/// What to page over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemQuery {
    pub board_id: u64,
    pub rules: Vec<FilterRule>,
    pub fields: ItemFields,
    pub limit: u32,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    cursor: Option<String>,
    #[serde(default)]
    items: Vec<RawItem>,
}

enum PagerState {
    /// No request issued yet.
    Start,
    /// Handing out a fetched page.
    Yielding {
        items: vec::IntoIter<RawItem>,
        cursor: Option<String>,
    },
    /// Page drained; the next one starts at `cursor`.
    Idle { cursor: String },
    Exhausted,
}

/// Lazy, forward-only sequence of a board's raw items.
pub struct ItemPager {
    transport: Arc<dyn Transport>,
    query: ItemQuery,
    state: PagerState,
    fetches: usize,
}

impl ItemPager {
    pub fn new(transport: Arc<dyn Transport>, query: ItemQuery) -> Self {
        Self {
            transport,
            query,
            state: PagerState::Start,
            fetches: 0,
        }
    }

    /// Number of page requests issued so far.
    pub fn fetches(&self) -> usize {
        self.fetches
    }

    /// Pull the next item, fetching a page when the current one is drained.
    ///
    /// Returns `None` once the last page has been handed out. A failed fetch
    /// is returned once and ends the sequence.
    pub async fn next_item(&mut self) -> Option<Result<RawItem>> {
        loop {
            // A fetch cancelled mid-await leaves the pager exhausted.
            match std::mem::replace(&mut self.state, PagerState::Exhausted) {
                PagerState::Start => {
                    if let Err(e) = self.fetch(None).await {
                        return Some(Err(e));
                    }
                }
                PagerState::Idle { cursor } => {
                    if let Err(e) = self.fetch(Some(cursor)).await {
                        return Some(Err(e));
                    }
                }
                PagerState::Yielding { mut items, cursor } => {
                    if let Some(item) = items.next() {
                        self.state = PagerState::Yielding { items, cursor };
                        return Some(Ok(item));
                    }
                    self.state = match cursor {
                        Some(cursor) => PagerState::Idle { cursor },
                        None => PagerState::Exhausted,
                    };
                }
                PagerState::Exhausted => return None,
            }
        }
    }

    async fn fetch(&mut self, cursor: Option<String>) -> Result<()> {
        let document = match &cursor {
            None => query::items_page_query(
                self.query.board_id,
                self.query.limit,
                &self.query.rules,
                self.query.fields,
            ),
            Some(cursor) => {
                query::next_items_page_query(cursor, self.query.limit, self.query.fields)
            }
        };
        trace!(%document, "fetching items page");

        self.fetches += 1;
        let response = self.transport.execute_query(&document).await?;
        let page = parse_page(response, cursor.is_none(), self.query.board_id)?;

        debug!(
            board_id = self.query.board_id,
            page = self.fetches,
            items = page.items.len(),
            has_more = page.cursor.is_some(),
            "fetched items page"
        );

        self.state = PagerState::Yielding {
            items: page.items.into_iter(),
            cursor: page.cursor.filter(|cursor| !cursor.is_empty()),
        };
        Ok(())
    }

    /// Bind every item into `R`.
    ///
    /// An item that fails to bind yields `Ok(None)` and is logged; the stream
    /// carries on with the next item. A fetch failure yields one `Err` and
    /// ends the stream.
    pub fn into_rows<R>(self) -> impl Stream<Item = Result<Option<R>>> + Send
    where
        R: BoardRow + Send,
    {
        stream::unfold(self, |mut pager| async move {
            let slot = match pager.next_item().await? {
                Ok(raw) => {
                    let item_id = raw.id.clone();
                    match row::bind::<R>(raw) {
                        Ok(row) => Ok(Some(row)),
                        Err(error) => {
                            warn!(%item_id, %error, "skipping item that failed to bind");
                            Ok(None)
                        }
                    }
                }
                Err(error) => Err(error),
            };
            Some((slot, pager))
        })
    }
}

fn parse_page(response: Value, first: bool, board_id: u64) -> Result<Page> {
    let data = query::response_data(response)?;
    let page = if first {
        let boards = data
            .get("boards")
            .and_then(Value::as_array)
            .ok_or_else(|| MondayError::unexpected("response has no boards"))?;
        boards
            .first()
            .and_then(|board| board.get("items_page"))
            .ok_or_else(|| MondayError::unexpected(format!("board {board_id} not found")))?
    } else {
        data.get("next_items_page")
            .ok_or_else(|| MondayError::unexpected("response has no next_items_page"))?
    };
    Ok(Page::deserialize(page)?)
}
