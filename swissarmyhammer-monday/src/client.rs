//! High level board operations.

use crate::codec;
use crate::columns::ColumnValue;
use crate::config::{MondayConfig, DEFAULT_CREATE_CONCURRENCY, DEFAULT_PAGE_SIZE};
use crate::error::{MondayError, Result};
use crate::query;
use crate::row::BoardRow;
use crate::stream::{ItemPager, ItemQuery};
use crate::transport::{HttpTransport, Transport};
use crate::types::{Item, ItemFields};
use futures::stream::{self, Stream, StreamExt};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// `{id, name}` as returned by item mutations.
#[derive(Debug, Deserialize)]
struct ItemRef {
    id: String,
    #[serde(default)]
    name: String,
}

/// Client for one account's boards.
#[derive(Clone)]
pub struct MondayClient {
    transport: Arc<dyn Transport>,
    page_size: u32,
    create_concurrency: usize,
}

impl std::fmt::Debug for MondayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MondayClient")
            .field("page_size", &self.page_size)
            .field("create_concurrency", &self.create_concurrency)
            .finish_non_exhaustive()
    }
}

impl MondayClient {
    /// Creates a client over HTTP using the given configuration.
    ///
    /// # Errors
    ///
    /// * `MondayError::Config` - If the configuration does not validate
    /// * `MondayError::Transport` - If the HTTP transport cannot be built
    pub fn new(config: &MondayConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(config)?;
        info!(endpoint = %transport.endpoint(), "Created monday client");
        Ok(Self {
            transport: Arc::new(transport),
            page_size: config.page_size,
            create_concurrency: config.create_concurrency,
        })
    }

    /// Creates a client over any transport, with default paging settings.
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
            page_size: DEFAULT_PAGE_SIZE,
            create_concurrency: DEFAULT_CREATE_CONCURRENCY,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_create_concurrency(mut self, concurrency: usize) -> Self {
        self.create_concurrency = concurrency.max(1);
        self
    }

    /// A pager over a board's raw items, for callers that want untyped access.
    pub fn item_pager(&self, board_id: u64, filter: &[ColumnValue], fields: ItemFields) -> ItemPager {
        ItemPager::new(
            self.transport.clone(),
            ItemQuery {
                board_id,
                rules: query::filter_rules(filter),
                fields,
                limit: self.page_size,
            },
        )
    }

    /// Stream a board's items bound into `R`, optionally filtered by column equality.
    ///
    /// Pages are requested as the stream is consumed. Items that fail to bind
    /// come through as `Ok(None)`.
    pub fn board_items<R>(
        &self,
        board_id: u64,
        filter: &[ColumnValue],
    ) -> impl Stream<Item = Result<Option<R>>> + Send
    where
        R: BoardRow + Send,
    {
        debug!(board_id, filters = filter.len(), "Streaming board items");
        self.item_pager(board_id, filter, R::item_fields())
            .into_rows::<R>()
    }

    /// Create every item on a board, one mutation per item.
    ///
    /// Up to `create_concurrency` mutations are in flight at once. The result
    /// maps each server-assigned id to the confirmed item. Items the service
    /// did not confirm are reported together in [`MondayError::PartialCreation`].
    #[instrument(skip(self, items), fields(count = items.len()))]
    pub async fn create_board_items(
        &self,
        board_id: u64,
        items: &[Item],
    ) -> Result<IndexMap<String, Item>> {
        // Encode everything up front so a bad column set fails before any mutation.
        let requests = items
            .iter()
            .map(|item| -> Result<Value> {
                Ok(json!({
                    "boardId": board_id.to_string(),
                    "itemName": item.name,
                    "columnValues": codec::to_column_values_json(&item.column_values)?,
                    "groupId": item.group.as_ref().map(|group| group.id.clone()),
                }))
            })
            .collect::<Result<Vec<Value>>>()?;

        let mut confirmations = stream::iter(requests.into_iter().enumerate())
            .map(|(index, variables)| async move {
                (index, self.create_item(variables).await)
            })
            .buffered(self.create_concurrency);

        let mut created = IndexMap::with_capacity(items.len());
        let mut missing = Vec::new();

        while let Some((index, outcome)) = confirmations.next().await {
            let input = &items[index];
            match outcome {
                Ok(confirmed) => {
                    if created.contains_key(&confirmed.id) {
                        warn!(id = %confirmed.id, name = %input.name, "Duplicate item confirmation");
                        missing.push(input.name.clone());
                        continue;
                    }
                    let mut item = input.clone();
                    item.id = Some(confirmed.id.clone());
                    if !confirmed.name.is_empty() {
                        item.name = confirmed.name;
                    }
                    created.insert(confirmed.id, item);
                }
                Err(MondayError::Transport(error)) => return Err(error.into()),
                Err(error) => {
                    warn!(name = %input.name, %error, "Item creation not confirmed");
                    missing.push(input.name.clone());
                }
            }
        }

        if !missing.is_empty() {
            return Err(MondayError::PartialCreation { missing });
        }
        info!(created = created.len(), "Created board items");
        Ok(created)
    }

    /// Create one item per `(name, row)` pair from each row's column fields.
    pub async fn create_board_rows<R: BoardRow>(
        &self,
        board_id: u64,
        rows: &[(String, R)],
    ) -> Result<IndexMap<String, Item>> {
        let items: Vec<Item> = rows
            .iter()
            .map(|(name, row)| Item::from_row(name.clone(), row))
            .collect();
        self.create_board_items(board_id, &items).await
    }

    /// Overwrite several columns of an existing item.
    #[instrument(skip(self, values), fields(columns = values.len()))]
    pub async fn update_board_item(
        &self,
        board_id: u64,
        item_id: &str,
        values: &[ColumnValue],
    ) -> Result<Item> {
        let variables = json!({
            "boardId": board_id.to_string(),
            "itemId": item_id,
            "columnValues": codec::to_column_values_json(values)?,
        });
        let response = self
            .transport
            .execute_mutation(query::CHANGE_MULTIPLE_COLUMN_VALUES, variables)
            .await?;
        let confirmed: ItemRef = mutation_result(response, "change_multiple_column_values")?;

        Ok(Item {
            id: Some(confirmed.id),
            name: confirmed.name,
            column_values: values.to_vec(),
            ..Default::default()
        })
    }

    /// Delete an item, returning the id the service confirmed.
    #[instrument(skip(self))]
    pub async fn delete_board_item(&self, item_id: &str) -> Result<String> {
        let response = self
            .transport
            .execute_mutation(query::DELETE_ITEM, json!({ "itemId": item_id }))
            .await?;
        let confirmed: ItemRef = mutation_result(response, "delete_item")?;
        Ok(confirmed.id)
    }

    async fn create_item(&self, variables: Value) -> Result<ItemRef> {
        let response = self
            .transport
            .execute_mutation(query::CREATE_ITEM, variables)
            .await?;
        mutation_result(response, "create_item")
    }
}

fn mutation_result<T: DeserializeOwned>(response: Value, field: &str) -> Result<T> {
    let mut data = query::response_data(response)?;
    match data.get_mut(field).map(Value::take) {
        Some(Value::Null) | None => Err(MondayError::unexpected(format!(
            "response has no {field}"
        ))),
        Some(value) => Ok(serde_json::from_value(value)?),
    }
}
