//! GraphQL documents sent to the service.
//!
//! Queries are rendered as text because the query transport takes no
//! variables; every caller-supplied string is embedded through JSON string
//! encoding, which is a valid GraphQL string literal. Mutations use
//! variables.

use crate::columns::ColumnValue;
use crate::error::{MondayError, Result};
use crate::types::ItemFields;
use serde_json::Value;

/// Create one item. Variables: `boardId`, `itemName`, `columnValues`, `groupId`.
pub const CREATE_ITEM: &str = "mutation ($boardId: ID!, $itemName: String!, $columnValues: JSON, $groupId: String) { create_item(board_id: $boardId, item_name: $itemName, column_values: $columnValues, group_id: $groupId) { id name } }";

/// Change several columns of one item. Variables: `boardId`, `itemId`, `columnValues`.
pub const CHANGE_MULTIPLE_COLUMN_VALUES: &str = "mutation ($boardId: ID!, $itemId: ID!, $columnValues: JSON!) { change_multiple_column_values(board_id: $boardId, item_id: $itemId, column_values: $columnValues) { id name } }";

/// Delete one item. Variables: `itemId`.
pub const DELETE_ITEM: &str = "mutation ($itemId: ID!) { delete_item(item_id: $itemId) { id } }";

/// One equality rule of an items-page filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRule {
    pub column_id: String,
    pub compare_value: String,
}

/// One rule per filter value, comparing the column against the value's text.
pub fn filter_rules(filter: &[ColumnValue]) -> Vec<FilterRule> {
    filter
        .iter()
        .map(|value| FilterRule {
            column_id: value.id().to_string(),
            compare_value: value.display_text(),
        })
        .collect()
}

fn literal(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

fn render_rules(rules: &[FilterRule]) -> String {
    let rendered: Vec<String> = rules
        .iter()
        .map(|rule| {
            format!(
                "{{column_id: {}, compare_value: [{}], operator: any_of}}",
                literal(&rule.column_id),
                literal(&rule.compare_value)
            )
        })
        .collect();
    format!("{{rules: [{}], operator: and}}", rendered.join(", "))
}

/// Selection set for one item.
pub fn item_selection(fields: ItemFields) -> String {
    let mut selection = String::from("id name column_values { id text value type }");
    if fields.group {
        selection.push_str(" group { id title color }");
    }
    if fields.assets {
        selection
            .push_str(" assets { id name url public_url file_extension file_size created_at }");
    }
    if fields.updates {
        selection.push_str(" updates { id body text_body creator_id created_at updated_at }");
    }
    selection
}

/// First page of a board's items, optionally filtered.
pub fn items_page_query(
    board_id: u64,
    limit: u32,
    rules: &[FilterRule],
    fields: ItemFields,
) -> String {
    let query_params = if rules.is_empty() {
        String::new()
    } else {
        format!(", query_params: {}", render_rules(rules))
    };
    format!(
        "query {{ boards(ids: [{board_id}]) {{ items_page(limit: {limit}{query_params}) {{ cursor items {{ {} }} }} }} }}",
        item_selection(fields)
    )
}

/// Page following `cursor`.
pub fn next_items_page_query(cursor: &str, limit: u32, fields: ItemFields) -> String {
    format!(
        "query {{ next_items_page(limit: {limit}, cursor: {}) {{ cursor items {{ {} }} }} }}",
        literal(cursor),
        item_selection(fields)
    )
}

/// Unwrap the `data` member of a GraphQL response.
///
/// A non-empty `errors` array (or the legacy top-level `error_message`) fails
/// with [`MondayError::GraphQl`] even when the HTTP status was a success.
pub(crate) fn response_data(mut response: Value) -> Result<Value> {
    if let Some(errors) = response.get("errors").and_then(Value::as_array) {
        if !errors.is_empty() {
            let messages = errors
                .iter()
                .map(|error| match error.get("message").and_then(Value::as_str) {
                    Some(message) => message.to_string(),
                    None => error.to_string(),
                })
                .collect();
            return Err(MondayError::GraphQl { messages });
        }
    }
    if let Some(message) = response.get("error_message").and_then(Value::as_str) {
        return Err(MondayError::GraphQl {
            messages: vec![message.to_string()],
        });
    }
    match response.get_mut("data").map(Value::take) {
        Some(Value::Null) | None => Err(MondayError::unexpected("response has no data")),
        Some(data) => Ok(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{ColumnNumber, ColumnText};
    use serde_json::json;

    #[test]
    fn filter_rules_match_inputs_one_to_one() {
        let rules = filter_rules(&[
            ColumnText::new("text0", "123").into(),
            ColumnNumber::new("numbers9", 1).into(),
        ]);
        assert_eq!(
            rules,
            vec![
                FilterRule {
                    column_id: "text0".into(),
                    compare_value: "123".into()
                },
                FilterRule {
                    column_id: "numbers9".into(),
                    compare_value: "1".into()
                },
            ]
        );
    }

    #[test]
    fn first_page_query_embeds_rules() {
        let rules = filter_rules(&[ColumnText::new("text0", "say \"hi\"").into()]);
        let query = items_page_query(42, 50, &rules, ItemFields::NONE);
        assert!(query.contains("boards(ids: [42])"));
        assert!(query.contains("items_page(limit: 50, query_params:"));
        assert!(query.contains(r#"{column_id: "text0", compare_value: ["say \"hi\""], operator: any_of}"#));
        assert!(!query.contains("group {"));
    }

    #[test]
    fn unfiltered_query_has_no_query_params() {
        let query = items_page_query(42, 50, &[], ItemFields::NONE);
        assert!(!query.contains("query_params"));
    }

    #[test]
    fn selection_follows_requested_fields() {
        let selection = item_selection(ItemFields {
            group: true,
            assets: false,
            updates: true,
        });
        assert!(selection.contains("group { id title color }"));
        assert!(!selection.contains("assets"));
        assert!(selection.contains("updates {"));
    }

    #[test]
    fn next_page_query_quotes_cursor() {
        let query = next_items_page_query("MSw5NzI4MDA5MDAsaV9YcmxJb0", 25, ItemFields::ALL);
        assert!(query.contains(r#"next_items_page(limit: 25, cursor: "MSw5NzI4MDA5MDAsaV9YcmxJb0")"#));
        assert!(query.contains("assets {"));
    }

    #[test]
    fn response_data_surfaces_graphql_errors() {
        let err = response_data(json!({
            "errors": [{"message": "Column not found"}, {"message": "Board not found"}],
            "data": null
        }))
        .unwrap_err();
        match err {
            MondayError::GraphQl { messages } => {
                assert_eq!(messages, vec!["Column not found", "Board not found"])
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = response_data(json!({"error_message": "Rate limit", "status_code": 429}));
        assert!(matches!(err, Err(MondayError::GraphQl { .. })));
    }

    #[test]
    fn response_data_requires_data() {
        assert!(matches!(
            response_data(json!({})),
            Err(MondayError::UnexpectedResponse { .. })
        ));
        let data = response_data(json!({"data": {"me": 1}, "errors": []})).unwrap();
        assert_eq!(data, json!({"me": 1}));
    }
}
