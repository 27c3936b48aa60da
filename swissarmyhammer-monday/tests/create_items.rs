//! End-to-end writes over HTTP: bulk creation, updates and deletion.

use chrono::NaiveDate;
use serde_json::{json, Value};
use swissarmyhammer_monday::{
    BoardRow, ColumnDateTime, ColumnLongText, ColumnNumber, ColumnStatus, ColumnText, Group, Item,
    MondayClient, MondayConfig, MondayError,
};
use wiremock::matchers::{body_partial_json, body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Default, BoardRow)]
struct TaskRow {
    #[monday(column = "text0")]
    owner: Option<ColumnText>,
    #[monday(column = "numbers9")]
    estimate: Option<ColumnNumber>,
    #[monday(column = "status")]
    status: Option<ColumnStatus>,
}

fn client_for(server: &MockServer) -> MondayClient {
    let config = MondayConfig::builder()
        .endpoint(server.uri())
        .token("integration-token")
        .create_concurrency(2)
        .max_retries(0)
        .build();
    MondayClient::new(&config).unwrap()
}

async fn mount_created(server: &MockServer, name: &str, id: &str) {
    Mock::given(method("POST"))
        .and(body_string_contains("create_item"))
        .and(body_partial_json(json!({"variables": {"itemName": name}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"create_item": {"id": id, "name": name}}
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn posted_variables(requests: &[wiremock::Request]) -> Vec<Value> {
    requests
        .iter()
        .map(|request| {
            let body: Value = serde_json::from_slice(&request.body).unwrap();
            body["variables"].clone()
        })
        .collect()
}

#[tokio::test]
async fn creates_two_items_with_matching_names() {
    let server = MockServer::start().await;
    mount_created(&server, "Test Item 1", "9001").await;
    mount_created(&server, "Test Item 2", "9002").await;

    let items = vec![
        Item::new("Test Item 1")
            .with_column(ColumnDateTime::new(
                "date",
                NaiveDate::from_ymd_opt(2023, 11, 29).unwrap(),
            ))
            .with_column(ColumnText::new("text0", "Andrew Eberle"))
            .with_column(ColumnLongText::new("long_text", "hello,world!\n")),
        Item::new("Test Item 2").with_group(Group::new("topics")),
    ];

    let client = client_for(&server);
    let created = client.create_board_items(1234, &items).await.unwrap();

    assert_eq!(created.len(), 2);
    assert_eq!(created["9001"].name, "Test Item 1");
    assert_eq!(created["9002"].name, "Test Item 2");
    assert_eq!(created["9002"].group.as_ref().unwrap().id, "topics");

    let requests = server.received_requests().await.unwrap();
    let variables = posted_variables(&requests);
    let first = variables
        .iter()
        .find(|v| v["itemName"] == "Test Item 1")
        .unwrap();
    assert_eq!(first["boardId"], "1234");
    let columns: Value = serde_json::from_str(first["columnValues"].as_str().unwrap()).unwrap();
    assert_eq!(
        columns,
        json!({
            "date": {"date": "2023-11-29"},
            "text0": "Andrew Eberle",
            "long_text": {"text": "hello,world!"}
        })
    );
}

#[tokio::test]
async fn creates_items_from_rows() {
    let server = MockServer::start().await;
    mount_created(&server, "Estimate", "500").await;

    let row = TaskRow {
        owner: Some(ColumnText::new("text0", "Andrew Eberle")),
        estimate: Some(ColumnNumber::new("numbers9", 10)),
        status: None,
    };

    let client = client_for(&server);
    let created = client
        .create_board_rows(1234, &[("Estimate".to_string(), row)])
        .await
        .unwrap();
    assert_eq!(created.len(), 1);

    let requests = server.received_requests().await.unwrap();
    let variables = posted_variables(&requests);
    let columns: Value =
        serde_json::from_str(variables[0]["columnValues"].as_str().unwrap()).unwrap();
    assert_eq!(columns, json!({"text0": "Andrew Eberle", "numbers9": "10"}));
}

#[tokio::test]
async fn missing_confirmation_is_partial_creation() {
    let server = MockServer::start().await;
    mount_created(&server, "Test Item 1", "9001").await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"variables": {"itemName": "Test Item 2"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"create_item": null},
            "errors": [{"message": "Column value not valid"}]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let items = vec![Item::new("Test Item 1"), Item::new("Test Item 2")];
    match client.create_board_items(1234, &items).await {
        Err(MondayError::PartialCreation { missing }) => assert_eq!(missing, vec!["Test Item 2"]),
        other => panic!("expected partial creation, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_aborts_creation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .create_board_items(1234, &[Item::new("Test Item 1")])
        .await
        .unwrap_err();
    assert!(matches!(err, MondayError::Transport(_)));
}

#[tokio::test]
async fn updates_and_deletes_an_item() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("change_multiple_column_values"))
        .and(body_partial_json(json!({"variables": {"boardId": "1234", "itemId": "9001"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"change_multiple_column_values": {"id": "9001", "name": "Test Item 1"}}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("delete_item"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"delete_item": {"id": "9001"}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let updated = client
        .update_board_item(1234, "9001", &[ColumnStatus::new("status", "Done").into()])
        .await
        .unwrap();
    assert_eq!(updated.id.as_deref(), Some("9001"));
    assert_eq!(updated.name, "Test Item 1");

    let deleted = client.delete_board_item("9001").await.unwrap();
    assert_eq!(deleted, "9001");

    let requests = server.received_requests().await.unwrap();
    let variables = posted_variables(&requests);
    let columns: Value =
        serde_json::from_str(variables[0]["columnValues"].as_str().unwrap()).unwrap();
    assert_eq!(columns, json!({"status": {"label": "Done"}}));
}
