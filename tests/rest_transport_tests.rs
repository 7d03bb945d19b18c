//! Integration tests for the REST transport against a mock server.
//!
//! These tests verify token placement, envelope decoding, pagination
//! parameters, write payloads and error mapping over real HTTP.

use pipedrive_api::{
    ApiToken, Endpoint, HttpError, PipedriveClient, PipedriveConfig, QueryParams, ResourceError,
    ResourceKind, RestTransport, Transport,
};
use serde_json::{json, Map};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, page_size: Option<u32>) -> PipedriveConfig {
    let mut builder = PipedriveConfig::builder()
        .api_token(ApiToken::new("secret-token").unwrap())
        .endpoint(Endpoint::new(server.uri()).unwrap());
    if let Some(size) = page_size {
        builder = builder.page_size(size);
    }
    builder.build().unwrap()
}

#[tokio::test]
async fn test_fetch_sends_token_and_redacts_it_from_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/deals/42"))
        .and(query_param("api_token", "secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"id": 42, "title": "Big deal"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let transport = RestTransport::new(&config_for(&server, None)).unwrap();

    let (data, url) = transport.fetch("deals", Some(42)).await.unwrap();

    assert_eq!(data["title"], "Big deal");
    assert!(url.ends_with("/deals/42"));
    assert!(!url.contains("secret-token"));
}

#[tokio::test]
async fn test_fetch_decodes_failure_envelope_on_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/deals/9"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "error": "Deal not found"
        })))
        .mount(&server)
        .await;
    let transport = RestTransport::new(&config_for(&server, None)).unwrap();

    let result = transport.fetch("deals", Some(9)).await;

    match result {
        Err(ResourceError::Remote { message, url }) => {
            assert_eq!(message, "Deal not found");
            assert!(url.contains("/deals/9"));
        }
        other => panic!("expected remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_without_success_key_is_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/persons/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": 1}})))
        .mount(&server)
        .await;
    let transport = RestTransport::new(&config_for(&server, None)).unwrap();

    assert!(matches!(
        transport.fetch("persons", Some(1)).await,
        Err(ResourceError::Protocol { .. })
    ));
}

#[tokio::test]
async fn test_list_sends_cursor_limit_and_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/deals"))
        .and(query_param("start", "100"))
        .and(query_param("limit", "50"))
        .and(query_param("status", "open"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{"id": 101}, {"id": 102}],
            "additional_data": {
                "pagination": {"start": 100, "limit": 50, "more_items_in_collection": true, "next_start": 150}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    let transport = RestTransport::new(&config_for(&server, Some(50))).unwrap();
    let mut params = QueryParams::new();
    params.insert("status".to_string(), "open".to_string());

    let page = transport.list("deals", &params, 100).await.unwrap();

    assert_eq!(page.items.len(), 2);
    assert!(page.more_items);
    assert_eq!(page.next_start, Some(150));
}

#[tokio::test]
async fn test_list_keeps_caller_limit_over_page_size() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/persons"))
        .and(query_param("start", "0"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{"id": 1}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let transport = RestTransport::new(&config_for(&server, Some(50))).unwrap();
    let mut params = QueryParams::new();
    params.insert("limit".to_string(), "10".to_string());

    let page = transport.list("persons", &params, 0).await.unwrap();

    assert_eq!(page.items.len(), 1);
    assert!(!page.more_items);
}

#[tokio::test]
async fn test_update_puts_partial_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/deals/42"))
        .and(body_json(json!({"title": "Renamed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"id": 42, "title": "Renamed"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let transport = RestTransport::new(&config_for(&server, None)).unwrap();
    let mut fields = Map::new();
    fields.insert("title".to_string(), json!("Renamed"));

    let echoed = transport.update("deals", 42, fields).await.unwrap();

    assert_eq!(echoed, Some(json!({"id": 42, "title": "Renamed"})));
}

#[tokio::test]
async fn test_update_error_status_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/deals/42"))
        .respond_with(
            ResponseTemplate::new(400)
                .insert_header("x-request-id", "req-77")
                .set_body_json(json!({"success": false, "error": "Bad value"})),
        )
        .mount(&server)
        .await;
    let transport = RestTransport::new(&config_for(&server, None)).unwrap();
    let mut fields = Map::new();
    fields.insert("value".to_string(), json!("abc"));

    let error = transport.update("deals", 42, fields).await.unwrap_err();

    assert!(matches!(error, ResourceError::Http(HttpError::Response(_))));
    assert_eq!(error.request_id(), Some("req-77"));
    assert!(error.to_string().contains("Bad value"));
}

#[tokio::test]
async fn test_merge_puts_target_id() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/persons/5/merge"))
        .and(body_json(json!({"merge_with_id": 6})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"id": 6}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let transport = RestTransport::new(&config_for(&server, None)).unwrap();

    transport.merge("persons", 5, 6).await.unwrap();
}

#[tokio::test]
async fn test_field_definitions_are_deserialized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dealFields"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                {"id": 1, "key": "title", "name": "Title", "field_type": "varchar", "edit_flag": false},
                {"id": 2, "key": "0123456789abcdef0123456789abcdef01234567", "name": "Lead Score",
                 "field_type": "double", "options": null}
            ]
        })))
        .mount(&server)
        .await;
    let transport = RestTransport::new(&config_for(&server, None)).unwrap();

    let defs = transport.load_field_defs("dealFields").await.unwrap();

    assert_eq!(defs.len(), 2);
    assert!(!defs[0].edit_flag);
    assert!(defs[1].edit_flag);
    assert!(defs[1].is_custom());
}

#[tokio::test]
async fn test_non_list_field_definitions_are_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/personFields"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": null
        })))
        .mount(&server)
        .await;
    let transport = RestTransport::new(&config_for(&server, None)).unwrap();

    assert!(matches!(
        transport.load_field_defs("personFields").await,
        Err(ResourceError::Protocol { .. })
    ));
}

#[tokio::test]
async fn test_client_end_to_end_read_modify_save() {
    let server = MockServer::start().await;
    let score_key = "f".repeat(40);
    Mock::given(method("GET"))
        .and(path("/dealFields"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                {"key": "title", "name": "Title", "field_type": "varchar"},
                {"key": &score_key, "name": "Lead Score", "field_type": "double"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/deals/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"id": 42, "title": "Big deal", score_key.clone(): 10}
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/deals/42"))
        .and(body_json(json!({score_key.clone(): 90})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"id": 42}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let client = PipedriveClient::new(&config_for(&server, None)).unwrap();
    let mut deal = client.entity(ResourceKind::Deal, 42);

    assert_eq!(deal.get_value("lead_score").await.unwrap(), json!(10));
    assert!(deal.set("lead_score", 90).await.unwrap());
    deal.save().await.unwrap();

    assert!(!deal.is_dirty());
    assert!(!deal.is_loaded());
}
