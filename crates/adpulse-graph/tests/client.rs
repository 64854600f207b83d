//! Integration tests for `GraphClient` using wiremock HTTP mocks.

use adpulse_graph::{Credentials, GraphClient, GraphError, InsightsWindow};
use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// HMAC-SHA256("token-123") keyed by "shh", hex encoded.
const EXPECTED_PROOF: &str = "051742cd5680fbb970b64f4dfee4140ba90fdee0bbfe55f53739a67f880c87a3";

fn credentials() -> Credentials {
    Credentials {
        app_id: "42".to_owned(),
        app_secret: "shh".to_owned(),
        access_token: "token-123".to_owned(),
        ad_account_id: "act_1001".to_owned(),
    }
}

fn test_client(base_url: &str) -> GraphClient {
    GraphClient::with_base_url(&credentials(), 5, base_url, "v21.0")
        .expect("client construction should not fail")
}

#[tokio::test]
async fn get_account_info_returns_parsed_account() {
    let server = MockServer::start().await;

    let body = json!({
        "id": "act_1001",
        "name": "Acme Ads",
        "account_status": 1,
        "age": 412.5,
        "amount_spent": "1234567",
        "balance": "0",
        "business": { "id": "555", "name": "Acme Inc" },
        "currency": "USD",
        "timezone_name": "America/New_York"
    });

    Mock::given(method("GET"))
        .and(path("/v21.0/act_1001"))
        .and(query_param(
            "fields",
            "id,name,account_status,age,amount_spent,balance,business,currency,timezone_name",
        ))
        .and(query_param("access_token", "token-123"))
        .and(query_param("appsecret_proof", EXPECTED_PROOF))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let account = client
        .get_account_info()
        .await
        .expect("should parse account");

    assert_eq!(account.id, "act_1001");
    assert_eq!(account.name.as_deref(), Some("Acme Ads"));
    assert_eq!(account.account_status, Some(1));
    assert_eq!(account.currency.as_deref(), Some("USD"));
    assert_eq!(account.business.map(|b| b.id).as_deref(), Some("555"));
}

#[tokio::test]
async fn get_campaigns_follows_paging_next() {
    let server = MockServer::start().await;

    let next = format!(
        "{}/v21.0/act_1001/campaigns?limit=2&after=CURSOR2",
        server.uri()
    );

    Mock::given(method("GET"))
        .and(path("/v21.0/act_1001/campaigns"))
        .and(query_param_is_missing("after"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "c1", "name": "Spring", "status": "ACTIVE" },
                { "id": "c2", "name": "Summer", "status": "PAUSED" }
            ],
            "paging": { "cursors": { "before": "A", "after": "CURSOR2" }, "next": next }
        })))
        .expect(1)
        .mount(&server)
        .await;

    // The next link omits credentials; the client must add them back.
    Mock::given(method("GET"))
        .and(path("/v21.0/act_1001/campaigns"))
        .and(query_param("after", "CURSOR2"))
        .and(query_param("access_token", "token-123"))
        .and(query_param("appsecret_proof", EXPECTED_PROOF))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [ { "id": "c3", "name": "Autumn", "status": "ACTIVE" } ],
            "paging": { "cursors": { "before": "CURSOR2", "after": "END" } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri()).with_page_size(2);
    let campaigns = client
        .get_campaigns()
        .await
        .expect("should collect both pages");

    let ids: Vec<&str> = campaigns.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["c1", "c2", "c3"]);
}

#[tokio::test]
async fn empty_edge_returns_empty_vec() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v21.0/act_1001/customaudiences"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let audiences = client
        .get_custom_audiences()
        .await
        .expect("empty edge should be Ok");
    assert!(audiences.is_empty());
}

#[tokio::test]
async fn graph_error_envelope_becomes_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v21.0/act_1001/ads"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "message": "User request limit reached",
                "type": "OAuthException",
                "code": 17,
                "fbtrace_id": "Fb1"
            }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.get_ads().await.expect_err("should surface API error");

    match &err {
        GraphError::Api {
            code,
            kind,
            message,
            fbtrace_id,
        } => {
            assert_eq!(*code, 17);
            assert_eq!(kind, "OAuthException");
            assert_eq!(message, "User request limit reached");
            assert_eq!(fbtrace_id.as_deref(), Some("Fb1"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
    assert!(err.to_string().contains("User request limit reached"));
}

#[tokio::test]
async fn server_error_without_envelope_is_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v21.0/act_1001/adsets"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.get_ad_sets().await.expect_err("503 should fail");
    assert!(
        matches!(err, GraphError::UnexpectedStatus { status: 503, ref endpoint } if endpoint == "adsets"),
        "expected UnexpectedStatus(503), got: {err:?}"
    );
}

#[tokio::test]
async fn malformed_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v21.0/act_1001/adimages"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.get_ad_images().await.expect_err("HTML should fail");
    assert!(
        matches!(err, GraphError::Deserialize { .. }),
        "expected Deserialize, got: {err:?}"
    );
}

#[tokio::test]
async fn error_messages_never_contain_access_token() {
    // Nothing listens on port 1, so the request fails at connect time.
    let client = test_client("http://127.0.0.1:1");
    let err = client.get_campaigns().await.expect_err("connect should fail");
    assert!(matches!(err, GraphError::Http(_)));
    assert!(!err.to_string().contains("token-123"));
}

#[tokio::test]
async fn get_insights_sends_time_range_and_level() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v21.0/act_1001/insights"))
        .and(query_param(
            "time_range",
            r#"{"since":"2024-03-08","until":"2024-03-15"}"#,
        ))
        .and(query_param("level", "account"))
        .and(query_param(
            "fields",
            "impressions,clicks,spend,reach,frequency,ctr,cpm,cpp",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "impressions": "10500",
                "clicks": "321",
                "spend": "88.10",
                "reach": "9001",
                "date_start": "2024-03-08",
                "date_stop": "2024-03-15"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let now = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
    let client = test_client(&server.uri());
    let rows = client
        .get_insights(InsightsWindow::trailing(7, now))
        .await
        .expect("should parse insights");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].impressions.as_deref(), Some("10500"));
    assert_eq!(rows[0].date_start.as_deref(), Some("2024-03-08"));
}

#[tokio::test]
async fn endless_paging_hits_page_limit() {
    let server = MockServer::start().await;
    let next = format!("{}/v21.0/act_1001/ads?after=LOOP", server.uri());

    Mock::given(method("GET"))
        .and(path("/v21.0/act_1001/ads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [ { "id": "a1" } ],
            "paging": { "next": next }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.get_ads().await.expect_err("cycling cursor should stop");
    assert!(
        matches!(err, GraphError::PaginationLimit { max_pages: 200, .. }),
        "expected PaginationLimit, got: {err:?}"
    );
}

#[tokio::test]
async fn test_connection_reports_account_on_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v21.0/act_1001"))
        .and(query_param("fields", "id,name,account_status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "act_1001",
            "name": "Acme Ads",
            "account_status": 1
        })))
        .mount(&server)
        .await;

    let probe = test_client(&server.uri()).test_connection().await;
    assert!(probe.success);
    let account = probe.account.expect("account should be present");
    assert_eq!(account.id, "act_1001");
    assert_eq!(account.account_status, Some(1));
    assert!(probe.error.is_none());

    let json = serde_json::to_value(&test_client(&server.uri()).test_connection().await).unwrap();
    assert_eq!(json["account"]["accountStatus"], 1);
    assert!(json.get("error").is_none());
}

#[tokio::test]
async fn test_connection_reports_error_on_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v21.0/act_1001"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "message": "Invalid OAuth access token.",
                "type": "OAuthException",
                "code": 190
            }
        })))
        .mount(&server)
        .await;

    let probe = test_client(&server.uri()).test_connection().await;
    assert!(!probe.success);
    assert!(probe.account.is_none());
    assert!(probe
        .error
        .as_deref()
        .is_some_and(|e| e.contains("Invalid OAuth access token.")));
}
