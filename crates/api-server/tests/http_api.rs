//! HTTP-level tests: the router is driven in-process, every upstream is a
//! wiremock server.

use api_server::{build_router, AppState, ServerConfig};
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use posture_engine::response::CRITICAL_ERROR_ANALYSIS;
use serde_json::{json, Value};
use std::collections::HashMap;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_app(server: &MockServer) -> Router {
    test_app_with(server, &[])
}

fn test_app_with(server: &MockServer, extra: &[(&str, &str)]) -> Router {
    let mut values: HashMap<String, String> = [
        ("DIRECTORY_BASE_URL", server.uri()),
        ("REASONING_BASE_URL", server.uri()),
        ("REASONING_API_KEY", "sk-test".to_string()),
        ("HEADLINES_BASE_URL", server.uri()),
        ("NEWS_API_KEY", "news-key".to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    values.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));

    let config = ServerConfig::from_map(&values).unwrap();
    build_router(AppState::from_config(&config))
}

async fn send(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<&str>,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, json)
}

fn france() -> Value {
    json!([{
        "cca2": "FR",
        "cca3": "FRA",
        "name": { "common": "France", "official": "French Republic" },
        "population": 67000000,
        "area": 551695.0,
        "borders": ["AND", "BEL", "DEU", "ITA", "LUX", "MCO", "ESP", "CHE"],
        "region": "Europe",
        "subregion": "Western Europe",
        "landlocked": false,
        "languages": { "fra": "French" },
        "currencies": { "EUR": { "name": "Euro", "symbol": "€" } }
    }])
}

#[tokio::test]
async fn analyze_returns_report_scores_and_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/name/France"))
        .and(query_param("fullText", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(france()))
        .expect(1)
        .mount(&server)
        .await;

    let (status, headers, body) =
        send(test_app(&server), "POST", "/analyze", Some(r#"{"country":"France"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scores"]["power"], "61.21");
    assert_eq!(body["scores"]["vulnerability"], "28.50");
    assert_eq!(body["scores"]["openness"], "90.00");
    assert_eq!(body["scores"]["regionalComplexity"], "40.00");
    assert_eq!(body["metadata"]["powerTier"], "MajorPower");
    assert_eq!(body["metadata"]["influenceBloc"], "EuropeanUnion");
    assert_eq!(body["metadata"]["marketAsset"], "euro sovereign bonds");
    assert_eq!(body["metadata"]["isFragile"], false);
    assert_eq!(body["metadata"]["isHub"], true);

    let analysis = body["analysis"].as_str().unwrap();
    assert!(analysis.contains("France (FRA)"));
    assert!(analysis.contains("CONTAGION ALERT"));

    assert!(headers.contains_key("x-request-id"));
    assert_eq!(headers["cache-control"], "no-store");
}

#[tokio::test]
async fn analyze_without_country_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(france()))
        .expect(0)
        .mount(&server)
        .await;

    for payload in [Some(r#"{"country":""}"#), Some(r#"{}"#), Some("not json"), None] {
        let (status, _, body) = send(test_app(&server), "POST", "/analyze", payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {:?}", payload);
        assert_eq!(body["error"], "target not identified");
        assert!(body["analysis"].is_string());
    }
}

#[tokio::test]
async fn analyze_empty_directory_match_is_link_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/name/Atlantis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let (status, _, body) =
        send(test_app(&server), "POST", "/analyze", Some(r#"{"country":"Atlantis"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "link failure");
    assert_eq!(body["analysis"], CRITICAL_ERROR_ANALYSIS);
    assert!(body.get("scores").is_none());
}

#[tokio::test]
async fn analyze_directory_error_status_is_link_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "status": 404, "message": "Not Found" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (status, _, body) =
        send(test_app(&server), "POST", "/analyze", Some(r#"{"country":"Nowhere"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "link failure");
    assert_eq!(body["analysis"], CRITICAL_ERROR_ANALYSIS);
}

#[tokio::test]
async fn analyze_malformed_record_is_link_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "population": 10 }])))
        .mount(&server)
        .await;

    let (status, _, body) =
        send(test_app(&server), "POST", "/analyze", Some(r#"{"country":"France"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "link failure");
}

#[tokio::test]
async fn analyze_other_methods_are_not_allowed() {
    let server = MockServer::start().await;
    for verb in ["GET", "PUT", "DELETE"] {
        let (status, _, body) = send(test_app(&server), verb, "/analyze", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "verb {}", verb);
        assert_eq!(body["error"], "method not allowed");
    }
}

#[tokio::test]
async fn reasoning_proxy_returns_upstream_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "Border tension remains elevated." } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (status, _, body) =
        send(test_app(&server), "POST", "/reasoning", Some(r#"{"country":"Armenia"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analysis"], "Border tension remains elevated.");
}

#[tokio::test]
async fn reasoning_proxy_maps_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let (status, _, body) =
        send(test_app(&server), "POST", "/reasoning", Some(r#"{"country":"Armenia"}"#)).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "reasoning service rate limit reached");
    assert!(body["analysis"].as_str().unwrap().starts_with("Analysis unavailable"));
}

#[tokio::test]
async fn reasoning_proxy_requires_country() {
    let server = MockServer::start().await;
    let (status, _, body) = send(test_app(&server), "POST", "/reasoning", Some("{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "target not identified");
}

#[tokio::test]
async fn headlines_proxy_passes_body_through() {
    let server = MockServer::start().await;
    let upstream = json!({ "status": "ok", "articles": [{ "title": "Ceasefire talks resume" }] });
    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .and(query_param("apiKey", "news-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream.clone()))
        .mount(&server)
        .await;

    let (status, _, body) = send(test_app(&server), "GET", "/headlines", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, upstream);

    let (status, _, body) = send(test_app(&server), "POST", "/headlines", Some("{}")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "method not allowed");
}

#[tokio::test]
async fn headlines_proxy_failure_returns_fixed_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (status, _, body) = send(test_app(&server), "GET", "/headlines", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "headline retrieval failed");
}

#[tokio::test]
async fn health_and_request_id_propagation() {
    let server = MockServer::start().await;
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-123")
        .body(Body::empty())
        .unwrap();

    let response = test_app(&server).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "trace-123");

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["formula"], "v6");
}

#[tokio::test]
async fn openapi_document_lists_routes() {
    let server = MockServer::start().await;
    let (status, _, body) = send(test_app(&server), "GET", "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/analyze"].is_object());
    assert!(body["paths"]["/reasoning"].is_object());
}

#[tokio::test]
async fn request_id_is_generated_when_absent() {
    let server = MockServer::start().await;
    let (_, headers, _) = send(test_app(&server), "GET", "/health", None).await;

    let id = headers["x-request-id"].to_str().unwrap();
    assert_eq!(id.len(), 36);
    assert_eq!(id.matches('-').count(), 4);

    let (_, first, _) = send(test_app(&server), "GET", "/health", None).await;
    assert_ne!(first["x-request-id"], headers["x-request-id"]);
}

#[tokio::test]
async fn request_id_is_echoed_on_rejection() {
    let server = MockServer::start().await;
    let request = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("x-request-id", "ops-7f3a")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"country":"  "}"#))
        .unwrap();

    let response = test_app(&server).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()["x-request-id"], "ops-7f3a");
}

#[tokio::test]
async fn security_headers_follow_hsts_flag() {
    let server = MockServer::start().await;

    let (_, headers, _) = send(test_app(&server), "GET", "/health", None).await;
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["referrer-policy"], "no-referrer");
    assert_eq!(headers["cache-control"], "no-store");
    assert!(headers["content-security-policy"]
        .to_str()
        .unwrap()
        .contains("frame-ancestors 'none'"));
    assert!(!headers.contains_key("strict-transport-security"));

    let hsts = test_app_with(&server, &[("ENABLE_HSTS", "true")]);
    let (_, headers, _) = send(hsts, "GET", "/health", None).await;
    assert!(headers["strict-transport-security"]
        .to_str()
        .unwrap()
        .starts_with("max-age="));
}
