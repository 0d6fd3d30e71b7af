use std::collections::HashMap;

use axum::{
    extract::{Query, RawQuery},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use prefpop::proxy::forward;
use prefpop::{fetch_all, Category, PopulationSource, PrefPopError, ResasClient, ResasConfig};

const KEY: &str = "test-key";

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("x-api-key").and_then(|v| v.to_str().ok()) == Some(KEY)
}

fn forbidden() -> axum::response::Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({"statusCode": "403", "message": "Forbidden.", "description": ""})),
    )
        .into_response()
}

fn fixture(body: &str) -> Value {
    serde_json::from_str(body).expect("fixture json")
}

async fn prefectures(headers: HeaderMap) -> axum::response::Response {
    if !authorized(&headers) {
        return forbidden();
    }
    Json(fixture(include_str!("fixtures/prefectures.json"))).into_response()
}

async fn composition(headers: HeaderMap, Query(q): Query<HashMap<String, String>>) -> axum::response::Response {
    if !authorized(&headers) {
        return forbidden();
    }
    if q.get("cityCode").map(String::as_str) != Some("-") {
        return (StatusCode::BAD_REQUEST, Json(json!({"message": "cityCode required"}))).into_response();
    }
    let body = match q.get("prefCode").map(String::as_str) {
        Some("1") => include_str!("fixtures/composition_1.json"),
        Some("13") => include_str!("fixtures/composition_13.json"),
        Some("5") => include_str!("fixtures/composition_no_elderly.json"),
        Some("7") => r#"{"message": null, "result": null}"#,
        _ => {
            return (StatusCode::BAD_REQUEST, Json(json!({"message": "unknown prefCode"})))
                .into_response()
        }
    };
    Json(fixture(body)).into_response()
}

async fn echo(headers: HeaderMap, RawQuery(q): RawQuery) -> impl IntoResponse {
    Json(json!({
        "query": q,
        "key": headers.get("x-api-key").and_then(|v| v.to_str().ok()),
    }))
}

async fn spawn_upstream() -> String {
    let app = Router::new()
        .route("/api/v1/prefectures", get(prefectures))
        .route("/api/v1/population/composition/perYear", get(composition))
        .route("/api/v1/echo/deep/path", get(echo))
        .route("/api/v1/plain", get(|| async { "plain text" }))
        .route("/api/v1/plain-root/prefectures", get(|| async { "plain text" }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake upstream");
    });
    format!("http://{}/api/v1", addr)
}

fn client(base: &str, key: &str) -> ResasClient {
    ResasClient::new(&ResasConfig::new(key, base).expect("config")).expect("client")
}

#[tokio::test]
async fn fetches_prefecture_list() {
    let base = spawn_upstream().await;
    let prefs = client(&base, KEY).prefectures().await.expect("prefectures");
    assert_eq!(prefs.len(), 3);
    assert_eq!(prefs[0].code, 1);
    assert_eq!(prefs[0].name, "北海道");
}

#[tokio::test]
async fn fetches_and_normalizes_composition() {
    let base = spawn_upstream().await;
    let records = client(&base, KEY).composition(1).await.expect("composition");
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].year, 2000);
    assert_eq!(records[0].total, 5683062.0);
    assert_eq!(records[2].elderly, 1358068.0);
}

#[tokio::test]
async fn missing_elderly_label_fails_that_prefecture() {
    let base = spawn_upstream().await;
    let err = client(&base, KEY).composition(5).await.unwrap_err();
    match err {
        PrefPopError::IncompleteData(missing) => assert_eq!(missing, vec![Category::Elderly]),
        other => panic!("expected IncompleteData, got {:?}", other),
    }
}

#[tokio::test]
async fn null_result_is_a_format_error() {
    let base = spawn_upstream().await;
    let err = client(&base, KEY).composition(7).await.unwrap_err();
    assert!(matches!(err, PrefPopError::UpstreamFormat(_)), "{:?}", err);
}

#[tokio::test]
async fn wrong_key_surfaces_upstream_status_and_message() {
    let base = spawn_upstream().await;
    let err = client(&base, "wrong-key").prefectures().await.unwrap_err();
    assert_eq!(err.transport_status(), Some(403));
    assert_eq!(err.to_string(), "Error 403: Forbidden.");
}

#[tokio::test]
async fn unreachable_upstream_has_no_status() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = client(&format!("http://{}/api/v1", addr), KEY)
        .prefectures()
        .await
        .unwrap_err();
    assert!(matches!(err, PrefPopError::Transport { status: None, .. }), "{:?}", err);
    assert!(err.to_string().starts_with("network error:"));
}

#[tokio::test]
async fn fetch_all_keeps_order_and_fails_fast() {
    let base = spawn_upstream().await;
    let c = client(&base, KEY);

    let batch = fetch_all(&c, &[13, 1]).await.expect("batch");
    assert_eq!(batch.iter().map(|p| p.code).collect::<Vec<_>>(), vec![13, 1]);
    assert_eq!(batch[0].records.len(), 2);
    // short young series in the Tokyo fixture
    assert_eq!(batch[0].records[1].young, 0.0);

    let err = fetch_all(&c, &[1, 5, 13]).await.unwrap_err();
    assert!(matches!(err, PrefPopError::IncompleteData(_)));
}

#[tokio::test]
async fn proxy_forwards_path_query_and_key() {
    let base = spawn_upstream().await;
    let c = client(&base, KEY);

    let reply = forward(&c, "echo/deep/path", Some("prefCode=13&cityCode=-&x=%E6%9D%B1")).await;
    assert_eq!(reply.status, 200);
    assert_eq!(reply.content_type, "application/json");
    let body = reply.json().expect("json body");
    assert_eq!(body["query"], "prefCode=13&cityCode=-&x=%E6%9D%B1");
    assert_eq!(body["key"], KEY);
}

#[tokio::test]
async fn proxy_passes_non_json_bodies_through_unchanged() {
    let base = spawn_upstream().await;
    let reply = forward(&client(&base, KEY), "plain", None).await;
    assert_eq!(reply.status, 200);
    assert!(reply.content_type.starts_with("text/plain"), "{}", reply.content_type);
    assert_eq!(reply.body, b"plain text".to_vec());
}

#[tokio::test]
async fn proxy_refuses_paths_leaving_the_base() {
    let base = spawn_upstream().await;
    let reply = forward(&client(&base, KEY), "../v1/echo/deep/path", None).await;
    assert_eq!(reply.status, 400);
    let body = reply.json().expect("json body");
    assert_eq!(body["statusCode"], 400);
    assert!(body["errorData"].is_null());
}

#[tokio::test]
async fn proxy_normalizes_upstream_failures() {
    let base = spawn_upstream().await;

    let reply = forward(&client(&base, "wrong-key"), "prefectures", None).await;
    assert_eq!(reply.status, 403);
    let body = reply.json().expect("json body");
    assert_eq!(body["statusCode"], 403);
    assert_eq!(body["message"], "Error 403: Forbidden.");
    assert_eq!(body["errorData"]["message"], "Forbidden.");

    let reply = forward(&client(&base, KEY), "no/such/route", None).await;
    assert_eq!(reply.status, 404);
    assert!(reply.json().expect("json body")["errorData"].is_null());
}

#[tokio::test]
async fn non_json_success_is_a_format_error_for_typed_calls() {
    let base = spawn_upstream().await;
    let c = client(&format!("{}/plain-root", base), KEY);
    let err = c.prefectures().await.unwrap_err();
    assert!(matches!(err, PrefPopError::UpstreamFormat(_)), "{:?}", err);
}
