use std::{collections::BTreeMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// A request as seen by the server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordedRequest {
    pub id: Uuid,
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub type Log = Arc<RwLock<Vec<RecordedRequest>>>;

pub fn app() -> Router {
    let log: Log = Arc::new(RwLock::new(Vec::new()));
    Router::new()
        .route("/echo", any(echo))
        .route("/x/{id}", get(item))
        .route("/status/{code}", any(status))
        .route("/text", get(text))
        .route("/binary/{code}", get(binary))
        .route("/slow", get(slow))
        .route("/requests", get(list_requests))
        .with_state(log)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn record(log: &Log, method: Method, uri: &Uri, headers: &HeaderMap, body: String) -> RecordedRequest {
    let request = RecordedRequest {
        id: Uuid::new_v4(),
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers: headers
            .iter()
            .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
            .collect(),
        body,
    };
    tracing::debug!(id = %request.id, method = %request.method, path = %request.path, "recorded request");
    log.write().await.push(request.clone());
    request
}

async fn echo(
    State(log): State<Log>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Json<RecordedRequest> {
    Json(record(&log, method, &uri, &headers, body).await)
}

/// Answers `{"ok":true}` only when headers `a: 1` and `b: 2` are present.
async fn item(
    State(log): State<Log>,
    Path(id): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> (StatusCode, Json<serde_json::Value>) {
    record(&log, method, &uri, &headers, String::new()).await;
    let has = |name: &str, expected: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value == expected)
    };
    if has("a", "1") && has("b", "2") {
        (StatusCode::OK, Json(json!({"ok": true, "id": id})))
    } else {
        (StatusCode::BAD_REQUEST, Json(json!({"msg": "missing headers"})))
    }
}

async fn status(
    State(log): State<Log>,
    Path(code): Path<u16>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Result<(StatusCode, Json<serde_json::Value>), StatusCode> {
    record(&log, method, &uri, &headers, body).await;
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    let msg = match status {
        StatusCode::NOT_FOUND => "nf".to_string(),
        other => other.canonical_reason().unwrap_or("status").to_string(),
    };
    Ok((status, Json(json!({"msg": msg}))))
}

async fn text() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], "plain body")
}

/// Answers with status `code` and a body that is not valid UTF-8.
async fn binary(Path(code): Path<u16>) -> Result<(StatusCode, Vec<u8>), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, vec![0xff, 0xfe, 0x00, 0x01]))
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(2)).await;
    "late"
}

async fn list_requests(State(log): State<Log>) -> Json<Vec<RecordedRequest>> {
    Json(log.read().await.clone())
}
