use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, RecordedRequest};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- echo ---

#[tokio::test]
async fn echo_returns_request_details() {
    let resp = app()
        .oneshot(json_request("POST", "/echo?q=1", r#"{"a":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echoed: RecordedRequest = body_json(resp).await;
    assert_eq!(echoed.method, "POST");
    assert_eq!(echoed.path, "/echo");
    assert_eq!(echoed.query.as_deref(), Some("q=1"));
    assert_eq!(echoed.headers["content-type"], "application/json");
    assert_eq!(echoed.body, r#"{"a":1}"#);
}

#[tokio::test]
async fn echo_accepts_any_method() {
    let resp = app()
        .oneshot(json_request("PATCH", "/echo", "x"))
        .await
        .unwrap();
    let echoed: RecordedRequest = body_json(resp).await;
    assert_eq!(echoed.method, "PATCH");
}

// --- header-checked item ---

#[tokio::test]
async fn item_requires_both_headers() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/x/42")
                .header("A", "1")
                .header("B", "2")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["id"], "42");
}

#[tokio::test]
async fn item_without_headers_returns_400() {
    let resp = app().oneshot(get("/x/42")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- status ---

#[tokio::test]
async fn status_route_returns_requested_code() {
    let resp = app().oneshot(get("/status/404")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["msg"], "nf");

    let resp = app().oneshot(get("/status/503")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn status_route_rejects_invalid_code() {
    let resp = app().oneshot(get("/status/99")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app().oneshot(get("/status/abc")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- text ---

#[tokio::test]
async fn text_route_is_plain_text() {
    let resp = app().oneshot(get("/text")).await.unwrap();
    assert_eq!(resp.headers()[http::header::CONTENT_TYPE], "text/plain");
    assert_eq!(body_bytes(resp).await, "plain body");
}

// --- binary ---

#[tokio::test]
async fn binary_route_serves_invalid_utf8() {
    let resp = app().oneshot(get("/binary/500")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = body_bytes(resp).await;
    assert_eq!(&bytes[..], &[0xff, 0xfe, 0x00, 0x01]);
    assert!(std::str::from_utf8(&bytes).is_err());
}

// --- request log ---

#[tokio::test]
async fn request_log_records_in_order() {
    use tower::Service;

    let mut app = app().into_service();

    for uri in ["/echo", "/status/201", "/x/7"] {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(get(uri))
            .await
            .unwrap();
        assert!(resp.status().is_success() || resp.status() == StatusCode::BAD_REQUEST);
    }

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/requests"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let log: Vec<RecordedRequest> = body_json(resp).await;
    let paths: Vec<&str> = log.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["/echo", "/status/201", "/x/7"]);
}
