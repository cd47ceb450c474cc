//! Recording HTTP peer used by the friendly-curl integration tests.
//!
//! # Design
//! Every request is appended to a shared `RequestLog` before the handler
//! answers, so a test can assert on exactly what libcurl put on the wire
//! (method, path with query, headers, body) without parsing server output.
//! Routes are fixed and deterministic; anything unknown falls through to an
//! echo handler that answers `200` with a one-line HTML body.

use std::{sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderName, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Body returned by the echo handler.
pub const TEST_LINE: &str = "This is a test line.\n";

/// One request as seen by the server.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordedRequest {
    pub id: Uuid,
    pub method: String,
    /// Path including the query string, e.g. `/index.html?foo=bar`.
    pub path: String,
    /// Header names are lower-cased by the HTTP stack.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    /// First value of `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub type RequestLog = Arc<RwLock<Vec<RecordedRequest>>>;

pub fn request_log() -> RequestLog {
    Arc::new(RwLock::new(Vec::new()))
}

pub fn app(log: RequestLog) -> Router {
    Router::new()
        .route("/__requests", get(list_requests))
        .route("/status/{code}", any(status))
        .route("/redirect", any(redirect))
        .route("/landing", any(landing))
        .route("/slow/{ms}", any(slow))
        .fallback(echo)
        .with_state(log)
}

pub async fn run(listener: TcpListener, log: RequestLog) -> Result<(), std::io::Error> {
    axum::serve(listener, app(log)).await
}

async fn record(log: &RequestLog, method: &Method, uri: &Uri, headers: &HeaderMap, body: &Bytes) -> Uuid {
    let id = Uuid::new_v4();
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    let entry = RecordedRequest {
        id,
        method: method.as_str().to_string(),
        path,
        headers: headers
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect(),
        body: String::from_utf8_lossy(body).into_owned(),
    };
    log.write().await.push(entry);
    id
}

async fn list_requests(State(log): State<RequestLog>) -> Json<Vec<RecordedRequest>> {
    Json(log.read().await.clone())
}

async fn echo(
    State(log): State<RequestLog>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let id = record(&log, &method, &uri, &headers, &body).await;
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/html".to_string()),
            (HeaderName::from_static("x-request-id"), id.to_string()),
        ],
        TEST_LINE,
    )
        .into_response()
}

/// Answers with the status named in the path and a small HTML error page.
async fn status(
    State(log): State<RequestLog>,
    Path(code): Path<u16>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&log, &method, &uri, &headers, &body).await;
    let Ok(status) = StatusCode::from_u16(code) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let page = format!(
        "<html><head><title>Error response</title></head>\n<body>\n<h1>Error response</h1>\n<p>Error code {code}.</p>\n</body></html>\n"
    );
    (status, [(header::CONTENT_TYPE, "text/html")], page).into_response()
}

async fn redirect(
    State(log): State<RequestLog>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&log, &method, &uri, &headers, &body).await;
    (StatusCode::FOUND, [(header::LOCATION, "/landing")]).into_response()
}

async fn landing(
    State(log): State<RequestLog>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&log, &method, &uri, &headers, &body).await;
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain")], "landed").into_response()
}

async fn slow(
    State(log): State<RequestLog>,
    Path(ms): Path<u64>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&log, &method, &uri, &headers, &body).await;
    tokio::time::sleep(Duration::from_millis(ms)).await;
    (StatusCode::OK, "slow done").into_response()
}
