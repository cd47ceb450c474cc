//! `FriendlyCurl` against the live mock server.
//!
//! Each test starts its own server on a random port and asserts both on what
//! the client returned and on what the server recorded.

mod common;

use std::io::{self, Read, Write};

use friendly_curl::{url_parameters, ClientConfig, CurlError, FriendlyCurl, RequestOptions, Upload};
use mock_server::TEST_LINE;

fn opts() -> RequestOptions {
    RequestOptions::new()
}

// --- GET ---

#[test]
fn successful_get() {
    let server = common::start();
    let mut curl = FriendlyCurl::new();

    let response = curl.get_url(&server.url("/index.html?foo=bar"), &opts()).unwrap();
    assert_eq!(response.status(), 200, "unexpected HTTP status");
    assert_eq!(response.header("content-type"), Some("text/html"));
    assert_eq!(response.body, TEST_LINE.as_bytes());

    let seen = server.last();
    assert_eq!(seen.method, "GET");
    assert_eq!(seen.path, "/index.html?foo=bar");
    assert_eq!(response.header("x-request-id"), Some(seen.id.to_string().as_str()));
}

#[test]
fn get_sends_extra_headers() {
    let server = common::start();
    let mut curl = FriendlyCurl::new();

    curl.get_url(&server.url("/index.html"), &opts().header("SHAZAM", "Marvellous"))
        .unwrap();
    assert_eq!(server.last().header("shazam"), Some("Marvellous"));
}

#[test]
fn headers_do_not_leak_between_gets() {
    let server = common::start();
    let mut curl = FriendlyCurl::new();

    curl.get_url(&server.url("/first"), &opts().header("SHAZAM", "Marvellous"))
        .unwrap();
    curl.get_url(&server.url("/second"), &opts()).unwrap();
    let seen = server.requests();
    assert_eq!(seen[0].header("shazam"), Some("Marvellous"));
    assert_eq!(seen[1].header("shazam"), None);
}

#[test]
fn error_get_returns_status_and_page() {
    let server = common::start();
    let mut curl = FriendlyCurl::new();

    let response = curl.get_url(&server.url("/status/404"), &opts()).unwrap();
    assert_eq!(response.status(), 404);
    assert_eq!(response.header("content-type"), Some("text/html"));
    assert!(response.text().contains("<p>Error code 404."));
}

#[test]
fn query_parameters_reach_the_server() {
    let server = common::start();
    let mut curl = FriendlyCurl::new();

    let url = url_parameters(&server.url("/search"), [("q", "rust curl"), ("tag", "a"), ("tag", "b")]);
    curl.get_url(&url, &opts()).unwrap();
    assert_eq!(server.last().path, "/search?q=rust+curl&tag=a&tag=b");
}

#[test]
fn get_into_streams_to_sink() {
    let server = common::start();
    let mut curl = FriendlyCurl::new();

    let mut sink = Vec::new();
    let head = curl.get_url_into(&server.url("/stream"), &opts(), &mut sink).unwrap();
    assert_eq!(head.status, 200);
    assert_eq!(sink, TEST_LINE.as_bytes());
}

struct BrokenSink;

impl Write for BrokenSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn failing_sink_is_reported() {
    let server = common::start();
    let mut curl = FriendlyCurl::new();

    let err = curl
        .get_url_into(&server.url("/stream"), &opts(), &mut BrokenSink)
        .unwrap_err();
    assert!(matches!(err, CurlError::Sink(ref e) if e.kind() == io::ErrorKind::BrokenPipe));

    // The failed transfer reset the handle; it is still usable.
    assert_eq!(curl.get_url(&server.url("/again"), &opts()).unwrap().status(), 200);
}

// --- redirects ---

#[test]
fn redirects_are_followed_by_default() {
    let server = common::start();
    let mut curl = FriendlyCurl::new();

    let response = curl.get_url(&server.url("/redirect"), &opts()).unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text(), "landed");
    // Header blocks of every hop are merged.
    assert_eq!(response.header("location"), Some("/landing"));
    assert_eq!(response.header("content-type"), Some("text/plain"));

    let paths: Vec<String> = server.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(paths, ["/redirect", "/landing"]);
}

#[test]
fn redirect_returned_when_not_following() {
    let server = common::start();
    let mut curl = FriendlyCurl::new();

    let response = curl
        .get_url(&server.url("/redirect"), &opts().follow_location(false))
        .unwrap();
    assert_eq!(response.status(), 302);
    assert_eq!(response.header("location"), Some("/landing"));
    assert_eq!(server.requests().len(), 1);
}

// --- HEAD ---

#[test]
fn head_returns_headers_without_body() {
    let server = common::start();
    let mut curl = FriendlyCurl::new();

    let head = curl.head_url(&server.url("/index.html"), &opts()).unwrap();
    assert_eq!(head.status, 200);
    assert_eq!(head.header("content-type"), Some("text/html"));
    assert_eq!(server.last().method, "HEAD");

    // The reset after HEAD puts the next GET back in body mode.
    let response = curl.get_url(&server.url("/index.html"), &opts()).unwrap();
    assert_eq!(response.body, TEST_LINE.as_bytes());
    assert_eq!(server.last().method, "GET");
}

// --- POST ---

#[test]
fn post_data() {
    let server = common::start();
    let mut curl = FriendlyCurl::new();

    let response = curl
        .post_url(&server.url("/post_target"), Upload::bytes(b"foo=bar&baz=garply\r\n"), &opts())
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.body, TEST_LINE.as_bytes());

    let seen = server.last();
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.path, "/post_target");
    assert_eq!(seen.header("content-length"), Some("20"));
    assert_eq!(seen.header("content-type"), Some("application/x-www-form-urlencoded"));
    assert_eq!(seen.body, "foo=bar&baz=garply\r\n", "incorrect data on server");
}

#[test]
fn post_content_type_replaces_header() {
    let server = common::start();
    let mut curl = FriendlyCurl::new();

    let options = opts()
        .header("Content-Type", "text/plain")
        .content_type("application/json");
    curl.post_url(&server.url("/json"), Upload::bytes(br#"{"a":1}"#), &options)
        .unwrap();

    let seen = server.last();
    let content_types: Vec<&str> = seen
        .headers
        .iter()
        .filter(|(k, _)| k == "content-type")
        .map(|(_, v)| v.as_str())
        .collect();
    assert_eq!(content_types, ["application/json"]);
}

#[test]
fn post_file() {
    let server = common::start();
    let mut curl = FriendlyCurl::new();

    let path = std::env::temp_dir().join(format!("friendly-curl-{}", uuid::Uuid::new_v4()));
    std::fs::write(&path, "foo=bar&baz=garply\r\n").unwrap();
    let mut file = std::fs::File::open(&path).unwrap();

    curl.post_url(&server.url("/post_target"), Upload::file(&mut file, None).unwrap(), &opts())
        .unwrap();
    std::fs::remove_file(&path).unwrap();

    let seen = server.last();
    assert_eq!(seen.header("content-length"), Some("20"));
    assert_eq!(seen.body, "foo=bar&baz=garply\r\n");
}

struct BrokenReader;

impl Read for BrokenReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::UnexpectedEof, "source vanished"))
    }
}

#[test]
fn failing_upload_reports_its_io_error() {
    let server = common::start();
    let mut curl = FriendlyCurl::new();

    let err = curl
        .post_url(&server.url("/post_target"), Upload::reader(BrokenReader, Some(5)), &opts())
        .unwrap_err();
    assert!(matches!(err, CurlError::Io(ref e) if e.kind() == io::ErrorKind::UnexpectedEof));

    assert_eq!(curl.get_url(&server.url("/again"), &opts()).unwrap().status(), 200);
}

#[test]
fn post_reader_without_length_is_chunked() {
    let server = common::start();
    let mut curl = FriendlyCurl::new();

    let data: &[u8] = b"streamed body";
    curl.post_url(&server.url("/chunked"), Upload::reader(data, None), &opts())
        .unwrap();

    let seen = server.last();
    assert_eq!(seen.header("transfer-encoding"), Some("chunked"));
    assert_eq!(seen.body, "streamed body");
}

#[test]
fn get_after_post_is_a_get() {
    let server = common::start();
    let mut curl = FriendlyCurl::new();

    curl.post_url(&server.url("/post_target"), Upload::bytes(b"x=1"), &opts())
        .unwrap();
    curl.get_url(&server.url("/after"), &opts()).unwrap();

    let seen = server.last();
    assert_eq!(seen.method, "GET");
    assert!(seen.body.is_empty());
    assert_eq!(seen.header("content-type"), None);
}

// --- PUT / DELETE ---

#[test]
fn put_data() {
    let server = common::start();
    let mut curl = FriendlyCurl::new();

    let response = curl
        .put_url(
            &server.url("/put_target"),
            Upload::bytes(b"replacement"),
            &opts().content_type("text/plain"),
        )
        .unwrap();
    assert_eq!(response.status(), 200);

    let seen = server.last();
    assert_eq!(seen.method, "PUT");
    assert_eq!(seen.header("content-length"), Some("11"));
    assert_eq!(seen.header("content-type"), Some("text/plain"));
    assert_eq!(seen.body, "replacement");
}

#[test]
fn delete_url() {
    let server = common::start();
    let mut curl = FriendlyCurl::new();

    let response = curl.delete_url(&server.url("/things/1"), &opts()).unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.body, TEST_LINE.as_bytes());

    let seen = server.last();
    assert_eq!(seen.method, "DELETE");
    assert_eq!(seen.path, "/things/1");

    curl.get_url(&server.url("/things/1"), &opts()).unwrap();
    assert_eq!(server.last().method, "GET");
}

// --- config ---

#[test]
fn user_agent_survives_resets() {
    let server = common::start();
    let mut curl = FriendlyCurl::with_config(ClientConfig {
        user_agent: Some("friendly-curl-test".to_string()),
        ..ClientConfig::default()
    });

    curl.delete_url(&server.url("/a"), &opts()).unwrap();
    curl.get_url(&server.url("/b"), &opts()).unwrap();
    for seen in server.requests() {
        assert_eq!(seen.header("user-agent"), Some("friendly-curl-test"));
    }
}

#[test]
fn timeout_aborts_slow_transfer() {
    let server = common::start();
    let mut curl = FriendlyCurl::with_config(ClientConfig {
        timeout_ms: Some(200),
        ..ClientConfig::default()
    });

    let err = curl.get_url(&server.url("/slow/3000"), &opts()).unwrap_err();
    assert!(matches!(err, CurlError::Transfer(ref e) if e.is_operation_timedout()));
}

#[test]
fn config_default_content_type_is_used() {
    let server = common::start();
    let mut curl = FriendlyCurl::with_config(ClientConfig {
        content_type: "application/octet-stream".to_string(),
        ..ClientConfig::default()
    });

    curl.post_url(&server.url("/bin"), Upload::bytes(&[0, 1, 2]), &opts())
        .unwrap();
    assert_eq!(server.last().header("content-type"), Some("application/octet-stream"));
}

#[test]
fn debug_transfer_still_completes() {
    let server = common::start();
    let mut curl = FriendlyCurl::new();

    let response = curl.get_url(&server.url("/debug"), &opts().debug(true)).unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.body, TEST_LINE.as_bytes());
}

#[test]
fn refused_connection_is_a_transfer_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut curl = FriendlyCurl::new();
    let err = curl.get_url(&format!("http://{addr}/"), &opts()).unwrap_err();
    assert!(matches!(err, CurlError::Transfer(ref e) if e.is_couldnt_connect()));
}
