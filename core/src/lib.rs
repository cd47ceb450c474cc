//! A friendly layer over libcurl for blocking HTTP.
//!
//! # Overview
//! `FriendlyCurl` wraps one reusable `curl::easy::Easy` handle and exposes
//! `get_url`, `head_url`, `post_url`, `put_url` and `delete_url`, each of
//! which configures the handle, performs the transfer and hands back the
//! status plus a map of lower-cased response headers. `with_thread_curl`
//! keeps one such handle per thread. `CurlHttpConnection` and
//! `CurlHttpResponse` put the same machinery behind the familiar
//! connection/response shape of a synchronous HTTP client.
//!
//! # Design
//! - Framing, TLS, redirects and chunked decoding are all libcurl's job;
//!   this crate only sets options, captures bytes and splits header lines.
//! - The handle is reset after every call except GET, so options set for
//!   one request do not leak into the next.
//! - `ClientConfig` is re-applied on every transfer and therefore survives
//!   resets.

pub mod client;
pub mod config;
pub mod connection;
mod debug;
pub mod error;
pub mod headers;
pub mod http;
pub mod local;
pub mod params;
pub mod response;

pub use client::{FriendlyCurl, Upload};
pub use config::{ClientConfig, RequestOptions, DEFAULT_CONTENT_TYPE};
pub use connection::{CurlHttpConnection, Scheme};
pub use error::{ConfigError, CurlError};
pub use headers::parse_header_map;
pub use http::{HttpMethod, HttpResponse, ResponseHead};
pub use local::{configure_thread_curl, drop_thread_curl, with_thread_curl};
pub use params::{to_uri, url_parameters};
pub use response::CurlHttpResponse;
