//! Plain-data request and response types.
//!
//! # Design
//! `ResponseHead` is what every `FriendlyCurl` operation hands back: the
//! status code libcurl reports plus a map of lower-cased header names to
//! values. `HttpResponse` pairs it with the buffered body for callers that
//! did not supply their own sink.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// HTTP method for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Delete,
    /// Any other token, sent verbatim as a custom request.
    Custom(String),
}

impl HttpMethod {
    /// Methods are case-sensitive tokens: `get` is a custom method.
    pub fn parse(token: &str) -> Self {
        match token {
            "GET" => HttpMethod::Get,
            "HEAD" => HttpMethod::Head,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "DELETE" => HttpMethod::Delete,
            other => HttpMethod::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Custom(token) => token,
        }
    }

    /// Whether the handle must be reset after this method ran.
    pub(crate) fn resets_handle(&self) -> bool {
        !matches!(self, HttpMethod::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status and headers of a completed transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResponseHead {
    pub status: u32,
    /// Keys are lower-cased header names.
    pub headers: BTreeMap<String, String>,
}

impl ResponseHead {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// A completed transfer with its body buffered in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub head: ResponseHead,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn status(&self) -> u32 {
        self.head.status
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.header(name)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
