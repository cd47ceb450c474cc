//! `CurlHttpConnection`: the shape of a classic blocking HTTP connection,
//! backed by the thread-local curl handle.
//!
//! # Design
//! The connection owns no handle. `request` only stages the method, URL,
//! headers and body; `get_response` borrows this thread's `FriendlyCurl`,
//! runs the staged request and resets the handle before returning. Peer
//! verification is always off and signals are disabled, matching how the
//! adapter is used behind generic HTTP code that does its own trust checks.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::{FriendlyCurl, Plan, Upload};
use crate::error::CurlError;
use crate::http::HttpMethod;
use crate::local::with_thread_curl;
use crate::params::to_uri;
use crate::response::CurlHttpResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
struct PendingRequest {
    method: HttpMethod,
    url: String,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct CurlHttpConnection {
    host: String,
    port: Option<u16>,
    scheme: Scheme,
    key_file: Option<PathBuf>,
    cert_file: Option<PathBuf>,
    timeout: Option<Duration>,
    debug: bool,
    connected: bool,
    url: Option<String>,
    pending: Option<PendingRequest>,
}

impl CurlHttpConnection {
    pub fn new(host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            host: host.into(),
            port,
            scheme: Scheme::Http,
            key_file: None,
            cert_file: None,
            timeout: None,
            debug: false,
            connected: false,
            url: None,
            pending: None,
        }
    }

    pub fn https(host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            scheme: Scheme::Https,
            ..Self::new(host, port)
        }
    }

    /// Private key for client certificate authentication.
    pub fn key_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.key_file = Some(path.into());
        self
    }

    pub fn cert_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cert_file = Some(path.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// URL of the most recently staged request.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Any level above zero logs the transfer through `tracing`.
    pub fn set_debug_level(&mut self, level: u32) {
        self.debug = level > 0;
    }

    /// Start from a clean thread handle.
    pub fn connect(&mut self) -> Result<(), CurlError> {
        with_thread_curl(FriendlyCurl::reset)?;
        self.connected = true;
        Ok(())
    }

    pub fn close(&mut self) {
        self.connected = false;
        self.pending = None;
    }

    /// Stage a request; nothing is sent until `get_response`.
    ///
    /// GET and HEAD ignore `body`. POST and PUT upload it with a matching
    /// `Content-Length`. Any other method is sent as a custom request and
    /// cannot carry a body.
    pub fn request(
        &mut self,
        method: &str,
        uri: &str,
        body: Option<&[u8]>,
        headers: &[(&str, &str)],
    ) -> Result<(), CurlError> {
        if !self.connected {
            self.connect()?;
        }
        let method = HttpMethod::parse(method);
        let body = match (&method, body) {
            (HttpMethod::Post | HttpMethod::Put, Some(body)) => Some(body.to_vec()),
            (HttpMethod::Get | HttpMethod::Head | HttpMethod::Post | HttpMethod::Put, _) => None,
            (other, Some(_)) => return Err(CurlError::BodyNotSupported(other.to_string())),
            (_, None) => None,
        };

        let netloc = match self.port {
            Some(port) => format!("{}:{port}", self.host),
            None => self.host.clone(),
        };
        let path = if uri.starts_with('/') {
            uri.to_string()
        } else {
            format!("/{uri}")
        };
        let url = to_uri(&format!("{}://{netloc}{path}", self.scheme))?;

        self.url = Some(url.clone());
        self.pending = Some(PendingRequest {
            method,
            url,
            headers: headers
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            body,
        });
        Ok(())
    }

    /// Perform the staged request on this thread's handle.
    pub fn get_response(&mut self) -> Result<CurlHttpResponse, CurlError> {
        let pending = self.pending.take().ok_or(CurlError::NoPendingRequest)?;
        let key_file = self.key_file.as_deref();
        let cert_file = self.cert_file.as_deref();
        let timeout = self.timeout;
        let debug = self.debug;

        with_thread_curl(|curl| {
            let mut body = Vec::new();
            let plan = Plan {
                method: &pending.method,
                url: &pending.url,
                headers: pending.headers.clone(),
                upload: pending.body.as_deref().map(Upload::bytes),
                debug,
            };
            let exchange = curl.exchange(
                plan,
                |easy| tune_adapter(easy, key_file, cert_file, timeout),
                &mut body,
            );
            curl.reset();
            let exchange = exchange?;
            tracing::debug!(
                method = %pending.method,
                url = %pending.url,
                status = exchange.status,
                "adapter exchange complete"
            );
            CurlHttpResponse::from_raw(&exchange.raw_headers, body)
        })?
    }

    pub fn put_request(&mut self, _method: &str, _url: &str) -> Result<(), CurlError> {
        Err(CurlError::Unsupported("put_request"))
    }

    pub fn put_header(&mut self, _name: &str, _value: &str) -> Result<(), CurlError> {
        Err(CurlError::Unsupported("put_header"))
    }

    pub fn end_headers(&mut self) -> Result<(), CurlError> {
        Err(CurlError::Unsupported("end_headers"))
    }

    pub fn send(&mut self, _data: &[u8]) -> Result<(), CurlError> {
        Err(CurlError::Unsupported("send"))
    }
}

fn tune_adapter(
    easy: &mut curl::easy::Easy,
    key_file: Option<&Path>,
    cert_file: Option<&Path>,
    timeout: Option<Duration>,
) -> Result<(), curl::Error> {
    easy.ssl_verify_peer(false)?;
    easy.signal(false)?;
    easy.follow_location(false)?;
    if let Some(key) = key_file {
        easy.ssl_key(key)?;
    }
    if let Some(cert) = cert_file {
        easy.ssl_cert(cert)?;
    }
    if let Some(timeout) = timeout {
        easy.timeout(timeout)?;
    }
    Ok(())
}
