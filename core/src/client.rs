//! `FriendlyCurl`: one reusable libcurl handle behind a small request API.
//!
//! # Design
//! Every operation goes through the same lifecycle: put the handle in the
//! right mode for the method, set URL and headers, apply the config, run the
//! transfer with borrowed callbacks capturing the header bytes and streaming
//! the body into a sink, then read the status from the handle. HEAD, POST,
//! PUT and DELETE (and any failed transfer) reset the handle afterwards so
//! the next call starts clean; GET leaves it as is.

use std::fs::File;
use std::io::{self, Read, Seek, Write};

use curl::easy::{Easy, List, ReadError};

use crate::config::{ClientConfig, RequestOptions};
use crate::debug::log_transfer;
use crate::error::CurlError;
use crate::headers::{header_line, parse_header_map};
use crate::http::{HttpMethod, HttpResponse, ResponseHead};
use crate::params::to_uri;

/// Request body source for POST and PUT.
pub struct Upload<'a> {
    reader: Box<dyn Read + 'a>,
    len: Option<u64>,
}

impl<'a> Upload<'a> {
    pub fn bytes(data: &'a [u8]) -> Self {
        Self {
            reader: Box::new(data),
            len: Some(data.len() as u64),
        }
    }

    /// Upload from any reader. Without a length libcurl sends the body
    /// chunked.
    pub fn reader(reader: impl Read + 'a, len: Option<u64>) -> Self {
        Self {
            reader: Box::new(reader),
            len,
        }
    }

    /// Upload a file from its current position. Without `len` the length is
    /// what remains between that position and the end of the file.
    pub fn file(file: &'a mut File, len: Option<u64>) -> Result<Self, CurlError> {
        let len = match len {
            Some(len) => len,
            None => {
                let position = file.stream_position()?;
                file.metadata()?.len().saturating_sub(position)
            }
        };
        Ok(Self {
            reader: Box::new(file),
            len: Some(len),
        })
    }

    pub fn length(&self) -> Option<u64> {
        self.len
    }
}

/// Everything `exchange` needs besides handle tuning and the body sink.
pub(crate) struct Plan<'a> {
    pub method: &'a HttpMethod,
    pub url: &'a str,
    pub headers: Vec<(String, String)>,
    pub upload: Option<Upload<'a>>,
    pub debug: bool,
}

/// What a finished transfer left behind besides the body.
pub(crate) struct Exchange {
    pub status: u32,
    pub raw_headers: Vec<u8>,
}

/// A libcurl easy handle plus the defaults applied to every transfer.
#[derive(Debug)]
pub struct FriendlyCurl {
    handle: Easy,
    config: ClientConfig,
}

impl Default for FriendlyCurl {
    fn default() -> Self {
        Self::new()
    }
}

impl FriendlyCurl {
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            handle: Easy::new(),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ClientConfig) {
        self.config = config;
    }

    /// Direct access to the underlying handle for options this API does not
    /// cover. Whatever is set here survives until the next reset.
    pub fn handle_mut(&mut self) -> &mut Easy {
        &mut self.handle
    }

    /// Plain GET, body buffered in memory.
    pub fn get_url(&mut self, url: &str, opts: &RequestOptions) -> Result<HttpResponse, CurlError> {
        let mut body = Vec::new();
        let head = self.get_url_into(url, opts, &mut body)?;
        Ok(HttpResponse { head, body })
    }

    /// Plain GET, body streamed into `sink`.
    pub fn get_url_into(
        &mut self,
        url: &str,
        opts: &RequestOptions,
        sink: &mut dyn Write,
    ) -> Result<ResponseHead, CurlError> {
        self.perform(HttpMethod::Get, url, None, opts, sink)
    }

    pub fn head_url(&mut self, url: &str, opts: &RequestOptions) -> Result<ResponseHead, CurlError> {
        self.perform(HttpMethod::Head, url, None, opts, &mut io::sink())
    }

    /// POST `upload` with the content type from `opts` or the config.
    pub fn post_url(
        &mut self,
        url: &str,
        upload: Upload<'_>,
        opts: &RequestOptions,
    ) -> Result<HttpResponse, CurlError> {
        let mut body = Vec::new();
        let head = self.post_url_into(url, upload, opts, &mut body)?;
        Ok(HttpResponse { head, body })
    }

    pub fn post_url_into(
        &mut self,
        url: &str,
        upload: Upload<'_>,
        opts: &RequestOptions,
        sink: &mut dyn Write,
    ) -> Result<ResponseHead, CurlError> {
        self.perform(HttpMethod::Post, url, Some(upload), opts, sink)
    }

    pub fn put_url(
        &mut self,
        url: &str,
        upload: Upload<'_>,
        opts: &RequestOptions,
    ) -> Result<HttpResponse, CurlError> {
        let mut body = Vec::new();
        let head = self.perform(HttpMethod::Put, url, Some(upload), opts, &mut body)?;
        Ok(HttpResponse { head, body })
    }

    pub fn delete_url(&mut self, url: &str, opts: &RequestOptions) -> Result<HttpResponse, CurlError> {
        let mut body = Vec::new();
        let head = self.perform(HttpMethod::Delete, url, None, opts, &mut body)?;
        Ok(HttpResponse { head, body })
    }

    /// Return the handle to its base state. The config is kept; it is
    /// re-applied on the next transfer.
    pub fn reset(&mut self) {
        tracing::trace!("resetting curl handle");
        self.handle.reset();
    }

    fn perform(
        &mut self,
        method: HttpMethod,
        url: &str,
        upload: Option<Upload<'_>>,
        opts: &RequestOptions,
        sink: &mut dyn Write,
    ) -> Result<ResponseHead, CurlError> {
        let switches = opts.resolve(&self.config);
        let mut headers = opts.headers.clone();
        if matches!(method, HttpMethod::Post | HttpMethod::Put) {
            let content_type = opts
                .content_type
                .clone()
                .unwrap_or_else(|| self.config.content_type.clone());
            headers.retain(|(name, _)| !name.eq_ignore_ascii_case("content-type"));
            headers.push(("Content-Type".to_string(), content_type));
        }

        let plan = Plan {
            method: &method,
            url,
            headers,
            upload,
            debug: switches.debug,
        };
        let exchange = self.exchange(
            plan,
            |easy| {
                easy.ssl_verify_peer(!switches.accept_self_signed)?;
                easy.follow_location(switches.follow_location)
            },
            sink,
        )?;

        let head = ResponseHead {
            status: exchange.status,
            headers: parse_header_map(&exchange.raw_headers),
        };
        tracing::debug!(method = %method, url, status = head.status, "transfer complete");
        Ok(head)
    }

    /// Run one transfer and reset the handle when the method or a failure
    /// calls for it.
    pub(crate) fn exchange(
        &mut self,
        plan: Plan<'_>,
        tune: impl FnOnce(&mut Easy) -> Result<(), curl::Error>,
        sink: &mut dyn Write,
    ) -> Result<Exchange, CurlError> {
        let resets = plan.method.resets_handle();
        let result = self.run(plan, tune, sink);
        if resets || result.is_err() {
            self.reset();
        }
        result
    }

    fn run(
        &mut self,
        plan: Plan<'_>,
        tune: impl FnOnce(&mut Easy) -> Result<(), curl::Error>,
        sink: &mut dyn Write,
    ) -> Result<Exchange, CurlError> {
        let url = to_uri(plan.url)?;
        let easy = &mut self.handle;

        let upload_len = plan.upload.as_ref().map_or(Some(0), Upload::length);
        match plan.method {
            HttpMethod::Get => easy.get(true)?,
            HttpMethod::Head => easy.nobody(true)?,
            HttpMethod::Post => {
                easy.post(true)?;
                if let Some(len) = upload_len {
                    easy.post_field_size(len)?;
                }
            }
            HttpMethod::Put => {
                easy.upload(true)?;
                if let Some(len) = upload_len {
                    easy.in_filesize(len)?;
                }
            }
            HttpMethod::Delete => easy.custom_request("DELETE")?,
            HttpMethod::Custom(token) => easy.custom_request(token)?,
        }

        let mut list = List::new();
        for (name, value) in &plan.headers {
            list.append(&header_line(name, value))?;
        }
        easy.http_headers(list)?;
        easy.url(&url)?;
        apply_config(easy, &self.config)?;
        tune(easy)?;
        easy.verbose(plan.debug)?;

        let mut raw_headers = Vec::new();
        let mut sink_error = None;
        let mut upload_error = None;
        let mut upload = plan.upload;
        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match sink.write_all(data) {
                Ok(()) => Ok(data.len()),
                Err(err) => {
                    sink_error = Some(err);
                    Ok(0)
                }
            })?;
            transfer.header_function(|line| {
                raw_headers.extend_from_slice(line);
                true
            })?;
            if let Some(upload) = upload.as_mut() {
                transfer.read_function(|buf| {
                    upload.reader.read(buf).map_err(|err| {
                        upload_error = Some(err);
                        ReadError::Abort
                    })
                })?;
            }
            if plan.debug {
                transfer.debug_function(log_transfer)?;
            }
            transfer.perform()
        };
        if let Some(err) = sink_error {
            return Err(CurlError::Sink(err));
        }
        if let Some(err) = upload_error {
            return Err(CurlError::Io(err));
        }
        performed?;

        let status = easy.response_code()?;
        Ok(Exchange { status, raw_headers })
    }
}

fn apply_config(easy: &mut Easy, config: &ClientConfig) -> Result<(), curl::Error> {
    if let Some(timeout) = config.timeout() {
        easy.timeout(timeout)?;
    }
    if let Some(timeout) = config.connect_timeout() {
        easy.connect_timeout(timeout)?;
    }
    if let Some(agent) = &config.user_agent {
        easy.useragent(agent)?;
    }
    Ok(())
}
