//! Error types for the friendly-curl client.
//!
//! # Design
//! libcurl failures keep their `curl::Error` so callers can still ask
//! `is_operation_timedout()` and friends. Everything the wrapper itself can
//! reject (bad IRIs, unsupported adapter calls, a busy thread handle) gets a
//! dedicated variant.

use std::io;

use thiserror::Error;

/// Errors returned by `FriendlyCurl`, the thread-local cache and the
/// connection adapter.
#[derive(Debug, Error)]
pub enum CurlError {
    /// libcurl refused an option or the transfer failed.
    #[error("transfer failed: {0}")]
    Transfer(#[from] curl::Error),

    /// The caller-supplied body sink returned an error.
    #[error("writing response body failed: {0}")]
    Sink(#[source] io::Error),

    /// Reading upload metadata (e.g. a file's length) failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A non-ASCII URL could not be converted to a URI.
    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A method other than GET/HEAD/POST/PUT was given a request body.
    #[error("body not supported with custom method {0}")]
    BodyNotSupported(String),

    /// The captured headers did not start with a parsable status line.
    #[error("malformed status line: {0:?}")]
    MalformedStatusLine(String),

    /// `get_response` was called before `request`.
    #[error("no request is staged on this connection")]
    NoPendingRequest,

    /// The thread-local handle is already borrowed further up the stack.
    #[error("the thread-local curl handle is already in use")]
    HandleBusy,

    /// Part of the incremental connection API that is not implemented.
    #[error("{0} is not supported by the curl connection adapter")]
    Unsupported(&'static str),
}

/// Errors raised while loading a `ClientConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
