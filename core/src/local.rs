//! One `FriendlyCurl` per thread, created on first use.
//!
//! The handle lives in a `thread_local!` slot for the lifetime of the thread
//! so its connection cache is shared by every call made on that thread.
//! Access is closure-scoped; a nested call while the handle is already lent
//! out gets `CurlError::HandleBusy`.

use std::cell::RefCell;

use crate::client::FriendlyCurl;
use crate::config::ClientConfig;
use crate::error::CurlError;

thread_local! {
    static THREAD_CURL: RefCell<Option<FriendlyCurl>> = const { RefCell::new(None) };
}

/// Run `f` with this thread's handle, creating it if needed.
///
/// ```no_run
/// use friendly_curl::{with_thread_curl, RequestOptions};
///
/// let response = with_thread_curl(|curl| curl.get_url("http://example.com/", &RequestOptions::new()))??;
/// println!("{}", response.status());
/// # Ok::<(), friendly_curl::CurlError>(())
/// ```
pub fn with_thread_curl<R>(f: impl FnOnce(&mut FriendlyCurl) -> R) -> Result<R, CurlError> {
    THREAD_CURL.with(|slot| {
        let mut slot = slot.try_borrow_mut().map_err(|_| CurlError::HandleBusy)?;
        let curl = slot.get_or_insert_with(|| {
            tracing::debug!("creating thread-local curl handle");
            FriendlyCurl::new()
        });
        Ok(f(curl))
    })
}

/// Replace the config of this thread's handle.
pub fn configure_thread_curl(config: ClientConfig) -> Result<(), CurlError> {
    with_thread_curl(|curl| curl.set_config(config))
}

/// Discard this thread's handle; the next use creates a fresh one.
pub fn drop_thread_curl() -> Result<(), CurlError> {
    THREAD_CURL.with(|slot| {
        let mut slot = slot.try_borrow_mut().map_err(|_| CurlError::HandleBusy)?;
        slot.take();
        Ok(())
    })
}
