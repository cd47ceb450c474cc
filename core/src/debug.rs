//! Routing libcurl's verbose output into `tracing`.

use curl::easy::InfoType;

/// Debug callback installed on transfers that asked for `debug`.
pub(crate) fn log_transfer(kind: InfoType, data: &[u8]) {
    let data = String::from_utf8_lossy(data);
    match kind {
        InfoType::Text => tracing::debug!(target: "friendly_curl::wire", "info: {:?}", data),
        InfoType::HeaderIn => {
            tracing::debug!(target: "friendly_curl::wire", "header from peer: {:?}", data)
        }
        InfoType::HeaderOut => {
            tracing::debug!(target: "friendly_curl::wire", "header sent to peer: {:?}", data)
        }
        InfoType::DataIn => tracing::debug!(target: "friendly_curl::wire", "data from peer: {:?}", data),
        InfoType::DataOut => tracing::debug!(target: "friendly_curl::wire", "data to peer: {:?}", data),
        _ => tracing::trace!(target: "friendly_curl::wire", len = data.len(), "ssl data"),
    }
}
