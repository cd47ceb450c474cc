//! Turning captured header bytes into a lookup map.
//!
//! libcurl hands every header line of every response it saw to the header
//! callback, status lines included. With redirects or interim `100 Continue`
//! responses that means several blocks back to back; they are merged here
//! and the last value for a name wins.

use std::collections::BTreeMap;

/// Parse raw header bytes into a map keyed by lower-cased header name.
///
/// Status lines, blank lines and lines without a `:` are skipped. Names and
/// values are trimmed; a value keeps any further `:` it contains.
pub fn parse_header_map(raw: &[u8]) -> BTreeMap<String, String> {
    let text = String::from_utf8_lossy(raw);
    let mut headers = BTreeMap::new();
    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with("HTTP/") {
            continue;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        headers.insert(name.to_ascii_lowercase(), value.trim().to_string());
    }
    headers
}

/// Format request headers the way libcurl's header list expects them.
pub(crate) fn header_line(name: &str, value: &str) -> String {
    format!("{name}: {value}")
}
