//! `CurlHttpResponse`: a status-line-aware response object for the
//! connection adapter.
//!
//! # Design
//! Built after the transfer is complete from the raw header bytes and the
//! buffered body. When libcurl captured several header blocks (an interim
//! `100 Continue`, say) the last block describes the final response and is
//! the one used. Header names keep their case and order.

use std::io::{self, Cursor, Read};

use crate::error::CurlError;

#[derive(Debug, Clone)]
pub struct CurlHttpResponse {
    version: u32,
    status: u32,
    reason: String,
    headers: Vec<(String, String)>,
    body: Cursor<Vec<u8>>,
}

impl CurlHttpResponse {
    pub fn from_raw(raw_headers: &[u8], body: Vec<u8>) -> Result<Self, CurlError> {
        let text = String::from_utf8_lossy(raw_headers);
        let lines: Vec<&str> = text.lines().collect();
        let start = lines
            .iter()
            .rposition(|line| line.starts_with("HTTP/"))
            .ok_or_else(|| CurlError::MalformedStatusLine(lines.first().copied().unwrap_or("").to_string()))?;

        let (version, status, reason) = parse_status_line(lines[start])?;
        let headers = parse_header_lines(&lines[start + 1..]);
        Ok(Self {
            version,
            status,
            reason,
            headers,
            body: Cursor::new(body),
        })
    }

    /// Protocol version as its digits: `11` for HTTP/1.1, `2` for HTTP/2.
    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn status(&self) -> u32 {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Value of `name`, case-insensitively; repeated headers are joined
    /// with `", "`.
    pub fn header(&self, name: &str) -> Option<String> {
        let values: Vec<&str> = self
            .headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values.join(", "))
        }
    }

    pub fn header_or(&self, name: &str, default: &str) -> String {
        self.header(name).unwrap_or_else(|| default.to_string())
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Read up to `amt` bytes of the body, or everything left with `None`.
    pub fn read_body(&mut self, amt: Option<usize>) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        match amt {
            Some(amt) => {
                (&mut self.body).take(amt as u64).read_to_end(&mut out)?;
            }
            None => {
                self.body.read_to_end(&mut out)?;
            }
        }
        Ok(out)
    }
}

impl Read for CurlHttpResponse {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.body.read(buf)
    }
}

fn parse_status_line(line: &str) -> Result<(u32, u32, String), CurlError> {
    let malformed = || CurlError::MalformedStatusLine(line.to_string());
    let (protocol, rest) = line.split_once(' ').ok_or_else(malformed)?;
    let (code, reason) = rest.split_once(' ').unwrap_or((rest, ""));

    let digits: String = protocol.chars().filter(char::is_ascii_digit).collect();
    let version = digits.parse().map_err(|_| malformed())?;
    let status = code.trim().parse().map_err(|_| malformed())?;
    Ok((version, status, reason.trim().to_string()))
}

/// Header lines up to the blank line ending the block, with continuation
/// lines folded into the previous value.
fn parse_header_lines(lines: &[&str]) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = Vec::new();
    for line in lines {
        if line.is_empty() {
            break;
        }
        if line.starts_with(|c: char| c == ' ' || c == '\t') {
            if let Some((_, value)) = headers.last_mut() {
                value.push(' ');
                value.push_str(line.trim());
            }
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }
    headers
}
