//! Query strings and IRI-to-URI conversion.

use url::{form_urlencoded, Url};

use crate::error::CurlError;

/// Append `params` to `base_url` as a form-encoded query string.
///
/// A key that appears several times produces several pairs, which is how a
/// list value is expressed. With no params `base_url` comes back unchanged.
///
/// ```
/// use friendly_curl::url_parameters;
///
/// let url = url_parameters("http://example.com/search", [("q", "rust curl"), ("page", "2")]);
/// assert_eq!(url, "http://example.com/search?q=rust+curl&page=2");
/// ```
pub fn url_parameters<I, K, V>(base_url: &str, params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in params {
        serializer.append_pair(key.as_ref(), value.as_ref());
        any = true;
    }
    if !any {
        return base_url.to_string();
    }
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{separator}{}", serializer.finish())
}

/// Convert an IRI into a URI libcurl can send.
///
/// Plain ASCII input is returned untouched; only URLs carrying non-ASCII
/// characters are parsed, IDNA-encoded and percent-encoded.
pub fn to_uri(url: &str) -> Result<String, CurlError> {
    if url.is_ascii() {
        return Ok(url.to_string());
    }
    Url::parse(url)
        .map(String::from)
        .map_err(|source| CurlError::InvalidUrl {
            url: url.to_string(),
            source,
        })
}
