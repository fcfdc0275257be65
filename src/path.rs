//! Key path to request URL mapping

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::error::{Error, Result};

/// Characters allowed unencoded in a URI path segment per RFC 3986.
/// Everything else (including `/`, spaces, `#`, `?`, `%`, non-ASCII) gets percent-encoded.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=')
    .remove(b':')
    .remove(b'@');

/// Split a key path into clean segments.
///
/// Empty and `.` segments are dropped; `..` removes the previous key segment
/// but never climbs above the start of the key.
pub fn key_segments(key: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    for segment in key.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments
}

/// Join `key` onto `base`, one `/` between every segment.
///
/// `base` is used as-is apart from trailing slashes, so an empty key yields the
/// base itself.
pub fn join_key_path(base: &str, key: &str) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    for segment in key_segments(key) {
        url.push('/');
        url.extend(utf8_percent_encode(segment, PATH_SEGMENT));
    }
    url
}

/// Build the normalized base URL of a store: endpoint path plus store identifier.
pub fn base_url(endpoint: &str, store_id: &str) -> Result<String> {
    let parsed = Url::parse(endpoint)
        .map_err(|e| Error::InvalidUrl(format!("Invalid endpoint URL '{}': {}", endpoint, e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(Error::InvalidUrl(format!(
                "Unsupported endpoint scheme '{}', expected http or https",
                other
            )))
        }
    }
    if parsed.host_str().is_none() {
        return Err(Error::InvalidUrl(format!("Endpoint '{}' has no host", endpoint)));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(Error::InvalidUrl(format!(
            "Endpoint '{}' must not carry a query or fragment",
            endpoint
        )));
    }
    if key_segments(store_id).is_empty() {
        return Err(Error::Config("Store identifier must not be empty".to_string()));
    }

    Ok(join_key_path(parsed.as_str(), store_id))
}
