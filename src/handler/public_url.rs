//! Public URL construction
//!
//! Stored files are addressed relative to the scheme and host the client used
//! for the upload; no canonical base URL exists.

use hyper::header::HOST;
use hyper::http::request::Parts;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::borrow::Cow;

use crate::config::Config;

/// Everything but unreserved characters is escaped inside a path segment
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// `<scheme>://<host>` as seen by the client that sent `parts`
pub fn base_url(parts: &Parts, config: &Config) -> String {
    let forwarded = |name: &str| {
        if !config.http.trust_proxy {
            return None;
        }
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(ToString::to_string)
    };

    let scheme = forwarded("x-forwarded-proto")
        .or_else(|| parts.uri.scheme_str().map(ToString::to_string))
        .unwrap_or_else(|| "http".to_string());

    let host = forwarded("x-forwarded-host")
        .or_else(|| {
            parts
                .headers
                .get(HOST)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        })
        .or_else(|| parts.uri.authority().map(ToString::to_string))
        .unwrap_or_else(|| format!("{}:{}", config.server.host, config.server.port));

    format!("{scheme}://{host}")
}

/// Absolute URL of a stored file, with the name escaped as one path segment
pub fn file_url(base: &str, prefix: &str, filename: &str) -> String {
    format!("{base}{prefix}/{}", utf8_percent_encode(filename, SEGMENT))
}

/// Stored file name addressed by an escaped path segment.
///
/// `None` when the decoded bytes are not UTF-8.
pub fn decode_segment(segment: &str) -> Option<Cow<'_, str>> {
    percent_decode_str(segment).decode_utf8().ok()
}
