//! Source-specific providers.
//!
//! Each provider knows one REST API: how to build its URLs and how to turn the
//! decoded JSON into raw rows. Network access, status handling and rate-limit
//! backoff are delegated to the shared [`FetchClient`](crate::client::FetchClient).

pub mod frankfurter;
pub mod polygon;

/// Strips trailing slashes so paths can be appended with a single `/`.
pub(crate) fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}
