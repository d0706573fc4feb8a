//! URL handling module for ParaXm
//!
//! This module provides relative-reference resolution, finding-URL
//! normalization, crawl-key normalization, and host comparison.

mod domain;
mod normalize;
mod resolve;

use crate::{UrlError, UrlResult};
use url::Url;

// Re-export main functions
pub use domain::{extract_host, is_http_scheme, is_same_host};
pub use normalize::{crawl_key, finding_url, query_parameter_names};
pub use resolve::resolve_against;

/// Parses a scan target into an absolute `http(s)` URL with a host
///
/// # Examples
///
/// ```
/// use paraxm::url::parse_target;
///
/// assert!(parse_target("https://example.com").is_ok());
/// assert!(parse_target("ftp://example.com").is_err());
/// ```
pub fn parse_target(target: &str) -> UrlResult<Url> {
    let url = Url::parse(target).map_err(|e| UrlError::Parse(e.to_string()))?;

    if !is_http_scheme(&url) {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}
