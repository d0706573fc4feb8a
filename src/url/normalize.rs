use url::Url;

/// Normalizes a URL into the form used to report findings
///
/// Keeps scheme, host, port (when not the scheme default) and path. Query and
/// fragment are stripped, so every parameter found for an endpoint is keyed by
/// the same string.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use paraxm::url::finding_url;
///
/// let url = Url::parse("https://ex.com/api?id=5#top").unwrap();
/// assert_eq!(finding_url(&url), "https://ex.com/api");
///
/// let url = Url::parse("http://ex.com:8080").unwrap();
/// assert_eq!(finding_url(&url), "http://ex.com:8080/");
/// ```
pub fn finding_url(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{}:{}{}", url.scheme(), host, port, url.path()),
        None => format!("{}://{}{}", url.scheme(), host, url.path()),
    }
}

/// Normalizes a URL into the key used by the visited-URL table
///
/// Only the fragment is dropped: two links differing by `#section` point at
/// the same document.
pub fn crawl_key(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.to_string()
}

/// Returns the distinct query parameter names of a URL in order of appearance
pub fn query_parameter_names(url: &Url) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for (key, _) in url.query_pairs() {
        if !names.iter().any(|n| n == key.as_ref()) {
            names.push(key.into_owned());
        }
    }
    names
}
