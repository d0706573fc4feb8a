use url::Url;

/// Resolves a possibly-relative reference against an already-parsed base URL
///
/// - An empty (or all-whitespace) reference resolves to `base`.
/// - An absolute reference is returned as-is (after parsing).
/// - Anything else follows standard relative-reference resolution.
///
/// Returns `None` when the reference cannot be parsed.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use paraxm::url::resolve_against;
///
/// let base = Url::parse("https://ex.com/a/b").unwrap();
/// assert_eq!(resolve_against(&base, "c").unwrap().as_str(), "https://ex.com/a/c");
/// assert_eq!(resolve_against(&base, "/c?x=1").unwrap().as_str(), "https://ex.com/c?x=1");
/// assert_eq!(
///     resolve_against(&base, "https://other.com/x").unwrap().as_str(),
///     "https://other.com/x"
/// );
/// assert_eq!(resolve_against(&base, "").unwrap(), base);
/// ```
pub fn resolve_against(base: &Url, reference: &str) -> Option<Url> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Some(base.clone());
    }
    base.join(reference).ok()
}
