//! Absolute-URL scan over raw text

use crate::extract::{ExtractionStrategy, Finding, Page, Source};
use regex::Regex;
use std::sync::LazyLock;

static ABSOLUTE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s'"<>()]+"#).expect("hardcoded regex pattern is valid")
});

/// Query parameters of every `http(s)://` URL in the body
pub struct AbsoluteUrlStrategy;

impl ExtractionStrategy for AbsoluteUrlStrategy {
    fn name(&self) -> &'static str {
        "absolute-url"
    }

    fn extract(&self, page: &Page<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();
        scan_absolute_urls(page.body, page, Source::UrlInContent, &mut findings);
        findings
    }
}

/// Reports the query parameters of each absolute URL found in `text`
///
/// HTML bodies carry `&amp;` between query pairs; it is decoded before parsing.
pub(crate) fn scan_absolute_urls(
    text: &str,
    page: &Page<'_>,
    source: Source,
    out: &mut Vec<Finding>,
) {
    for candidate in ABSOLUTE_URL.find_iter(text) {
        let raw = candidate.as_str().replace("&amp;", "&");
        page.push_query_findings(&raw, source, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::test_support::{triples, TestPage};

    fn run(body: &str) -> Vec<(String, String, Source)> {
        let test_page = TestPage::html("https://ex.com/page", body);
        triples(&AbsoluteUrlStrategy.extract(&test_page.page()))
    }

    #[test]
    fn test_urls_in_text() {
        let findings = run("See https://cdn.ex.net/lib.js?ver=3 and http://ex.com/a/b?ref=mail.");
        assert_eq!(
            findings,
            vec![
                ("https://cdn.ex.net/lib.js".to_string(), "ver".to_string(), Source::UrlInContent),
                ("http://ex.com/a/b".to_string(), "ref".to_string(), Source::UrlInContent),
            ]
        );
    }

    #[test]
    fn test_stops_at_quotes_and_brackets() {
        let findings = run(r#"<a href="https://ex.com/go?dest=home">(https://ex.com/p?lang=en)</a>"#);
        let names: Vec<_> = findings.iter().map(|(_, p, _)| p.as_str()).collect();
        assert_eq!(names, vec!["dest", "lang"]);
    }

    #[test]
    fn test_html_escaped_ampersand() {
        let findings = run("https://ex.com/list?page=2&amp;order=desc");
        let names: Vec<_> = findings.iter().map(|(_, p, _)| p.as_str()).collect();
        assert_eq!(names, vec!["page", "order"]);
    }

    #[test]
    fn test_urls_without_query_ignored() {
        assert!(run("https://ex.com/plain and http://ex.com/other/").is_empty());
    }
}
