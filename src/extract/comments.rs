//! Comment scan
//!
//! HTML comments, `//` line comments and `/* */` block comments often keep
//! debug endpoints and disabled features around. Their bodies are searched
//! for `?name=` / `&name=` fragments and for absolute URLs.

use crate::extract::urls::scan_absolute_urls;
use crate::extract::{is_valid_parameter, ExtractionStrategy, Finding, Page, Source};
use regex::Regex;
use std::sync::LazyLock;

// A `//` preceded by `:` or a quote is a URL scheme or a string, not a comment.
static COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)<!--([\s\S]*?)-->|(?:^|[^:"'\\])//([^\n]*)|/\*([\s\S]*?)\*/"#)
        .expect("hardcoded regex pattern is valid")
});

static QUERY_FRAGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[?&]([a-zA-Z0-9_-]+)=").expect("hardcoded regex pattern is valid")
});

/// Parameters mentioned inside comments
pub struct CommentStrategy;

impl ExtractionStrategy for CommentStrategy {
    fn name(&self) -> &'static str {
        "comment"
    }

    fn extract(&self, page: &Page<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();

        for captures in COMMENT.captures_iter(page.body) {
            let Some(text) = (1..=3)
                .filter_map(|i| captures.get(i))
                .map(|m| m.as_str())
                .find(|s| !s.is_empty())
            else {
                continue;
            };

            for fragment in QUERY_FRAGMENT.captures_iter(text) {
                let Some(name) = fragment.get(1) else {
                    continue;
                };

                if is_valid_parameter(name.as_str()) {
                    findings.push(page.finding(page.finding_url(), name.as_str(), Source::Comment));
                }
            }

            scan_absolute_urls(text, page, Source::UrlInComment, &mut findings);
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::test_support::{triples, TestPage};

    fn run(body: &str) -> Vec<(String, String, Source)> {
        let test_page = TestPage::html("https://ex.com/app", body);
        triples(&CommentStrategy.extract(&test_page.page()))
    }

    #[test]
    fn test_html_comment() {
        assert_eq!(
            run("<p>hi</p><!-- debug?token=XYZ -->"),
            vec![("https://ex.com/app".to_string(), "token".to_string(), Source::Comment)]
        );
    }

    #[test]
    fn test_line_comment() {
        let findings = run("var a = 1;\n// old endpoint: /legacy?session_id=1&verbose=true\nvar b;");
        let names: Vec<_> = findings.iter().map(|(_, p, _)| p.as_str()).collect();
        assert_eq!(names, vec!["session_id", "verbose"]);
    }

    #[test]
    fn test_block_comment() {
        let findings = run("/* TODO remove\n   /admin?impersonate=1 */ code();");
        assert_eq!(findings[0].1, "impersonate");
        assert_eq!(findings[0].2, Source::Comment);
    }

    #[test]
    fn test_url_in_comment() {
        let findings = run("<!-- staging: https://staging.ex.com/api/v1?apikey=123 -->");
        assert!(findings.contains(&(
            "https://ex.com/app".to_string(),
            "apikey".to_string(),
            Source::Comment
        )));
        assert!(findings.contains(&(
            "https://staging.ex.com/api/v1".to_string(),
            "apikey".to_string(),
            Source::UrlInComment
        )));
    }

    #[test]
    fn test_url_scheme_is_not_a_comment() {
        assert!(run(r#"<a href="https://ex.com/?ref=nav">x</a> see http://ex.com/?utm=1"#).is_empty());
    }

    #[test]
    fn test_hyphenated_names_rejected() {
        assert!(run("<!-- /x?data-id=1 -->").is_empty());
    }
}
