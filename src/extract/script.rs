//! Script-pattern scan
//!
//! Regular expressions tuned to common idioms for issuing HTTP requests from
//! scripts. Applied to every page, whatever its content type, since inline
//! scripts live inside HTML and standalone scripts are fetched as-is.

use crate::extract::{is_valid_parameter, ExtractionStrategy, Finding, Page, Source};
use crate::url::{finding_url, is_http_scheme, resolve_against};
use regex::Regex;
use std::sync::LazyLock;

/// What the capture groups of a pattern hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatternKind {
    /// Group 1 is a base URL, group 2 its query string
    UrlWithQuery,
    /// Group 1 is an object-literal-like blob whose `key:` tokens are parameters
    ObjectLiteral,
    /// Group 1 is a single parameter name
    NamedParameter,
}

struct ScriptPattern {
    kind: PatternKind,
    regex: Regex,
}

const PATTERNS: &[(PatternKind, &str)] = &[
    // fetch("/api?x=1"), axios("..."), $.ajax("..."), xhr("...")
    (
        PatternKind::UrlWithQuery,
        r#"(?:fetch|axios|ajax|XMLHttpRequest|xhr)\s*\(\s*["']([^"'?#]+)\?([^"'#]+)"#,
    ),
    // client.get("/api?x=1"), axios.post(...), http.request(...)
    (
        PatternKind::UrlWithQuery,
        r#"\.(?:get|post|put|delete|patch|request)\s*\(\s*["']([^"'?#]+)\?([^"'#]+)"#,
    ),
    (
        PatternKind::UrlWithQuery,
        r#"new\s+XMLHttpRequest\s*\([^)]*\)[^{]*\.open\s*\(\s*["'][^"']*["']\s*,\s*["']([^"'?#]+)\?([^"'#]+)"#,
    ),
    // xhr.open("GET", "/api?x=1")
    (
        PatternKind::UrlWithQuery,
        r#"\.open\s*\(\s*["'][A-Za-z]+["']\s*,\s*["']([^"'?#]+)\?([^"'#]+)"#,
    ),
    (PatternKind::ObjectLiteral, r#"\.send\s*\(\s*([^)]+)"#),
    (
        PatternKind::UrlWithQuery,
        r#"new\s+URL\s*\(\s*["']([^"'?#]+)\?([^"'#]+)"#,
    ),
    // url.searchParams.set("name", ...)
    (
        PatternKind::NamedParameter,
        r#"searchParams\.[a-zA-Z]+\s*\(\s*["']([^"']+)["']"#,
    ),
    (
        PatternKind::UrlWithQuery,
        r#"(?:location|window\.location|document\.location)(?:\.href|\["href"\]|\.assign|\.replace)\s*=\s*["']([^"'?#]+)\?([^"'#]+)"#,
    ),
    (
        PatternKind::UrlWithQuery,
        r#"(?:url|href|src|data-url|data-src)\s*[:=]\s*["']([^"'?#]+)\?([^"'#]+)"#,
    ),
    // { params: { id: 1 } }
    (
        PatternKind::ObjectLiteral,
        r#"(?:params|parameters|query|data|body)\s*:\s*(\{[^}]+\}|\[[^\]]+\]|"[^"]+"|'[^']+'|\w+)"#,
    ),
    (
        PatternKind::ObjectLiteral,
        r#"(?:params|parameters|query|data|body)\s*=\s*(\{[^}]+\}|\[[^\]]+\]|"[^"]+"|'[^']+'|\w+)"#,
    ),
    // `/api/items?page=${page}`
    (PatternKind::UrlWithQuery, r"`([^`?#]+)\?([^`#]+)"),
    (
        PatternKind::ObjectLiteral,
        r#"(?:FormData|URLSearchParams)\s*\(\s*([^)]+)"#,
    ),
    // formData.append("name", value)
    (
        PatternKind::NamedParameter,
        r#"\.append\s*\(\s*["']([^"']+)["']\s*,"#,
    ),
    (
        PatternKind::UrlWithQuery,
        r#"\$\s*\.(?:get|post|ajax)\s*\(\s*\{[^}]*url\s*:\s*["']([^"'?#]+)\?([^"'#]+)"#,
    ),
];

static SCRIPT_PATTERNS: LazyLock<Vec<ScriptPattern>> = LazyLock::new(|| {
    PATTERNS
        .iter()
        .map(|(kind, pattern)| ScriptPattern {
            kind: *kind,
            regex: Regex::new(pattern).expect("hardcoded regex pattern is valid"),
        })
        .collect()
});

static OBJECT_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["']?([a-zA-Z0-9_]+)["']?\s*:"#).expect("hardcoded regex pattern is valid")
});

/// HTTP-call idioms and request-data literals in script text
pub struct ScriptStrategy;

impl ExtractionStrategy for ScriptStrategy {
    fn name(&self) -> &'static str {
        "script"
    }

    fn extract(&self, page: &Page<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();

        for pattern in SCRIPT_PATTERNS.iter() {
            for captures in pattern.regex.captures_iter(page.body) {
                let Some(first) = captures.get(1) else {
                    continue;
                };

                match pattern.kind {
                    PatternKind::UrlWithQuery => {
                        if let Some(query) = captures.get(2) {
                            push_query_string(
                                page,
                                first.as_str(),
                                query.as_str(),
                                &mut findings,
                            );
                        }
                    }
                    PatternKind::ObjectLiteral => {
                        push_object_keys(page, first.as_str(), &mut findings);
                    }
                    PatternKind::NamedParameter => {
                        let name = first.as_str();
                        if is_valid_parameter(name) {
                            findings.push(page.finding(
                                page.finding_url(),
                                name,
                                Source::JavaScript,
                            ));
                        }
                    }
                }
            }
        }

        findings
    }
}

/// Splits a captured query string on `&` and the first `=`
fn push_query_string(page: &Page<'_>, base: &str, query: &str, findings: &mut Vec<Finding>) {
    let mut target: Option<String> = None;

    for pair in query.split('&') {
        let Some((name, _)) = pair.split_once('=') else {
            continue;
        };

        if !is_valid_parameter(name) {
            continue;
        }

        if target.is_none() {
            match resolve_against(page.url, base).filter(is_http_scheme) {
                Some(resolved) => target = Some(finding_url(&resolved)),
                None => return,
            }
        }

        if let Some(url) = &target {
            findings.push(page.finding(url.clone(), name, Source::JavaScript));
        }
    }
}

/// Reports every `key:` token of an object-literal-like blob against the page
fn push_object_keys(page: &Page<'_>, blob: &str, findings: &mut Vec<Finding>) {
    for captures in OBJECT_KEY.captures_iter(blob) {
        let Some(key) = captures.get(1) else {
            continue;
        };

        if is_valid_parameter(key.as_str()) {
            findings.push(page.finding(
                page.finding_url(),
                key.as_str(),
                Source::JavaScriptObject,
            ));
        }
    }
}
