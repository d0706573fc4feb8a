//! Parameter extraction engine
//!
//! A fetched page is run through an ordered list of independent
//! [`ExtractionStrategy`] implementations:
//! - structural HTML scan (forms, links, URL-bearing attributes)
//! - script-pattern scan (HTTP-call idioms, object literals)
//! - absolute-URL scan over the raw body
//! - comment scan (HTML, line and block comments)
//!
//! Strategies may report overlapping findings. Deduplication belongs to the
//! crawl's shared [`ScanContext`](crate::state::ScanContext), which keeps the
//! first finding for every `(url, parameter)` pair, so strategy order decides
//! which source tag wins.

mod comments;
mod html;
mod script;
mod urls;
mod validator;

use crate::url::{finding_url, is_http_scheme, query_parameter_names, resolve_against};
use chrono::{DateTime, Utc};
use std::fmt;
use url::Url;

pub use comments::CommentStrategy;
pub use html::StructuralStrategy;
pub use script::ScriptStrategy;
pub use urls::AbsoluteUrlStrategy;
pub use validator::is_valid_parameter;

/// Which extraction strategy produced a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Source {
    /// Named field inside an HTML `<form>`
    HtmlForm,
    /// Query parameter of an anchor `href`
    HtmlLink,
    /// Query parameter of a URL-bearing attribute (`src`, `data`, ...)
    HtmlAttr,
    /// Query string of a URL used in a script call
    JavaScript,
    /// Key of an object literal passed as request data
    JavaScriptObject,
    /// Query parameter of an absolute URL anywhere in the body
    UrlInContent,
    /// `?name=` / `&name=` inside a comment
    Comment,
    /// Query parameter of an absolute URL inside a comment
    UrlInComment,
}

impl Source {
    /// Every source tag, in extraction order
    pub const ALL: [Source; 8] = [
        Source::HtmlForm,
        Source::HtmlLink,
        Source::HtmlAttr,
        Source::JavaScript,
        Source::JavaScriptObject,
        Source::UrlInContent,
        Source::Comment,
        Source::UrlInComment,
    ];

    /// Returns the tag as shown in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HtmlForm => "HTML-Form",
            Self::HtmlLink => "HTML-Link",
            Self::HtmlAttr => "HTML-Attr",
            Self::JavaScript => "JavaScript",
            Self::JavaScriptObject => "JavaScript-Object",
            Self::UrlInContent => "URL-In-Content",
            Self::Comment => "Comment",
            Self::UrlInComment => "URL-In-Comment",
        }
    }

    /// Parses a tag produced by [`Source::as_str`]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == tag)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discovered parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Endpoint the parameter targets (scheme, host and path only)
    pub url: String,

    /// Parameter name
    pub parameter: String,

    /// Strategy that found it
    pub source: Source,

    /// HTTP method of the discovery context (form method or page method)
    pub method: String,

    /// Content-Type of the page it came from
    pub content_type: String,

    /// HTTP status of the page it came from
    pub status_code: u16,

    /// When it was discovered
    pub timestamp: DateTime<Utc>,
}

impl Finding {
    /// Key used for deduplication: `url|parameter`
    pub fn dedup_key(&self) -> String {
        format!("{}|{}", self.url, self.parameter)
    }

    /// Fuzzing template line: `<url>?<parameter>=FUZZ`
    pub fn fuzz_line(&self) -> String {
        format!("{}?{}=FUZZ", self.url, self.parameter)
    }
}

/// A fetched page as seen by the extraction strategies
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    /// URL the page was fetched from
    pub url: &'a Url,

    /// Decoded response body
    pub body: &'a str,

    /// Content-Type header (empty if absent)
    pub content_type: &'a str,

    /// Method used to fetch the page
    pub method: &'a str,

    /// HTTP status code
    pub status_code: u16,
}

impl<'a> Page<'a> {
    /// Returns true if the Content-Type marks the page as HTML
    pub fn is_html(&self) -> bool {
        self.content_type.to_ascii_lowercase().contains("text/html")
    }

    /// Normalized page URL used for findings without an explicit target
    pub fn finding_url(&self) -> String {
        finding_url(self.url)
    }

    /// Builds a finding carrying the page's method
    pub fn finding(&self, url: String, parameter: &str, source: Source) -> Finding {
        self.finding_with_method(url, parameter, source, self.method)
    }

    /// Builds a finding with an explicit method (forms carry their own)
    pub fn finding_with_method(
        &self,
        url: String,
        parameter: &str,
        source: Source,
        method: &str,
    ) -> Finding {
        Finding {
            url,
            parameter: parameter.to_string(),
            source,
            method: method.to_string(),
            content_type: self.content_type.to_string(),
            status_code: self.status_code,
            timestamp: Utc::now(),
        }
    }

    /// Resolves `reference` against the page and reports its valid query parameters
    pub fn push_query_findings(&self, reference: &str, source: Source, out: &mut Vec<Finding>) {
        let Some(resolved) = resolve_against(self.url, reference).filter(is_http_scheme) else {
            return;
        };

        let target = finding_url(&resolved);
        for name in query_parameter_names(&resolved) {
            if is_valid_parameter(&name) {
                out.push(self.finding(target.clone(), &name, source));
            }
        }
    }
}

/// One independent way of finding parameters in a page
pub trait ExtractionStrategy: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Returns true if the strategy should run for this page
    fn applies_to(&self, _page: &Page<'_>) -> bool {
        true
    }

    /// Extracts findings from the page
    fn extract(&self, page: &Page<'_>) -> Vec<Finding>;
}

/// Ordered list of extraction strategies
pub struct Extractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(vec![
            Box::new(StructuralStrategy),
            Box::new(ScriptStrategy),
            Box::new(AbsoluteUrlStrategy),
            Box::new(CommentStrategy),
        ])
    }
}

impl Extractor {
    /// Creates an extractor running the given strategies in order
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Names of the configured strategies, in order
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Runs every applicable strategy over the page
    pub fn extract(&self, page: &Page<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();

        for strategy in &self.strategies {
            if !strategy.applies_to(page) {
                continue;
            }

            let found = strategy.extract(page);
            tracing::trace!(
                "{} strategy found {} candidates on {}",
                strategy.name(),
                found.len(),
                page.url
            );
            findings.extend(found);
        }

        findings
    }
}
