//! HTML parser for discovering links to crawl
//!
//! This module handles parsing HTML content to extract the same-host URLs
//! the crawl should visit next. Links are read from a fixed table of
//! element/attribute pairs that covers navigation, embedded resources,
//! framework routing attributes and metadata.

use crate::url::{crawl_key, is_http_scheme, is_same_host, resolve_against};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

/// How an attribute value is turned into candidate URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrKind {
    /// The value is one URL
    Single(&'static str),
    /// `srcset` syntax: comma-separated `url [descriptor]` candidates
    SrcSet,
    /// SVG link: `href` in any namespace, so `xlink:href` and plain `href` both count
    AnyHref,
}

const LINK_RULES: &[(&str, AttrKind)] = &[
    ("a[href]", AttrKind::Single("href")),
    ("script[src]", AttrKind::Single("src")),
    ("link[href]", AttrKind::Single("href")),
    ("img[src]", AttrKind::Single("src")),
    ("form[action]", AttrKind::Single("action")),
    ("iframe[src]", AttrKind::Single("src")),
    ("frame[src]", AttrKind::Single("src")),
    ("embed[src]", AttrKind::Single("src")),
    ("object[data]", AttrKind::Single("data")),
    ("video[src]", AttrKind::Single("src")),
    ("audio[src]", AttrKind::Single("src")),
    ("source[src]", AttrKind::Single("src")),
    ("track[src]", AttrKind::Single("src")),
    ("area[href]", AttrKind::Single("href")),
    ("base[href]", AttrKind::Single("href")),
    ("portal[src]", AttrKind::Single("src")),
    ("picture[srcset]", AttrKind::SrcSet),
    ("img[srcset]", AttrKind::SrcSet),
    ("[data-ajax-url]", AttrKind::Single("data-ajax-url")),
    ("[data-url]", AttrKind::Single("data-url")),
    ("[data-src]", AttrKind::Single("data-src")),
    ("[data-href]", AttrKind::Single("data-href")),
    ("meta[property='og:url']", AttrKind::Single("content")),
    ("meta[name='twitter:url']", AttrKind::Single("content")),
    ("meta[itemprop='url']", AttrKind::Single("content")),
    ("use", AttrKind::AnyHref),
    ("image", AttrKind::AnyHref),
    ("[ng-href]", AttrKind::Single("ng-href")),
    ("[x-route]", AttrKind::Single("x-route")),
];

static LINK_SELECTORS: LazyLock<Vec<(Selector, AttrKind)>> = LazyLock::new(|| {
    LINK_RULES
        .iter()
        .map(|(selector, kind)| {
            (
                Selector::parse(selector).expect("hardcoded selector is valid"),
                *kind,
            )
        })
        .collect()
});

/// Discovers the links of an HTML page that the crawl may follow
///
/// # Link Extraction Rules
///
/// **Include:**
/// - Every URL-bearing attribute in the link table, resolved against `base`
///
/// **Exclude:**
/// - Anything that does not resolve to `http`/`https`
/// - URLs on a different host (or port) than `base`
/// - Duplicates within the page (compared without the fragment)
///
/// # Example
///
/// ```
/// use paraxm::crawler::discover_links;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/").unwrap();
/// let html = r#"<a href="/page">Page</a><a href="https://other.com/">Away</a>"#;
/// let links = discover_links(&base, html);
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].as_str(), "https://example.com/page");
/// ```
pub fn discover_links(base: &Url, html: &str) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for (selector, kind) in LINK_SELECTORS.iter() {
        for element in document.select(selector) {
            for value in attribute_values(&element, *kind) {
                let Some(url) = resolve_link(value, base) else {
                    continue;
                };

                if seen.insert(crawl_key(&url)) {
                    links.push(url);
                }
            }
        }
    }

    links
}

/// Reads the candidate URL strings of an element for one rule
fn attribute_values<'a>(element: &ElementRef<'a>, kind: AttrKind) -> Vec<&'a str> {
    let value = element.value();

    match kind {
        AttrKind::Single(attr) => value.attr(attr).into_iter().collect(),
        AttrKind::SrcSet => value
            .attr("srcset")
            .map(split_srcset)
            .unwrap_or_default(),
        AttrKind::AnyHref => value
            .attrs()
            .filter(|(name, _)| *name == "href")
            .map(|(_, v)| v)
            .take(1)
            .collect(),
    }
}

/// Splits a `srcset` value into its URLs, dropping width/density descriptors
fn split_srcset(srcset: &str) -> Vec<&str> {
    srcset
        .split(',')
        .filter_map(|candidate| candidate.split_whitespace().next())
        .collect()
}

/// Resolves a link to an absolute URL and validates it
///
/// Returns None if the link should not be followed.
fn resolve_link(href: &str, base: &Url) -> Option<Url> {
    let url = resolve_against(base, href)?;

    if !is_http_scheme(&url) || !is_same_host(&url, base) {
        return None;
    }

    Some(url)
}
