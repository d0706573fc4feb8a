//! Structural HTML scan
//!
//! Finds named form fields and the query parameters of URLs carried by
//! anchors and other URL-bearing attributes.

use crate::extract::{is_valid_parameter, ExtractionStrategy, Finding, Page, Source};
use crate::url::{finding_url, is_http_scheme, resolve_against};
use scraper::{Html, Selector};
use std::sync::LazyLock;

/// Attributes whose values are treated as URLs on any element
const URL_ATTRIBUTES: &[&str] = &["src", "data", "action", "formaction", "ping"];

static FORM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("form").expect("hardcoded selector is valid"));

static FIELD_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("input, select, textarea").expect("hardcoded selector is valid")
});

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("hardcoded selector is valid"));

static ATTRIBUTE_SELECTORS: LazyLock<Vec<(&'static str, Selector)>> = LazyLock::new(|| {
    URL_ATTRIBUTES
        .iter()
        .map(|attr| {
            let selector =
                Selector::parse(&format!("[{}]", attr)).expect("hardcoded selector is valid");
            (*attr, selector)
        })
        .collect()
});

/// Forms, links and URL attributes of HTML pages
pub struct StructuralStrategy;

impl ExtractionStrategy for StructuralStrategy {
    fn name(&self) -> &'static str {
        "structural"
    }

    fn applies_to(&self, page: &Page<'_>) -> bool {
        page.is_html()
    }

    fn extract(&self, page: &Page<'_>) -> Vec<Finding> {
        let document = Html::parse_document(page.body);
        let mut findings = Vec::new();

        extract_forms(&document, page, &mut findings);

        for link in document.select(&LINK_SELECTOR) {
            if let Some(href) = link.value().attr("href") {
                page.push_query_findings(href, Source::HtmlLink, &mut findings);
            }
        }

        for (attr, selector) in ATTRIBUTE_SELECTORS.iter() {
            for element in document.select(selector) {
                if let Some(value) = element.value().attr(attr) {
                    page.push_query_findings(value, Source::HtmlAttr, &mut findings);
                }
            }
        }

        findings
    }
}

/// Reports every named field of every form against the form's action URL
fn extract_forms(document: &Html, page: &Page<'_>, findings: &mut Vec<Finding>) {
    for form in document.select(&FORM_SELECTOR) {
        let action = form.value().attr("action").unwrap_or("");
        let method = form
            .value()
            .attr("method")
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or("GET")
            .to_uppercase();

        let action_url = resolve_against(page.url, action)
            .filter(is_http_scheme)
            .unwrap_or_else(|| page.url.clone());
        let target = finding_url(&action_url);

        for field in form.select(&FIELD_SELECTOR) {
            let Some(name) = field.value().attr("name") else {
                continue;
            };

            if is_valid_parameter(name) {
                findings.push(page.finding_with_method(
                    target.clone(),
                    name,
                    Source::HtmlForm,
                    &method,
                ));
            }
        }
    }
}
