//! Parameter discovery in HTML documents
//!
//! Scans form fields, links and form actions for parameter names and seed
//! values. The scan is best effort: nothing in a page can make it fail, bad
//! input only yields fewer parameters.

use crate::{ParameterMap, FUZZ};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

/// Elements that can carry parameters.
const PARAMETER_ELEMENTS: &str = "a, form, input, select, textarea";

/// Base used to read the query of relative `href`/`action` references.
const PLACEHOLDER_BASE: &str = "http://placeholder.invalid/";

/// The attributes of an element that contribute parameters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSource<'a> {
    pub name: Option<&'a str>,
    pub value: Option<&'a str>,
    pub href: Option<&'a str>,
    pub action: Option<&'a str>,
}

impl<'a> ParameterSource<'a> {
    pub fn from_element(element: &ElementRef<'a>) -> Self {
        let attrs = element.value();
        Self {
            name: attrs.attr("name"),
            value: attrs.attr("value"),
            href: attrs.attr("href"),
            action: attrs.attr("action"),
        }
    }
}

/// Collects parameters from one HTML document.
pub struct ParameterExtractor {
    selector: Option<Selector>,
    base: Option<Url>,
}

impl ParameterExtractor {
    pub fn new() -> Self {
        Self {
            selector: Selector::parse(PARAMETER_ELEMENTS).ok(),
            base: Url::parse(PLACEHOLDER_BASE).ok(),
        }
    }

    pub fn extract(&self, html: &str) -> ParameterMap {
        let mut params = ParameterMap::new();

        let Some(selector) = &self.selector else {
            return params;
        };

        let document = Html::parse_document(html);
        for element in document.select(selector) {
            self.add_source(&mut params, ParameterSource::from_element(&element));
        }

        params.normalize();
        params
    }

    /// Merge one element's contribution into `params`.
    pub fn add_source(&self, params: &mut ParameterMap, source: ParameterSource<'_>) {
        if let Some(name) = source.name {
            let value = source.value.filter(|v| !v.is_empty()).unwrap_or(FUZZ);
            params.add(name, value);
        }

        for link in [source.href, source.action].into_iter().flatten() {
            self.add_link_query(params, link);
        }
    }

    fn add_link_query(&self, params: &mut ParameterMap, link: &str) {
        match Url::options().base_url(self.base.as_ref()).parse(link) {
            Ok(url) => {
                if let Some(query) = url.query() {
                    params.add_query(query);
                }
            }
            Err(e) => debug!("Skipping unparsable URL {:?}: {}", link, e),
        }
    }
}

impl Default for ParameterExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract parameters from an HTML string.
///
/// # Examples
///
/// ```rust
/// use param_miner::extract;
///
/// let params = extract(r#"<form action="/search?x=1"><input name="q"></form>"#);
/// assert_eq!(params.get("q").unwrap(), ["FUZZ"]);
/// assert_eq!(params.get("x").unwrap(), ["1"]);
/// ```
pub fn extract(html: &str) -> ParameterMap {
    ParameterExtractor::new().extract(html)
}

/// Extract parameters from a raw response body, decoding it lossily.
pub fn extract_bytes(body: &[u8]) -> ParameterMap {
    extract(&String::from_utf8_lossy(body))
}
