use crate::core::extract::{detect_failure_page, normalize_key};
use crate::domain::model::ChartResult;
use crate::domain::ports::Extractor;
use crate::utils::error::{ChartError, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use url::Url;

/// Candidate selectors for the results container, most specific first.
const CONTAINER_SELECTORS: &[&str] = &["#chart-results", ".chart-results", ".hd-chart", ".results"];

/// Candidate selectors for the chart image container.
const IMAGE_SELECTORS: &[&str] = &[
    "#bodygraph img",
    ".bodygraph img",
    ".chart-image img",
    "img.bodygraph",
];

/// Parses the site's result page DOM into a `ChartResult`.
///
/// The page layout: a results container holding a list of colon-delimited
/// `key: value` properties, "Design" and "Personality" sections marked by
/// header text, a chart image, and a hidden input carrying the base64
/// download token.
pub struct HtmlExtractor {
    base: Url,
}

impl HtmlExtractor {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    fn container<'a>(&self, document: &'a Html) -> ElementRef<'a> {
        for selector_str in CONTAINER_SELECTORS {
            if let Ok(selector) = Selector::parse(selector_str) {
                if let Some(el) = document.select(&selector).next() {
                    return el;
                }
            }
        }
        document.root_element()
    }

    fn extract_properties(&self, container: ElementRef<'_>) -> BTreeMap<String, String> {
        let mut properties = BTreeMap::new();
        let Ok(selector) = Selector::parse("li") else {
            return properties;
        };

        for item in container.select(&selector) {
            let text = item.text().collect::<String>();
            // Split on the first colon only; values may contain colons
            // themselves (e.g. a birth time).
            if let Some((raw_key, raw_value)) = text.split_once(':') {
                let key = normalize_key(raw_key);
                let value = raw_value.trim().to_string();
                if !key.is_empty() && !value.is_empty() {
                    properties.entry(key).or_insert(value);
                }
            }
        }

        properties
    }

    /// Collect the activation entries of the section whose header text
    /// equals `landmark` ("Design" or "Personality"). The section is the
    /// header's parent element; entries are its list items, or its bare
    /// text nodes when the layout has no list.
    fn extract_section(&self, document: &Html, landmark: &str) -> Vec<String> {
        let Ok(header_selector) = Selector::parse("h1,h2,h3,h4,h5,h6,strong,th,dt") else {
            return Vec::new();
        };

        for header in document.select(&header_selector) {
            let header_text = header.text().collect::<String>();
            if !header_text.trim().eq_ignore_ascii_case(landmark) {
                continue;
            }
            let Some(section) = header.parent().and_then(ElementRef::wrap) else {
                continue;
            };

            let mut entries = Vec::new();
            if let Ok(item_selector) = Selector::parse("li") {
                for item in section.select(&item_selector) {
                    let text = item.text().collect::<String>().trim().to_string();
                    if !text.is_empty() && !text.eq_ignore_ascii_case(landmark) {
                        entries.push(text);
                    }
                }
            }
            if entries.is_empty() {
                for text in section.text() {
                    let text = text.trim();
                    if !text.is_empty() && !text.eq_ignore_ascii_case(landmark) {
                        entries.push(text.to_string());
                    }
                }
            }
            if !entries.is_empty() {
                return entries;
            }
        }

        Vec::new()
    }

    fn extract_image_url(&self, document: &Html) -> Option<String> {
        for selector_str in IMAGE_SELECTORS {
            let Ok(selector) = Selector::parse(selector_str) else {
                continue;
            };
            if let Some(img) = document.select(&selector).next() {
                if let Some(src) = img.value().attr("src") {
                    return self.absolutize(src);
                }
            }
        }
        None
    }

    fn absolutize(&self, src: &str) -> Option<String> {
        if src.starts_with("http://") || src.starts_with("https://") {
            return Some(src.to_string());
        }
        self.base.join(src).ok().map(|u| u.to_string())
    }

    fn extract_download_token(&self, document: &Html, raw: &str) -> Option<String> {
        if let Ok(selector) = Selector::parse("input[type='hidden']") {
            for input in document.select(&selector) {
                let attrs = input.value();
                let named_token = [attrs.attr("name"), attrs.attr("id")]
                    .iter()
                    .flatten()
                    .any(|v| v.to_lowercase().contains("token"));
                if named_token {
                    if let Some(value) = attrs.attr("value") {
                        if !value.is_empty() {
                            return Some(value.to_string());
                        }
                    }
                }
            }
        }

        // Regex fallback for markup the DOM route misses (e.g. the token
        // embedded in an inline script).
        if let Ok(re) = Regex::new(r#"[Tt]oken['"]?\s*[:=]\s*['"]([A-Za-z0-9+/=]{8,})['"]"#) {
            if let Some(caps) = re.captures(raw) {
                return Some(caps[1].to_string());
            }
        }

        None
    }
}

impl Extractor for HtmlExtractor {
    fn extract(&self, raw: &str) -> Result<ChartResult> {
        let document = Html::parse_document(raw);

        let visible_text = document.root_element().text().collect::<String>();
        if let Some(phrase) = detect_failure_page(&visible_text) {
            return Err(ChartError::Extraction {
                message: format!("failure page detected ('{}')", phrase),
            });
        }

        let container = self.container(&document);
        let properties = self.extract_properties(container);
        let design_activations = self.extract_section(&document, "Design");
        let personality_activations = self.extract_section(&document, "Personality");
        let chart_image_url = self.extract_image_url(&document);
        let download_token = self.extract_download_token(&document, raw);

        Ok(ChartResult {
            properties,
            design_activations,
            personality_activations,
            chart_image_url,
            download_token,
        })
    }
}
