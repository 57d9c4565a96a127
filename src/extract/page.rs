//! Access to a fetched page's DOM
//!
//! The body is kept as a string and parsed on demand, because the parsed
//! document is not `Send` and must never be held across an `.await`.

use scraper::{Html, Selector};
use serde_json::Value;

/// Selector of the inline Next.js payload
const NEXT_DATA_SELECTOR: &str = "script#__NEXT_DATA__";

/// Selector of embedded structured-data blocks
const STRUCTURED_DATA_SELECTOR: &str = r#"script[type="application/ld+json"]"#;

/// A rendered page as delivered by the fetch layer
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Final URL of the page
    pub url: String,

    /// Rendered HTML
    pub body: String,
}

impl RenderedPage {
    /// Wraps a fetched body
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }

    /// Returns the text content of the first element matching `selector`
    ///
    /// Returns `None` if the selector is invalid, nothing matches, or the
    /// matching element has only whitespace in it.
    pub fn extract(&self, selector: &str) -> Option<String> {
        let selector = Selector::parse(selector).ok()?;
        let document = Html::parse_document(&self.body);

        document
            .select(&selector)
            .next()
            .map(|element| element.text().collect::<String>())
            .filter(|text| !text.trim().is_empty())
    }

    /// Parses the inline `__NEXT_DATA__` payload
    ///
    /// # Returns
    ///
    /// * `Some(Value)` - The parsed payload
    /// * `None` - The page has no payload, or it is not valid JSON
    pub fn next_data(&self) -> Option<Value> {
        let raw = self.extract(NEXT_DATA_SELECTOR)?;
        match serde_json::from_str(raw.trim()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Failed to parse __NEXT_DATA__ on {}: {}", self.url, e);
                None
            }
        }
    }

    /// Parses every structured-data block on the page
    ///
    /// Blocks that fail to parse are skipped. Top-level arrays are flattened so
    /// the result is a list of objects.
    pub fn structured_blocks(&self) -> Vec<Value> {
        let selector = match Selector::parse(STRUCTURED_DATA_SELECTOR) {
            Ok(sel) => sel,
            Err(_) => return Vec::new(),
        };
        let document = Html::parse_document(&self.body);

        let mut blocks = Vec::new();
        for element in document.select(&selector) {
            let raw = element.text().collect::<String>();
            match serde_json::from_str::<Value>(raw.trim()) {
                Ok(Value::Array(items)) => blocks.extend(items),
                Ok(value) => blocks.push(value),
                Err(e) => tracing::debug!("Skipping unparseable ld+json block on {}: {}", self.url, e),
            }
        }
        blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: &str) -> RenderedPage {
        RenderedPage::new("https://www.catho.com.br/vagas/", body)
    }

    #[test]
    fn test_extract_text() {
        let p = page(r#"<html><body><h1 class="t">  Vaga  </h1></body></html>"#);
        assert_eq!(p.extract("h1.t"), Some("  Vaga  ".to_string()));
        assert_eq!(p.extract("h2"), None);
        assert_eq!(p.extract("[[invalid"), None);
    }

    #[test]
    fn test_next_data() {
        let p = page(
            r#"<html><head><script id="__NEXT_DATA__" type="application/json">{"props":{"a":1}}</script></head></html>"#,
        );
        let data = p.next_data().unwrap();
        assert_eq!(data["props"]["a"], 1);
    }

    #[test]
    fn test_next_data_missing_or_invalid() {
        assert!(page("<html><body>nothing</body></html>").next_data().is_none());
        assert!(page(r#"<script id="__NEXT_DATA__">{not json</script>"#)
            .next_data()
            .is_none());
    }

    #[test]
    fn test_structured_blocks() {
        let p = page(
            r#"<html><head>
            <script type="application/ld+json">{"@type":"Organization","name":"X"}</script>
            <script type="application/ld+json">[{"@type":"JobPosting"},{"@type":"WebSite"}]</script>
            <script type="application/ld+json">{broken</script>
            </head></html>"#,
        );
        let blocks = p.structured_blocks();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1]["@type"], "JobPosting");
    }
}
