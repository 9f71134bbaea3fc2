use scraper::{ElementRef, Html, Selector};

use crate::crawler::error::CrawlError;

/// Snapshot of a page's markup after client-side rendering
pub struct RenderedDocument {
    html: Html,
}

impl RenderedDocument {
    /// Parse rendered markup into a queryable document
    pub fn parse(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
        }
    }

    /// All elements matching `selector`, in document order
    pub fn select<'a>(&'a self, selector: &'a Selector) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.html.select(selector)
    }

    /// Trimmed text of every element matching `selector`, in document order
    pub fn select_texts(&self, selector: &Selector) -> Vec<String> {
        self.select(selector).map(element_text).collect()
    }
}

/// Visible text of an element with whitespace runs collapsed and ends trimmed
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Compile a CSS selector, keeping the offending text in the error
pub fn parse_selector(selector: &str) -> Result<Selector, CrawlError> {
    Selector::parse(selector).map_err(|e| CrawlError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_texts_trims_and_collapses() {
        let doc = RenderedDocument::parse(
            "<ul><li>  One  </li><li>Two\n   <b>words</b></li><li></li></ul>",
        );
        let selector = parse_selector("li").unwrap();

        assert_eq!(doc.select_texts(&selector), vec!["One", "Two words", ""]);
    }

    #[test]
    fn test_invalid_selector() {
        let err = parse_selector("div[").unwrap_err();
        assert!(matches!(err, CrawlError::InvalidSelector { ref selector, .. } if selector == "div["));
    }
}
