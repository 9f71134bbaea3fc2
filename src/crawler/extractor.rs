use scraper::Selector;
use std::fmt;
use tracing::debug;

use crate::browser::document::{element_text, parse_selector};
use crate::browser::RenderedDocument;
use crate::cli::config::TargetSettings;
use crate::crawler::error::CrawlError;

/// One card as scraped, before view normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub title: String,
    pub raw_views: String,
}

/// Why a card was left out of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingTitle,
    EmptyTitle,
    MissingViews,
}

/// A card dropped during extraction, by its position among the page's cards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardSkip {
    pub card: usize,
    pub reason: SkipReason,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::MissingTitle => "no title link",
            Self::EmptyTitle => "empty title",
            Self::MissingViews => "no view count element",
        };
        f.write_str(text)
    }
}

/// Everything extracted from one listing page
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageExtraction {
    pub entries: Vec<RawEntry>,
    pub skipped: Vec<CardSkip>,
}

impl PageExtraction {
    pub fn cards_seen(&self) -> usize {
        self.entries.len() + self.skipped.len()
    }
}

/// Locates movie cards on a rendered listing page
pub struct PageExtractor {
    card: Selector,
    title: Selector,
    views: Selector,
}

impl PageExtractor {
    /// Compile the card, title and view selectors
    pub fn new(target: &TargetSettings) -> Result<Self, CrawlError> {
        Ok(Self {
            card: parse_selector(&target.card_selector)?,
            title: parse_selector(&target.title_selector)?,
            views: parse_selector(&target.views_selector)?,
        })
    }

    /// Pull (title, raw views) pairs from every card, in document order
    pub fn extract(&self, document: &RenderedDocument) -> PageExtraction {
        let mut extraction = PageExtraction::default();

        for (index, card) in document.select(&self.card).enumerate() {
            let title = match card.select(&self.title).next() {
                Some(link) => element_text(link),
                None => {
                    extraction.skipped.push(CardSkip { card: index, reason: SkipReason::MissingTitle });
                    continue;
                }
            };
            if title.is_empty() {
                extraction.skipped.push(CardSkip { card: index, reason: SkipReason::EmptyTitle });
                continue;
            }

            // The view count is the last span in the card's stats row
            let raw_views = match card.select(&self.views).last() {
                Some(element) => element_text(element),
                None => {
                    extraction.skipped.push(CardSkip { card: index, reason: SkipReason::MissingViews });
                    continue;
                }
            };

            extraction.entries.push(RawEntry { title, raw_views });
        }

        for skip in &extraction.skipped {
            debug!("Skipped card {}: {}", skip.card, skip.reason);
        }

        extraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::config::ScraperConfig;

    fn card(title: &str, views: &str) -> String {
        format!(
            r#"<div class="flex flex-col justify-between overflow-hidden">
                 <a href="/movie/{title}"> {title} </a>
                 <div class="flex items-center"><span>icon</span><span>{views}</span></div>
               </div>"#,
        )
    }

    fn extractor() -> PageExtractor {
        PageExtractor::new(&ScraperConfig::default().target).unwrap()
    }

    #[test]
    fn test_extracts_cards_in_order() {
        let html = format!("<body>{}{}</body>", card("Alpha", "214K"), card("Beta", "3,402"));
        let extraction = extractor().extract(&RenderedDocument::parse(&html));

        assert_eq!(
            extraction.entries,
            vec![
                RawEntry { title: "Alpha".into(), raw_views: "214K".into() },
                RawEntry { title: "Beta".into(), raw_views: "3,402".into() },
            ]
        );
        assert!(extraction.skipped.is_empty());
    }

    #[test]
    fn test_skips_incomplete_cards() {
        let no_title = r#"<div class="flex flex-col justify-between overflow-hidden">
                            <div class="flex items-center"><span>5k</span></div></div>"#;
        let blank_title = r#"<div class="flex flex-col justify-between overflow-hidden">
                               <a href="/x">   </a>
                               <div class="flex items-center"><span>5k</span></div></div>"#;
        let no_views = r#"<div class="flex flex-col justify-between overflow-hidden">
                            <a href="/y">Gamma</a></div>"#;
        let html = format!("{}{}{}{}", no_title, card("Delta", "1"), blank_title, no_views);

        let extraction = extractor().extract(&RenderedDocument::parse(&html));

        assert_eq!(extraction.entries.len(), 1);
        assert_eq!(extraction.entries[0].title, "Delta");
        assert_eq!(
            extraction.skipped,
            vec![
                CardSkip { card: 0, reason: SkipReason::MissingTitle },
                CardSkip { card: 2, reason: SkipReason::EmptyTitle },
                CardSkip { card: 3, reason: SkipReason::MissingViews },
            ]
        );
        assert_eq!(extraction.cards_seen(), 4);
    }

    #[test]
    fn test_empty_page_is_not_an_error() {
        let extraction = extractor().extract(&RenderedDocument::parse("<p>No results</p>"));
        assert_eq!(extraction, PageExtraction::default());
    }

    #[test]
    fn test_rejects_invalid_selector() {
        let mut target = ScraperConfig::default().target;
        target.card_selector = ":::".to_string();
        assert!(PageExtractor::new(&target).is_err());
    }
}
