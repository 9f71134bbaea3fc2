pub mod document;
pub mod remote;
pub mod session;

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

// Re-export common types
pub use document::RenderedDocument;
pub use remote::RemoteRenderer;
pub use session::BrowserSession;

/// Source of fully rendered pages.
///
/// One provider is one stateful session: it holds a single current page and
/// must not be navigated concurrently. Callers own it exclusively and must
/// call [`DocumentProvider::close`] when done.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentProvider: Send {
    /// Load `url` and make it the current page
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Wait until an element matching `selector` is present on the current page.
    ///
    /// Returns `Ok(false)` when `timeout` elapses first.
    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<bool>;

    /// Markup of the current page after rendering
    async fn page_source(&mut self) -> Result<String>;

    /// Release the underlying session
    async fn close(&mut self) -> Result<()>;
}


#[cfg(test)]
mod tests {
    use super::testing::StaticPages;
    use super::*;

    #[tokio::test]
    async fn test_static_pages_wait_checks_current_page() {
        let mut provider = StaticPages::default()
            .with_page("https://example.com/a", r#"<nav><a href="/2">2</a></nav>"#)
            .with_page("https://example.com/b", "<p>empty</p>");
        let timeout = Duration::from_secs(1);

        assert!(!provider.wait_for_selector("nav a", timeout).await.unwrap());

        provider.navigate("https://example.com/a").await.unwrap();
        assert!(provider.wait_for_selector("nav a", timeout).await.unwrap());

        provider.navigate("https://example.com/b").await.unwrap();
        assert!(!provider.wait_for_selector("nav a", timeout).await.unwrap());
        assert!(provider.wait_for_selector("p", timeout).await.unwrap());
    }
}
