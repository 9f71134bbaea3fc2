use anyhow::{Result, Context};
use async_trait::async_trait;
use thirtyfour::prelude::*;
use std::time::Duration;
use tracing::{debug, error};

use crate::browser::DocumentProvider;
use crate::cli::config::BrowserSettings;

/// Interval between element polls while waiting for a selector
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Browser session backed by a WebDriver endpoint
pub struct BrowserSession {
    /// WebDriver instance, `None` once closed
    driver: Option<WebDriver>,
}

impl BrowserSession {
    /// Connect to the configured WebDriver endpoint and start headless Chrome
    pub async fn connect(config: &BrowserSettings) -> Result<Self> {
        let mut caps = DesiredCapabilities::chrome();

        if config.headless {
            caps.set_headless()?;
        }
        caps.add_chrome_arg("--no-sandbox")?;
        caps.add_chrome_arg("--disable-dev-shm-usage")?;

        let driver = WebDriver::new(&config.webdriver_url, caps).await
            .context(format!("Failed to connect to WebDriver at {}", config.webdriver_url))?;

        driver.set_page_load_timeout(Duration::from_secs(config.page_load_timeout_secs)).await?;

        debug!("Browser session started via {}", config.webdriver_url);

        Ok(Self { driver: Some(driver) })
    }

    fn driver(&self) -> Result<&WebDriver> {
        self.driver.as_ref().context("Browser session already closed")
    }
}

#[async_trait]
impl DocumentProvider for BrowserSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        debug!("Navigating to: {}", url);
        self.driver()?.goto(url).await
            .context(format!("Failed to navigate to URL: {}", url))?;

        Ok(())
    }

    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<bool> {
        let found = self.driver()?
            .query(By::Css(selector))
            .wait(timeout, POLL_INTERVAL)
            .exists()
            .await;

        match found {
            Ok(found) => {
                if !found {
                    debug!("Selector '{}' not present after {:?}", selector, timeout);
                }
                Ok(found)
            }
            Err(e) if is_wait_timeout(&e) => {
                debug!("Selector '{}' not present after {:?}: {}", selector, timeout, e);
                Ok(false)
            }
            Err(e) => Err(e).context(format!("Failed while waiting for selector '{}'", selector)),
        }
    }

    async fn page_source(&mut self) -> Result<String> {
        let source = self.driver()?.source().await
            .context("Failed to get page source")?;

        Ok(source)
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(driver) = self.driver.take() {
            driver.quit().await
                .context("Failed to close browser session")?;
            debug!("Browser session closed");
        }

        Ok(())
    }
}

/// Errors that mean the element never showed up, as opposed to a broken session
fn is_wait_timeout(error: &WebDriverError) -> bool {
    matches!(error, WebDriverError::NoSuchElement(_) | WebDriverError::Timeout(_))
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // Only reachable when `close` was skipped, e.g. on panic or cancellation
        if let Some(driver) = self.driver.take() {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(async move {
                        if let Err(e) = driver.quit().await {
                            error!("Error closing browser session during drop: {}", e);
                        }
                    });
                }
                Err(_) => error!("Browser session dropped outside a runtime; WebDriver session left open"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_missing_elements_count_as_timeout() {
        assert!(is_wait_timeout(&WebDriverError::NoSuchElement("a.page".into())));
        assert!(is_wait_timeout(&WebDriverError::Timeout("query".into())));

        assert!(!is_wait_timeout(&WebDriverError::NoSuchWindow("gone".into())));
        assert!(!is_wait_timeout(&WebDriverError::CustomError("invalid session id".into())));
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(!is_wait_timeout(&WebDriverError::IoError(io)));
    }
}
