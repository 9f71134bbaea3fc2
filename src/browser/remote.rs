use anyhow::{Result, Context};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Serialize, Deserialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::browser::{document, DocumentProvider, RenderedDocument};
use crate::cli::config::BrowserSettings;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResponse {
    pub success: bool,
    pub url: String,
    #[serde(default)]
    pub content: String,
    pub error: Option<String>,
}

/// Provider that delegates rendering to an HTTP service.
///
/// The service loads the URL in its own browser and answers `POST /render`
/// with the rendered markup, optionally after waiting for a selector.
pub struct RemoteRenderer {
    client: Client,
    base_url: String,
    current_url: Option<String>,
    content: Option<String>,
}

impl RemoteRenderer {
    pub fn new(config: &BrowserSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.remote_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.remote_url.trim_end_matches('/').to_string(),
            current_url: None,
            content: None,
        })
    }

    async fn render(&self, request: &RenderRequest) -> Result<RenderResponse> {
        let endpoint = format!("{}/render", self.base_url);

        debug!("Sending request to rendering service: {}", request.url);

        let response = self.client.post(&endpoint)
            .json(request)
            .send()
            .await
            .context("Failed to send request to rendering service")?
            .error_for_status()
            .context("Rendering service returned an error status")?
            .json::<RenderResponse>()
            .await
            .context("Failed to parse rendering service response")?;

        if !response.success {
            if let Some(error) = &response.error {
                error!("Rendering service error: {}", error);
                anyhow::bail!("Rendering service error: {}", error);
            } else {
                anyhow::bail!("Rendering service failed with unknown error");
            }
        }

        Ok(response)
    }
}

#[async_trait]
impl DocumentProvider for RemoteRenderer {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        let request = RenderRequest {
            url: url.to_string(),
            wait_selector: None,
            wait_timeout_ms: None,
        };
        let response = self.render(&request).await?;

        self.current_url = Some(url.to_string());
        self.content = Some(response.content);

        Ok(())
    }

    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<bool> {
        let parsed = document::parse_selector(selector)?;
        let present = |content: &str| RenderedDocument::parse(content).select(&parsed).next().is_some();

        if self.content.as_deref().map_or(false, present) {
            return Ok(true);
        }

        // Re-render and let the service wait on its side
        let url = self.current_url.clone().context("No page loaded")?;
        let request = RenderRequest {
            url,
            wait_selector: Some(selector.to_string()),
            wait_timeout_ms: Some(timeout.as_millis() as u64),
        };
        let response = self.render(&request).await?;
        let found = present(&response.content);
        self.content = Some(response.content);

        Ok(found)
    }

    async fn page_source(&mut self) -> Result<String> {
        self.content.clone().context("No page loaded")
    }

    async fn close(&mut self) -> Result<()> {
        self.current_url = None;
        self.content = None;
        Ok(())
    }
}
