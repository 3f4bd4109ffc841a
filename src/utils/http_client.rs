use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::debug;

use crate::errors::{AppError, AppResult};

/// HTTP GET capability used by the listing sources
///
/// Implementations return the response body as text; transport failures and
/// non-success statuses are errors.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Fetch URL and return text content
    async fn fetch_text(&self, url: &str) -> AppResult<String>;
}

/// Default implementation of HttpClient using reqwest
pub struct StandardHttpClient {
    client: Client,
}

impl StandardHttpClient {
    /// Create new HTTP client with both a connection and a total request timeout
    pub fn with_timeouts(connect_timeout: Duration, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }

    /// Reject non-success responses and read the body
    async fn process_response_to_text(response: Response, url: &str) -> AppResult<String> {
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::http_status(
                status.as_u16(),
                format!(
                    "{} - URL: {}",
                    status.canonical_reason().unwrap_or("Unknown"),
                    url
                ),
            ));
        }

        let content = response.text().await?;
        debug!("Fetched {} bytes from {}", content.len(), url);
        Ok(content)
    }
}

#[async_trait]
impl HttpClient for StandardHttpClient {
    async fn fetch_text(&self, url: &str) -> AppResult<String> {
        debug!("Fetching text content from: {}", url);

        let response = self.client.get(url).send().await?;

        Self::process_response_to_text(response, url).await
    }
}
