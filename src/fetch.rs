use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::ScraperConfig;
use crate::error::{Result, ScrapeError};

/// Raw result of fetching a posting.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchedPage {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Performs a single GET per call. No retries.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url`. The request is abandoned with [`ScrapeError::Cancelled`]
    /// if `cancel` fires before response headers arrive; once a response is
    /// in hand its body is read to the end.
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<FetchedPage>;
}

/// [`PageFetcher`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<FetchedPage> {
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(ScrapeError::Cancelled),
            response = self.client.get(url).send() => response?,
        };

        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(FetchedPage {
            status,
            body: body.to_vec(),
        })
    }
}
