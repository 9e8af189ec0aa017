use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error};

use nf_core::{Error, Result};

use crate::config::GatewayConfig;

/// Longest upstream error body kept for logging.
const MAX_ERROR_BODY_BYTES: usize = 8 * 1024;

#[async_trait]
pub trait UpstreamSearch: Send + Sync {
    /// Runs one search for the given space separated terms and returns the
    /// upstream envelope as-is.
    async fn search(&self, terms: &str) -> Result<Value>;
}

/// Client for the NewsData.io `news` endpoint.
pub struct NewsDataClient {
    http: Client,
    config: GatewayConfig,
}

impl NewsDataClient {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent("nf-gateway")
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            config: config.normalized(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/news", self.config.upstream_url)
    }
}

#[async_trait]
impl UpstreamSearch for NewsDataClient {
    async fn search(&self, terms: &str) -> Result<Value> {
        let size = self.config.page_size.to_string();
        debug!(
            endpoint = %self.endpoint(),
            q = terms,
            language = %self.config.language,
            size = %size,
            "requesting upstream"
        );

        let response = self
            .http
            .get(self.endpoint())
            .query(&[
                ("apikey", self.config.api_key.as_str()),
                ("q", terms),
                ("language", self.config.language.as_str()),
                ("size", size.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::UpstreamUnreachable(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = read_limited_text(response).await;
            error!(status = status.as_u16(), body = %body, "news API returned an error");
            return Err(Error::UpstreamRequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| Error::InvalidResponse(format!("undecodable upstream response: {}", e.without_url())))
    }
}

/// Reads at most [`MAX_ERROR_BODY_BYTES`] of the body, chunk by chunk.
async fn read_limited_text(mut response: reqwest::Response) -> String {
    let mut body = Vec::new();
    while body.len() < MAX_ERROR_BODY_BYTES {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                let take = chunk.len().min(MAX_ERROR_BODY_BYTES - body.len());
                body.extend_from_slice(&chunk[..take]);
            }
            Ok(None) => break,
            Err(e) => return format!("<failed to read error body: {}>", e.without_url()),
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}
