use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

use nf_core::{Error, ErrorBody, KeywordSet, NewsSource, QueryResult, Result};

pub const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:8002";
const NEWS_PATH: &str = "/api/news";

/// HTTP client for the gateway's `/api/news` endpoint.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: Client,
    endpoint: Url,
}

impl GatewayClient {
    /// `timeout` of `None` keeps the transport's default.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid gateway URL {base_url}: {e}")))?;
        let endpoint = base
            .join(NEWS_PATH)
            .map_err(|e| Error::Config(format!("invalid gateway URL {base_url}: {e}")))?;

        let mut builder = Client::builder().user_agent("nf-client");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The request URL for a query; no `keywords` parameter when `None`.
    pub fn request_url(&self, keywords: Option<&KeywordSet>) -> Url {
        let mut url = self.endpoint.clone();
        if let Some(keywords) = keywords {
            url.query_pairs_mut()
                .append_pair("keywords", &keywords.to_search_terms());
        }
        url
    }
}

#[async_trait]
impl NewsSource for GatewayClient {
    fn name(&self) -> &str {
        "gateway"
    }

    async fn query(&self, keywords: Option<&KeywordSet>) -> Result<QueryResult> {
        let url = self.request_url(keywords);
        debug!(%url, "querying gateway");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .map(|b| b.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).to_string());
            return Err(Error::GatewayStatus {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice::<QueryResult>(&bytes)
            .map_err(|e| Error::InvalidResponse(format!("undecodable gateway response: {e}")))
    }
}
