use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use reqwest::header::{self, HeaderMap, HeaderValue};

use crate::config;
use crate::error::FetchError;

/// Something that can hand back the current rate page as text.
#[async_trait]
pub trait RatePage: Send + Sync {
    async fn load(&self) -> Result<String, FetchError>;
}

pub struct HttpRatePage {
    client: Client,
    url: String,
}

impl HttpRatePage {
    pub fn new(url: impl Into<String>) -> reqwest::Result<Self> {
        Self::with_builder(Client::builder(), url)
    }

    /// Adds the fixed headers and timeout on top of `builder`.
    pub fn with_builder(builder: ClientBuilder, url: impl Into<String>) -> reqwest::Result<Self> {
        let client = builder
            .default_headers(default_headers())
            .timeout(config::REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RatePage for HttpRatePage {
    async fn load(&self) -> Result<String, FetchError> {
        let resp = self.client.get(&self.url).send().await?;
        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status()));
        }

        let text = resp.text().await?;

        Ok(text)
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static(config::ACCEPT));
    headers.insert(header::USER_AGENT, HeaderValue::from_static(config::USER_AGENT));
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static(config::ACCEPT_LANGUAGE),
    );
    headers
}
