//! Postmark template API client
//!
//! `TemplateApi` is the seam between the sync manager and the provider;
//! `PostmarkClient` implements it over reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde_json::Value;

use crate::error::{EmlError, Result};
use crate::postmark::types::{TemplateListing, TemplatePayload};

/// Postmark API base URL
pub const POSTMARK_API_URL: &str = "https://api.postmarkapp.com";

/// Header carrying the server token
const SERVER_TOKEN_HEADER: &str = "X-Postmark-Server-Token";

/// Largest listing fetched in a single call
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Remote template operations used by the sync run
#[async_trait]
pub trait TemplateApi: Send + Sync {
    /// `GET /templates?offset=..&count=..`
    async fn list_templates(&self, offset: u32, count: u32) -> Result<TemplateListing>;

    /// `POST /templates`
    async fn create_template(&self, payload: &TemplatePayload) -> Result<Value>;

    /// `PUT /templates/{alias}`
    async fn update_template(&self, alias: &str, payload: &TemplatePayload) -> Result<Value>;
}

/// Configuration for the Postmark client
#[derive(Debug, Clone)]
pub struct PostmarkConfig {
    pub base_url: String,
    pub page_size: u32,
    pub timeout: Duration,
}

impl Default for PostmarkConfig {
    fn default() -> Self {
        Self {
            base_url: POSTMARK_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Postmark API client sharing one connection pool for the whole run
pub struct PostmarkClient {
    client: Client,
    base_url: Url,
    server_token: String,
}

impl PostmarkClient {
    pub fn new(server_token: impl Into<String>, config: &PostmarkConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| EmlError::Config(format!("Invalid Postmark base URL '{}': {}", config.base_url, e)))?;

        Ok(Self {
            client,
            base_url,
            server_token: server_token.into(),
        })
    }

    /// Build a URL by appending path segments to the base URL
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| EmlError::Config(format!("Postmark base URL '{}' cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(SERVER_TOKEN_HEADER, &self.server_token)
            .header("Accept", "application/json")
    }

    /// Send a request, turning non-success statuses into `EmlError::Api`
    async fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(EmlError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl TemplateApi for PostmarkClient {
    async fn list_templates(&self, offset: u32, count: u32) -> Result<TemplateListing> {
        let url = self.url(&["templates"])?;
        let request = self
            .request(Method::GET, url)
            .query(&[("offset", offset), ("count", count)]);
        let body = self.send(request).await?;
        log::debug!("Template listing: {}", body);
        Ok(serde_json::from_value(body)?)
    }

    async fn create_template(&self, payload: &TemplatePayload) -> Result<Value> {
        let url = self.url(&["templates"])?;
        self.send(self.request(Method::POST, url).json(payload)).await
    }

    async fn update_template(&self, alias: &str, payload: &TemplatePayload) -> Result<Value> {
        let url = self.url(&["templates", alias])?;
        self.send(self.request(Method::PUT, url).json(payload)).await
    }
}

impl std::fmt::Debug for PostmarkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostmarkClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}
