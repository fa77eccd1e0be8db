//! Authenticated HTTP client

use crate::auth::AccessToken;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;

/// GET/DELETE with bearer token injection.
///
/// The pipeline only talks to the network through this trait, so tests can
/// swap in an in-memory fake.
#[async_trait]
pub trait AuthenticatedClient: Send + Sync {
    /// GET `url` and return the response body
    async fn do_authenticated_get(&self, url: &str, token: &AccessToken) -> Result<String>;

    /// DELETE `url`
    async fn do_authenticated_delete(&self, url: &str, token: &AccessToken) -> Result<()>;
}

/// Settings for building the underlying reqwest client
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub user_agent: String,
    pub timeout: Duration,
    pub skip_ssl_validation: bool,
}

/// reqwest-backed [`AuthenticatedClient`]
#[derive(Clone)]
pub struct HttpClient {
    http_client: Client,
}

impl HttpClient {
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout)
            .danger_accept_invalid_certs(settings.skip_ssl_validation)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { http_client })
    }

    async fn check(response: Response) -> Result<Response> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API request failed with status {}: {}", status, body.trim());
        }
        Ok(response)
    }
}

#[async_trait]
impl AuthenticatedClient for HttpClient {
    async fn do_authenticated_get(&self, url: &str, token: &AccessToken) -> Result<String> {
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(url)
            .bearer_auth(token.secret())
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check(response).await?;
        response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))
    }

    async fn do_authenticated_delete(&self, url: &str, token: &AccessToken) -> Result<()> {
        debug!("DELETE {}", url);

        let response = self
            .http_client
            .delete(url)
            .bearer_auth(token.secret())
            .send()
            .await
            .with_context(|| format!("Failed to send DELETE request to {}", url))?;

        Self::check(response).await?;
        Ok(())
    }
}
