//! Dashboard URL to Eureka base URL resolution

use super::EurekaBaseUrl;
use crate::api::AuthenticatedClient;
use crate::auth::AccessToken;
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("dashboard URL {0} does not identify a service instance")]
    MissingInstanceGuid(String),

    #[error("{0:#}")]
    Request(anyhow::Error),

    #[error("invalid service definition response")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("service definition response carries no registry URI")]
    MissingUri,
}

/// Strategy turning a broker dashboard URL into a reachable Eureka base URL
#[async_trait]
pub trait DashboardResolver: Send + Sync {
    async fn resolve(
        &self,
        dashboard_url: &str,
        token: &AccessToken,
        client: &dyn AuthenticatedClient,
    ) -> Result<EurekaBaseUrl, ResolutionError>;
}

/// Asks the service broker for the instance's service definition.
///
/// The last path segment of the dashboard URL is the service instance GUID;
/// the broker serves the definition at `/cli/instance/{guid}` on the same host
/// and the registry URI sits under `credentials.uri`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrokerDashboardResolver;

#[derive(Debug, Deserialize)]
struct ServiceDefinition {
    #[serde(default)]
    credentials: Credentials,
}

#[derive(Debug, Default, Deserialize)]
struct Credentials {
    #[serde(default)]
    uri: String,
}

impl BrokerDashboardResolver {
    fn definition_url(dashboard_url: &str) -> Result<Url, ResolutionError> {
        let mut url = Url::parse(dashboard_url).map_err(|e| ResolutionError::InvalidUrl {
            url: dashboard_url.to_string(),
            reason: e.to_string(),
        })?;

        let guid = url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(str::to_string)
            .ok_or_else(|| ResolutionError::MissingInstanceGuid(dashboard_url.to_string()))?;

        url.set_path(&format!("/cli/instance/{}", guid));
        url.set_query(None);
        url.set_fragment(None);
        Ok(url)
    }
}

#[async_trait]
impl DashboardResolver for BrokerDashboardResolver {
    async fn resolve(
        &self,
        dashboard_url: &str,
        token: &AccessToken,
        client: &dyn AuthenticatedClient,
    ) -> Result<EurekaBaseUrl, ResolutionError> {
        let definition_url = Self::definition_url(dashboard_url)?;
        debug!("Resolving service registry from {}", definition_url);

        let body = client
            .do_authenticated_get(definition_url.as_str(), token)
            .await
            .map_err(ResolutionError::Request)?;

        let definition: ServiceDefinition = serde_json::from_str(&body)?;
        if definition.credentials.uri.trim().is_empty() {
            return Err(ResolutionError::MissingUri);
        }

        EurekaBaseUrl::parse(&definition.credentials.uri)
    }
}
