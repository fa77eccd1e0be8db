//! Cloud Controller (CF API) lookups

use super::AuthenticatedClient;
use crate::auth::{AccessToken, CfCliAuthenticator};
use crate::models::{AppModel, ServiceModel, V3List};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

const APPS_PAGE_SIZE: u32 = 5000;

/// The CF platform operations the deregistration pipeline needs
#[async_trait]
pub trait CfConnection: Send + Sync {
    /// Look up a service instance by name in the targeted space
    async fn get_service(&self, name: &str) -> Result<ServiceModel>;

    /// Access token of the current CF session
    async fn access_token(&self) -> Result<AccessToken>;

    /// Every application in the targeted space
    async fn get_apps(&self) -> Result<Vec<AppModel>>;
}

/// Target and space of the logged-in CF CLI, read from `.cf/config.json`
#[derive(Debug, Clone, Deserialize)]
pub struct CfSession {
    #[serde(rename = "Target")]
    pub target: String,

    #[serde(rename = "SpaceFields", default)]
    pub space: SpaceFields,

    #[serde(rename = "SSLDisabled", default)]
    pub ssl_disabled: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpaceFields {
    #[serde(rename = "GUID", default)]
    pub guid: String,

    #[serde(rename = "Name", default)]
    pub name: String,
}

impl CfSession {
    /// Read `<cf_home>/.cf/config.json`
    pub fn load(cf_home: &Path) -> Result<Self> {
        let path = cf_home.join(".cf").join("config.json");
        let content = fs::read_to_string(&path).with_context(|| {
            format!(
                "Failed to read CF CLI config {}. Make sure you're logged in with 'cf login'",
                path.display()
            )
        })?;
        Self::parse(&content).with_context(|| format!("Invalid CF CLI config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let session: CfSession = serde_json::from_str(content)?;
        if session.target.trim().is_empty() {
            anyhow::bail!("No API endpoint set. Use 'cf login' or 'cf api' to target a foundation");
        }
        if session.space.guid.is_empty() {
            anyhow::bail!("No space targeted. Use 'cf target -s' to target a space");
        }
        Ok(session)
    }

    fn api_url(&self) -> &str {
        self.target.trim_end_matches('/')
    }
}

/// [`CfConnection`] backed by the Cloud Controller v3 API
pub struct CloudControllerClient {
    session: CfSession,
    http_client: Arc<dyn AuthenticatedClient>,
    authenticator: CfCliAuthenticator,
}

impl CloudControllerClient {
    pub fn new(
        session: CfSession,
        http_client: Arc<dyn AuthenticatedClient>,
        authenticator: CfCliAuthenticator,
    ) -> Self {
        Self {
            session,
            http_client,
            authenticator,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let token = self.access_token().await?;
        let body = self.http_client.do_authenticated_get(url, &token).await?;
        serde_json::from_str(&body).with_context(|| format!("Failed to parse response from {}", url))
    }
}

#[async_trait]
impl CfConnection for CloudControllerClient {
    async fn get_service(&self, name: &str) -> Result<ServiceModel> {
        let url = format!(
            "{}/v3/service_instances?names={}&space_guids={}",
            self.session.api_url(),
            urlencoding::encode(name),
            urlencoding::encode(&self.session.space.guid)
        );
        debug!("Looking up service instance {}", name);

        let response: V3List<ServiceModel> = self.get_json(&url).await?;
        response
            .resources
            .into_iter()
            .find(|s| s.name == name)
            .with_context(|| format!("Service instance {} not found", name))
    }

    async fn access_token(&self) -> Result<AccessToken> {
        self.authenticator.get_token().await
    }

    async fn get_apps(&self) -> Result<Vec<AppModel>> {
        let mut url = format!(
            "{}/v3/apps?space_guids={}&per_page={}",
            self.session.api_url(),
            urlencoding::encode(&self.session.space.guid),
            APPS_PAGE_SIZE
        );
        let mut apps = Vec::new();

        loop {
            let page: V3List<AppModel> = self.get_json(&url).await?;
            let next = page.next_page().map(str::to_string);
            apps.extend(page.resources);

            match next {
                Some(next) => url = next,
                None => break,
            }
        }

        debug!("Found {} cf apps", apps.len());
        Ok(apps)
    }
}
