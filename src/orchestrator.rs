//! Deregistration pipeline
//!
//! Runs the stages of [`Stage`] strictly in order. Every stage before
//! `MatchAndDeregister` is fatal: its failure becomes the single
//! [`DeregisterError`] returned and no later stage runs. Individual DELETE
//! failures are collected into the [`DeregisterReport`] instead.

use crate::api::{AuthenticatedClient, CfConnection};
use crate::auth::{AccessToken, TokenError};
use crate::error::{DeregisterError, Stage};
use crate::eureka::{
    DashboardResolver, DeregistrationOutcome, EurekaBaseUrl, deregister_instances, fetch_topology,
    match_instances,
};
use crate::models::{AppModel, EurekaInstance, EurekaTopology};
use anyhow::anyhow;
use std::collections::HashMap;
use tracing::{debug, info};

/// Drives a single invocation against one service registry
pub struct Orchestrator<'a> {
    cf: &'a dyn CfConnection,
    client: &'a dyn AuthenticatedClient,
    resolver: &'a dyn DashboardResolver,
}

/// Registry state gathered by the first four stages
struct RegistryView {
    base: EurekaBaseUrl,
    token: AccessToken,
    topology: EurekaTopology,
}

/// Outcome of a completed deregistration run
#[derive(Debug, Clone)]
pub struct DeregisterReport {
    pub registry: String,
    pub app_name: String,
    pub app_guid: String,
    pub outcomes: Vec<DeregistrationOutcome>,
}

impl DeregisterReport {
    /// DELETE calls issued
    pub fn attempted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.was_issued()).count()
    }

    /// DELETE calls that succeeded
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DeregistrationOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn summary(&self) -> String {
        format!(
            "Deregistered {} instance(s) of cf app {} from service registry {}",
            self.succeeded(),
            self.app_name,
            self.registry
        )
    }
}

/// A registry instance paired with the CF app it belongs to, if known
#[derive(Debug, Clone)]
pub struct ListedInstance {
    pub instance: EurekaInstance,
    pub cf_app_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RegistryListing {
    pub registry: String,
    pub instances: Vec<ListedInstance>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        cf: &'a dyn CfConnection,
        client: &'a dyn AuthenticatedClient,
        resolver: &'a dyn DashboardResolver,
    ) -> Self {
        Self {
            cf,
            client,
            resolver,
        }
    }

    /// Deregister every registry instance of `app_name` from `registry`
    pub async fn deregister(
        &self,
        registry: &str,
        app_name: &str,
    ) -> Result<DeregisterReport, DeregisterError> {
        let view = self.open_registry(registry).await?;
        let app = self.lookup_target_app(app_name).await?;

        info!(stage = %Stage::MatchAndDeregister, app = %app.name, guid = %app.guid, "Matching registry instances");
        let matched = match_instances(&view.topology, &app.guid);
        let outcomes =
            deregister_instances(self.client, &view.base, &view.token, &matched).await;

        Ok(DeregisterReport {
            registry: registry.to_string(),
            app_name: app.name,
            app_guid: app.guid,
            outcomes,
        })
    }

    /// List every registry instance alongside its CF app name
    pub async fn list(&self, registry: &str) -> Result<RegistryListing, DeregisterError> {
        let view = self.open_registry(registry).await?;

        let apps = self
            .cf
            .get_apps()
            .await
            .map_err(|e| cf_lookup_error(e, DeregisterError::AppListUnavailable))?;
        let names: HashMap<String, String> =
            apps.into_iter().map(|app| (app.guid, app.name)).collect();

        let instances = view
            .topology
            .instances
            .into_iter()
            .map(|instance| {
                let cf_app_name = instance
                    .cf_app_guid
                    .as_ref()
                    .and_then(|guid| names.get(guid))
                    .cloned();
                ListedInstance {
                    instance,
                    cf_app_name,
                }
            })
            .collect();

        Ok(RegistryListing {
            registry: registry.to_string(),
            instances,
        })
    }

    async fn open_registry(&self, registry: &str) -> Result<RegistryView, DeregisterError> {
        let dashboard_url = self.lookup_service(registry).await?;
        let token = self.obtain_access_token().await?;
        let base = self.resolve_dashboard(&dashboard_url, &token).await?;
        let topology = self.fetch_topology(&base, &token).await?;

        Ok(RegistryView {
            base,
            token,
            topology,
        })
    }

    async fn lookup_service(&self, registry: &str) -> Result<String, DeregisterError> {
        info!(stage = %Stage::LookupService, registry, "Looking up service registry");

        let service = self
            .cf
            .get_service(registry)
            .await
            .map_err(|e| cf_lookup_error(e, DeregisterError::ServiceNotFound))?;
        debug!(guid = %service.guid, "Found service registry");

        service
            .dashboard_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                DeregisterError::ServiceNotFound(anyhow!(
                    "service instance {} has no dashboard URL",
                    registry
                ))
            })
    }

    async fn obtain_access_token(&self) -> Result<AccessToken, DeregisterError> {
        info!(stage = %Stage::ObtainAccessToken, "Obtaining access token");

        self.cf
            .access_token()
            .await
            .map_err(DeregisterError::AccessTokenUnavailable)
    }

    async fn resolve_dashboard(
        &self,
        dashboard_url: &str,
        token: &AccessToken,
    ) -> Result<EurekaBaseUrl, DeregisterError> {
        info!(stage = %Stage::ResolveDashboard, dashboard_url, "Resolving service registry URL");

        self.resolver
            .resolve(dashboard_url, token, self.client)
            .await
            .map_err(|e| DeregisterError::DashboardResolutionFailed(e.into()))
    }

    async fn fetch_topology(
        &self,
        base: &EurekaBaseUrl,
        token: &AccessToken,
    ) -> Result<EurekaTopology, DeregisterError> {
        info!(stage = %Stage::FetchTopology, registry_url = %base, "Fetching registered applications");

        fetch_topology(self.client, base, token)
            .await
            .map_err(DeregisterError::TopologyFetchFailed)
    }

    async fn lookup_target_app(&self, app_name: &str) -> Result<AppModel, DeregisterError> {
        info!(stage = %Stage::LookupTargetApp, app = app_name, "Looking up cf app");

        let apps = self
            .cf
            .get_apps()
            .await
            .map_err(|e| cf_lookup_error(e, DeregisterError::AppListUnavailable))?;

        apps.into_iter()
            .find(|app| app.name == app_name)
            .ok_or_else(|| DeregisterError::AppNotFound(app_name.to_string()))
    }
}

/// CF lookups authenticate lazily, so a token failure can surface from any of
/// them. It is reported against the token stage regardless.
fn cf_lookup_error(
    err: anyhow::Error,
    otherwise: fn(anyhow::Error) -> DeregisterError,
) -> DeregisterError {
    if err.chain().any(|cause| cause.is::<TokenError>()) {
        DeregisterError::AccessTokenUnavailable(err)
    } else {
        otherwise(err)
    }
}
