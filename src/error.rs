//! Terminal errors of the deregistration pipeline

use std::fmt;
use thiserror::Error;

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LookupService,
    ObtainAccessToken,
    ResolveDashboard,
    FetchTopology,
    LookupTargetApp,
    MatchAndDeregister,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::LookupService => "lookup-service",
            Stage::ObtainAccessToken => "obtain-access-token",
            Stage::ResolveDashboard => "resolve-dashboard",
            Stage::FetchTopology => "fetch-topology",
            Stage::LookupTargetApp => "lookup-target-app",
            Stage::MatchAndDeregister => "match-and-deregister",
        };
        f.write_str(name)
    }
}

/// A stage failed; nothing after it ran
#[derive(Debug, Error)]
pub enum DeregisterError {
    #[error("Service registry instance not found: {0:#}")]
    ServiceNotFound(anyhow::Error),

    #[error("Access token not available: {0:#}")]
    AccessTokenUnavailable(anyhow::Error),

    #[error("Error obtaining service registry dashboard URL: {0:#}")]
    DashboardResolutionFailed(anyhow::Error),

    #[error("Error obtaining registered applications from the service registry: {0:#}")]
    TopologyFetchFailed(anyhow::Error),

    #[error("Error obtaining cf apps: {0:#}")]
    AppListUnavailable(anyhow::Error),

    #[error("cf app name {0} not found")]
    AppNotFound(String),
}

impl DeregisterError {
    pub fn stage(&self) -> Stage {
        match self {
            DeregisterError::ServiceNotFound(_) => Stage::LookupService,
            DeregisterError::AccessTokenUnavailable(_) => Stage::ObtainAccessToken,
            DeregisterError::DashboardResolutionFailed(_) => Stage::ResolveDashboard,
            DeregisterError::TopologyFetchFailed(_) => Stage::FetchTopology,
            DeregisterError::AppListUnavailable(_) | DeregisterError::AppNotFound(_) => {
                Stage::LookupTargetApp
            }
        }
    }
}
