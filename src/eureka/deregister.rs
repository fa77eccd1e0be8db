//! Best-effort deregistration of matched instances

use super::EurekaBaseUrl;
use crate::api::AuthenticatedClient;
use crate::auth::AccessToken;
use crate::models::EurekaInstance;
use futures::future::join_all;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    Deregistered,
    /// The DELETE call was issued and failed
    Failed(String),
    /// No instance id could be derived, so no call was issued
    Skipped(String),
}

/// Result of deregistering a single instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeregistrationOutcome {
    pub app_name: String,
    pub instance_id: Option<String>,
    pub status: OutcomeStatus,
}

impl DeregistrationOutcome {
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Deregistered
    }

    /// Whether a DELETE call went out for this instance
    pub fn was_issued(&self) -> bool {
        !matches!(self.status, OutcomeStatus::Skipped(_))
    }
}

/// Issue one DELETE per instance.
///
/// Calls run concurrently and a failure never cancels the others. Outcomes
/// come back in the same order as `instances`.
pub async fn deregister_instances(
    client: &dyn AuthenticatedClient,
    base: &EurekaBaseUrl,
    token: &AccessToken,
    instances: &[&EurekaInstance],
) -> Vec<DeregistrationOutcome> {
    join_all(
        instances
            .iter()
            .map(|instance| deregister_instance(client, base, token, instance)),
    )
    .await
}

async fn deregister_instance(
    client: &dyn AuthenticatedClient,
    base: &EurekaBaseUrl,
    token: &AccessToken,
    instance: &EurekaInstance,
) -> DeregistrationOutcome {
    let Some(instance_id) = instance.registration_id() else {
        warn!(app = %instance.app_name, "Skipping instance without an instance id or cf instance index");
        return DeregistrationOutcome {
            app_name: instance.app_name.clone(),
            instance_id: None,
            status: OutcomeStatus::Skipped("no instance id or cf instance index".to_string()),
        };
    };

    let url = base.instance_url(&instance.app_name, &instance_id);
    let status = match client.do_authenticated_delete(&url, token).await {
        Ok(()) => {
            info!(app = %instance.app_name, instance = %instance_id, "Deregistered instance");
            OutcomeStatus::Deregistered
        }
        Err(e) => {
            warn!(app = %instance.app_name, instance = %instance_id, "Failed to deregister instance: {:#}", e);
            OutcomeStatus::Failed(format!("{:#}", e))
        }
    };

    DeregistrationOutcome {
        app_name: instance.app_name.clone(),
        instance_id: Some(instance_id),
        status,
    }
}
