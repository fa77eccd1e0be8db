//! Registry topology fetch

use super::EurekaBaseUrl;
use crate::api::AuthenticatedClient;
use crate::auth::AccessToken;
use crate::models::EurekaTopology;
use anyhow::Result;
use tracing::debug;

/// Fetch and parse every registered instance from the registry
pub async fn fetch_topology(
    client: &dyn AuthenticatedClient,
    base: &EurekaBaseUrl,
    token: &AccessToken,
) -> Result<EurekaTopology> {
    let body = client.do_authenticated_get(&base.apps_url(), token).await?;
    let topology = EurekaTopology::parse(&body)?;

    if topology.is_empty() {
        debug!("Registry {} has no registered applications", base);
    } else {
        debug!("Registry {} reports {} instance(s)", base, topology.len());
    }
    Ok(topology)
}
