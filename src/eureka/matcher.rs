//! Correlation of registry instances with a CF application

use crate::models::{EurekaInstance, EurekaTopology};

/// Select every instance registered with the given CF app GUID, in document
/// order. Instances without a GUID never match.
pub fn match_instances<'a>(topology: &'a EurekaTopology, app_guid: &str) -> Vec<&'a EurekaInstance> {
    topology
        .instances
        .iter()
        .filter(|instance| instance.cf_app_guid.as_deref() == Some(app_guid))
        .collect()
}
