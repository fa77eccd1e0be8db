//! Service instance and application models

use serde::Deserialize;

/// Service instance as seen by the Cloud Controller
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ServiceModel {
    pub guid: String,
    pub name: String,

    #[serde(rename = "dashboard_url")]
    pub dashboard_url: Option<String>,
}

/// Application visible to the current user
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AppModel {
    pub guid: String,
    pub name: String,
}

impl AppModel {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, guid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            guid: guid.into(),
        }
    }
}
