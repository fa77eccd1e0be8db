//! Eureka registry operations: dashboard resolution, topology fetch,
//! instance matching and deregistration

mod deregister;
mod matcher;
mod resolver;
mod topology;

pub use deregister::{DeregistrationOutcome, OutcomeStatus, deregister_instances};
pub use matcher::match_instances;
pub use resolver::{BrokerDashboardResolver, DashboardResolver, ResolutionError};
pub use topology::fetch_topology;

use reqwest::Url;
use std::fmt;

/// Root of a Eureka server's REST API, always ending in `/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EurekaBaseUrl(String);

impl EurekaBaseUrl {
    pub fn parse(raw: &str) -> Result<Self, ResolutionError> {
        let raw = raw.trim();
        let url = Url::parse(raw).map_err(|e| ResolutionError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ResolutionError::InvalidUrl {
                url: raw.to_string(),
                reason: "not an http(s) URL".to_string(),
            });
        }
        Ok(Self(format!("{}/", raw.trim_end_matches('/'))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `GET` target listing every registered application
    pub fn apps_url(&self) -> String {
        format!("{}eureka/apps", self.0)
    }

    /// `DELETE` target for a single registration
    pub fn instance_url(&self, app_name: &str, instance_id: &str) -> String {
        format!(
            "{}eureka/apps/{}/{}",
            self.0,
            urlencoding::encode(app_name),
            urlencoding::encode(instance_id)
        )
    }
}

impl fmt::Display for EurekaBaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalization() {
        let base = EurekaBaseUrl::parse("https://eureka-123.example.com").unwrap();
        assert_eq!(base.as_str(), "https://eureka-123.example.com/");

        let base = EurekaBaseUrl::parse("https://eureka-123.example.com//").unwrap();
        assert_eq!(base.apps_url(), "https://eureka-123.example.com/eureka/apps");
    }

    #[test]
    fn test_instance_url_encodes_segments() {
        let base = EurekaBaseUrl::parse("https://eureka.example.com/").unwrap();
        assert_eq!(
            base.instance_url("APP-1", "guid:2"),
            "https://eureka.example.com/eureka/apps/APP-1/guid%3A2"
        );
    }

    #[test]
    fn test_rejects_non_urls() {
        assert!(EurekaBaseUrl::parse("not a url").is_err());
        assert!(EurekaBaseUrl::parse("ftp://eureka.example.com").is_err());
    }
}
