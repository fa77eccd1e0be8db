//! Eureka registry topology models
//!
//! Mirrors the JSON form of `GET /eureka/apps`:
//! `applications.application[].instance[]`, each instance carrying `app`,
//! `status` and a free-form `metadata` map. Eureka writes single-element
//! lists as a bare object, so both shapes are accepted.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};

/// A single registered instance, flattened out of the wire document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EurekaInstance {
    /// Eureka-side application name (upper case by convention)
    pub app_name: String,
    /// Explicit Eureka instance id, when the registry reports one
    pub instance_id: Option<String>,
    pub status: String,
    pub zone: Option<String>,
    pub cf_app_guid: Option<String>,
    pub cf_instance_index: Option<String>,
}

impl EurekaInstance {
    /// Identifier used in `DELETE /eureka/apps/{app}/{id}`.
    ///
    /// Falls back to `{cfAppGuid}:{cfInstanceIndex}` when the registry does
    /// not report an explicit instance id.
    pub fn registration_id(&self) -> Option<String> {
        if let Some(id) = &self.instance_id {
            return Some(id.clone());
        }
        match (&self.cf_app_guid, &self.cf_instance_index) {
            (Some(guid), Some(index)) => Some(format!("{}:{}", guid, index)),
            _ => None,
        }
    }
}

/// Every instance of every application, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EurekaTopology {
    pub instances: Vec<EurekaInstance>,
}

impl EurekaTopology {
    pub fn parse(body: &str) -> Result<Self> {
        let doc: AppsDocument =
            serde_json::from_str(body).context("Failed to parse Eureka applications document")?;

        let instances = doc
            .applications
            .application
            .into_iter()
            .flat_map(|app| {
                let group = app.name;
                app.instance
                    .into_iter()
                    .map(move |instance| instance.into_model(group.as_deref()))
            })
            .collect();

        Ok(Self { instances })
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }
}

#[derive(Debug, Deserialize)]
struct AppsDocument {
    applications: Applications,
}

#[derive(Debug, Default, Deserialize)]
struct Applications {
    #[serde(default, deserialize_with = "one_or_many")]
    application: Vec<Application>,
}

#[derive(Debug, Deserialize)]
struct Application {
    #[serde(default)]
    name: Option<String>,

    #[serde(default, deserialize_with = "one_or_many")]
    instance: Vec<Instance>,
}

#[derive(Debug, Deserialize)]
struct Instance {
    #[serde(default)]
    app: Option<String>,

    #[serde(rename = "instanceId", default)]
    instance_id: Option<String>,

    #[serde(default)]
    status: Option<String>,

    #[serde(default)]
    metadata: Option<Metadata>,
}

#[derive(Debug, Default, Deserialize)]
struct Metadata {
    #[serde(default)]
    zone: Option<String>,

    #[serde(rename = "cfAppGuid", default)]
    cf_app_guid: Option<String>,

    #[serde(rename = "cfInstanceIndex", default, deserialize_with = "string_or_number")]
    cf_instance_index: Option<String>,
}

impl Instance {
    fn into_model(self, group: Option<&str>) -> EurekaInstance {
        let metadata = self.metadata.unwrap_or_default();
        EurekaInstance {
            app_name: self
                .app
                .or_else(|| group.map(str::to_string))
                .unwrap_or_default(),
            instance_id: non_empty(self.instance_id),
            status: self.status.unwrap_or_default(),
            zone: non_empty(metadata.zone),
            cf_app_guid: non_empty(metadata.cf_app_guid),
            cf_instance_index: non_empty(metadata.cf_instance_index),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(i64),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|value| match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_instance() {
        let json = r#"
        {
           "applications": {
              "application": [
                 {
                    "instance": [
                       {
                          "app": "APP-1",
                          "status": "UP",
                          "metadata": {
                             "zone": "zone-a",
                             "cfAppGuid": "062bd505-8b19-44ca-4451-4a932932143a",
                             "cfInstanceIndex": "2"
                          }
                       }
                    ]
                 }
              ]
           }
        }"#;

        let topology = EurekaTopology::parse(json).unwrap();

        assert_eq!(topology.len(), 1);
        let instance = &topology.instances[0];
        assert_eq!(instance.app_name, "APP-1");
        assert_eq!(instance.status, "UP");
        assert_eq!(instance.zone.as_deref(), Some("zone-a"));
        assert_eq!(
            instance.cf_app_guid.as_deref(),
            Some("062bd505-8b19-44ca-4451-4a932932143a")
        );
        assert_eq!(
            instance.registration_id().as_deref(),
            Some("062bd505-8b19-44ca-4451-4a932932143a:2")
        );
    }

    #[test]
    fn test_instance_without_guid_is_kept() {
        let json = r#"
        {
           "applications": {
              "application": [
                 {
                    "name": "APP-2",
                    "instance": [
                       { "app": "APP-2", "status": "UNKNOWN", "metadata": { "zone": "zone-a", "cfInstanceIndex": "2" } },
                       { "status": "DOWN" },
                       { "app": "APP-2", "status": "UP", "metadata": null }
                    ]
                 },
                 { "name": "APP-3", "instance": null }
              ]
           }
        }"#;

        let topology = EurekaTopology::parse(json).unwrap();

        assert_eq!(topology.len(), 3);
        assert!(topology.instances[2].cf_app_guid.is_none());
        assert!(topology.instances[2].cf_instance_index.is_none());
        assert!(topology.instances[0].cf_app_guid.is_none());
        assert_eq!(topology.instances[0].registration_id(), None);
        // app name falls back to the enclosing application
        assert_eq!(topology.instances[1].app_name, "APP-2");
        assert!(topology.instances[1].zone.is_none());
    }

    #[test]
    fn test_single_objects_instead_of_arrays() {
        let json = r#"
        {
           "applications": {
              "application": {
                 "name": "APP-1",
                 "instance": {
                    "app": "APP-1",
                    "instanceId": "host-1:app-1:8080",
                    "status": "UP",
                    "metadata": { "cfAppGuid": "guid-1", "cfInstanceIndex": 0 }
                 }
              }
           }
        }"#;

        let topology = EurekaTopology::parse(json).unwrap();

        assert_eq!(topology.len(), 1);
        assert_eq!(topology.instances[0].cf_instance_index.as_deref(), Some("0"));
        assert_eq!(
            topology.instances[0].registration_id().as_deref(),
            Some("host-1:app-1:8080")
        );
    }

    #[test]
    fn test_empty_registry() {
        let topology = EurekaTopology::parse(r#"{"applications": {"application": []}}"#).unwrap();
        assert!(topology.is_empty());

        let topology = EurekaTopology::parse(r#"{"applications": {}}"#).unwrap();
        assert!(topology.is_empty());
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        assert!(EurekaTopology::parse("<applications/>").is_err());
        assert!(EurekaTopology::parse(r#"{"apps": []}"#).is_err());
    }
}
