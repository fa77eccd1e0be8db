//! Data models for the CF platform and the Eureka registry

mod cf;
mod eureka;
mod v3;

pub use cf::{AppModel, ServiceModel};
pub use eureka::{EurekaInstance, EurekaTopology};
pub use v3::V3List;
