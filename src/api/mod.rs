//! API module for CF platform and registry HTTP interactions

mod client;
mod cloud_controller;

pub use client::{AuthenticatedClient, HttpClient, HttpSettings};
pub use cloud_controller::{CfConnection, CfSession, CloudControllerClient};
