//! eureka-deregister - remove Cloud Foundry app instances from a Eureka registry
//!
//! Deregisters the Eureka registrations of a CF application (for example after
//! the app was deleted or scaled down) without needing the registered clients
//! to be reachable. Uses the session of the logged-in CF CLI.

mod api;
mod auth;
mod config;
mod error;
mod eureka;
mod models;
mod orchestrator;
mod output;
#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{CfSession, CloudControllerClient, HttpClient, HttpSettings};
use crate::auth::CfCliAuthenticator;
use crate::config::{Config, Overrides};
use crate::eureka::BrokerDashboardResolver;
use crate::orchestrator::Orchestrator;

/// eureka-deregister - Eureka cleanup for Cloud Foundry apps
#[derive(Parser, Debug)]
#[command(name = "eureka-deregister")]
#[command(about = "Deregister Cloud Foundry application instances from a Eureka service registry")]
#[command(version)]
struct Args {
    /// Directory containing the CF CLI's .cf/config.json
    #[arg(long, env = "CF_HOME", global = true)]
    cf_home: Option<PathBuf>,

    /// Skip TLS certificate validation
    #[arg(long, global = true)]
    skip_ssl_validation: bool,

    /// HTTP request timeout in seconds
    #[arg(long, env = "EUREKA_DEREGISTER_TIMEOUT", global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Deregister every instance of a cf app from a service registry
    Deregister {
        /// Service registry service instance name
        service_registry: String,

        /// Name of the cf app whose instances should be deregistered
        cf_app: String,
    },

    /// List the instances registered with a service registry
    List {
        /// Service registry service instance name
        service_registry: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (for debugging, set RUST_LOG=debug)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();

    let config = Config::load()
        .context("Failed to load configuration")?
        .merge(Overrides {
            cf_home: args.cf_home.clone(),
            skip_ssl_validation: args.skip_ssl_validation,
            timeout_secs: args.timeout,
        });

    let cf_home = config.cf_home()?;
    let session = CfSession::load(&cf_home)?;
    debug!(api = %session.target, space = %session.space.name, "Using CF session");

    let http_client = Arc::new(HttpClient::new(&HttpSettings {
        user_agent: config.user_agent(),
        timeout: config.timeout(),
        skip_ssl_validation: config.skip_ssl_validation || session.ssl_disabled,
    })?);
    let cf = CloudControllerClient::new(
        session,
        http_client.clone(),
        CfCliAuthenticator::new().with_cf_home(cf_home),
    );
    let resolver = BrokerDashboardResolver;
    let orchestrator = Orchestrator::new(&cf, http_client.as_ref(), &resolver);

    match args.command {
        Command::Deregister {
            service_registry,
            cf_app,
        } => {
            let report = orchestrator
                .deregister(&service_registry, &cf_app)
                .await
                .inspect_err(|e| debug!(stage = %e.stage(), "Deregistration stopped"))?;
            debug!(guid = %report.app_guid, attempted = report.attempted(), "Deregistration finished");
            print!("{}", output::render_report(&report));

            if report.has_failures() {
                anyhow::bail!(
                    "{} of {} instance(s) could not be deregistered",
                    report.outcomes.len() - report.succeeded(),
                    report.outcomes.len()
                );
            }
        }
        Command::List { service_registry } => {
            let listing = orchestrator
                .list(&service_registry)
                .await
                .inspect_err(|e| debug!(stage = %e.stage(), "Listing stopped"))?;
            print!("{}", output::render_listing(&listing));
        }
    }

    Ok(())
}
