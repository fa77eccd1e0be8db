//! CF CLI credential provider

use super::AccessToken;
use anyhow::Result;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::RwLock;
use tracing::debug;

/// The CF CLI could not hand out an access token
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Failed to run '{program} oauth-token'")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program} oauth-token' failed ({status}). Make sure you're logged in with '{program} login': {output}")]
    Command {
        program: String,
        status: ExitStatus,
        output: String,
    },

    #[error("'{0} oauth-token' returned an empty token")]
    Empty(String),
}

/// Authenticator that borrows the access token of the logged-in CF CLI session
pub struct CfCliAuthenticator {
    program: String,
    cf_home: Option<PathBuf>,
    cached_token: RwLock<Option<AccessToken>>,
}

impl CfCliAuthenticator {
    pub fn new() -> Self {
        Self::with_program("cf")
    }

    /// Use a different CF CLI executable (e.g. `cf8`)
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            cf_home: None,
            cached_token: RwLock::new(None),
        }
    }

    /// Run the CF CLI against the session stored under `cf_home`
    pub fn with_cf_home(mut self, cf_home: impl Into<PathBuf>) -> Self {
        self.cf_home = Some(cf_home.into());
        self
    }

    #[cfg(test)]
    pub fn with_cached_token(token: AccessToken) -> Self {
        let authenticator = Self::new();
        *authenticator.cached_token.try_write().unwrap() = Some(token);
        authenticator
    }

    /// Get an access token, asking the CF CLI at most once
    pub async fn get_token(&self) -> Result<AccessToken> {
        if let Some(token) = self.cached_token.read().await.as_ref() {
            return Ok(token.clone());
        }

        let token = self.fetch_token().await?;
        *self.cached_token.write().await = Some(token.clone());
        Ok(token)
    }

    async fn fetch_token(&self) -> Result<AccessToken, TokenError> {
        debug!("Requesting access token from {} oauth-token", self.program);

        let mut command = Command::new(&self.program);
        command.arg("oauth-token");
        if let Some(cf_home) = &self.cf_home {
            command.env("CF_HOME", cf_home);
        }

        let output = command.output().await.map_err(|source| TokenError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            return Err(TokenError::Command {
                program: self.program.clone(),
                status: output.status,
                output: format!("{}{}", stdout.trim(), stderr.trim()),
            });
        }

        let token = AccessToken::new(String::from_utf8_lossy(&output.stdout));
        if token.is_empty() {
            return Err(TokenError::Empty(self.program.clone()));
        }
        Ok(token)
    }
}

impl Default for CfCliAuthenticator {
    fn default() -> Self {
        Self::new()
    }
}
