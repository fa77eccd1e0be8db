//! Auth module for CF CLI authentication
//!
//! Provides access token acquisition through the CF CLI's logged-in session.

mod cf_cli;
mod token;

pub use cf_cli::{CfCliAuthenticator, TokenError};
pub use token::AccessToken;
