//! Configuration for Amber
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use uuid::Uuid;

/// Amber - registration gateway for research projects
///
/// "Frozen in amber"
#[derive(Parser, Debug, Clone)]
#[command(name = "amber")]
#[command(about = "Registration gateway for research projects")]
pub struct Args {
    /// Unique node identifier for this gateway instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8530")]
    pub listen: SocketAddr,

    /// HMAC key for freeze confirmation tokens (required in production)
    #[arg(long, env = "TOKEN_SECRET")]
    pub token_secret: Option<String>,

    /// Public base URL of this gateway, used when building confirmation
    /// links (e.g. "https://amber.example.org"). Defaults to the listen
    /// address.
    #[arg(long, env = "PUBLIC_URL")]
    pub public_url: Option<String>,

    /// Enable development mode (insecure default token secret, demo
    /// seed data)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Effective token secret (uses an insecure default in dev mode).
    ///
    /// `validate()` guarantees the production secret exists before this
    /// is ever called.
    pub fn token_secret(&self) -> String {
        if self.dev_mode {
            self.token_secret
                .clone()
                .unwrap_or_else(|| "dev-only-insecure-secret".to_string())
        } else {
            self.token_secret
                .clone()
                .expect("TOKEN_SECRET is required in production mode")
        }
    }

    /// Whether the insecure dev fallback secret is in effect
    pub fn using_default_secret(&self) -> bool {
        self.dev_mode && self.token_secret.is_none()
    }

    /// Effective public base URL for confirmation links
    pub fn public_url(&self) -> String {
        self.public_url
            .clone()
            .unwrap_or_else(|| format!("http://{}", self.listen))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode && self.token_secret.is_none() {
            return Err("TOKEN_SECRET is required in production mode".to_string());
        }

        if let Some(ref secret) = self.token_secret {
            if secret.trim().is_empty() {
                return Err("TOKEN_SECRET must not be empty".to_string());
            }
        }

        if self.listen.port() == 0 {
            return Err("LISTEN must include a non-zero port".to_string());
        }

        Ok(())
    }
}
