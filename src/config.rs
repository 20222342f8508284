//! # Configuration Management
//!
//! Configuration comes from the environment (and an optional `.env` file).
//!
//! ## Environment Variables
//! - `HOST`: Server bind address (default: 127.0.0.1)
//! - `PORT`: Server port (default: 8080)
//! - `RP_ID`: WebAuthn Relying Party ID (the verifying domain)
//! - `RP_NAME`: Human-readable name of the relying party
//! - `RP_ORIGINS`: Comma-separated list of origins allowed to call the ceremonies
//! - `STATIC_DIR`: Directory served at `/` (default: web)
//! - `CHALLENGE_TTL_SECS`: How long a begun ceremony may stay pending (default: 300)
//! - `CHALLENGE_SWEEP_SECS`: Interval of the expired-ceremony sweep (default: 600)

use anyhow::{anyhow, bail, Result};
use std::env;
use std::time::Duration;
use webauthn_rs::prelude::Url;

/// Longest a begun ceremony may stay pending
pub const MAX_CHALLENGE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Application configuration
///
/// ## WebAuthn Terminology
/// - **RP ID**: the domain credentials are scoped to (e.g. "example.com" or "localhost")
/// - **RP Origins**: full URLs of the pages allowed to run ceremonies
///   (e.g. "https://example.com"). Every origin's host must be the RP ID or a
///   subdomain of it, otherwise every ceremony fails verification.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,

    pub rp_id: String,
    pub rp_name: String,
    pub rp_origins: Vec<Url>,

    /// Directory holding the browser front-end
    pub static_dir: String,

    /// Lifetime of a pending registration/authentication ceremony
    pub challenge_ttl: Duration,

    /// How often expired pending ceremonies are purged
    pub sweep_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            rp_id: "localhost".to_string(),
            rp_name: "FIDO2 Example".to_string(),
            rp_origins: vec![Url::parse("http://localhost:8080").expect("static origin is valid")],
            static_dir: "web".to_string(),
            challenge_ttl: Duration::from_secs(300),
            sweep_interval: Duration::from_secs(600),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Missing variables fall back to [`Config::default`]. Malformed values
    /// (a non-numeric port, an unparsable origin) are errors, as is a
    /// configuration that fails [`Config::validate`].
    ///
    /// ## Example .env file
    /// ```text
    /// HOST=0.0.0.0
    /// PORT=8080
    /// RP_ID=localhost
    /// RP_NAME=FIDO2 Example
    /// RP_ORIGINS=http://localhost:8080,http://localhost:3000
    /// ```
    pub fn from_env() -> Result<Self> {
        // dotenvy doesn't error if the file is missing
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let rp_origins = match env::var("RP_ORIGINS") {
            Ok(raw) => parse_origins(&raw)?,
            Err(_) => defaults.rp_origins,
        };

        let config = Config {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: match env::var("PORT") {
                Ok(port) => port.parse()?,
                Err(_) => defaults.port,
            },
            rp_id: env::var("RP_ID").unwrap_or(defaults.rp_id),
            rp_name: env::var("RP_NAME").unwrap_or(defaults.rp_name),
            rp_origins,
            static_dir: env::var("STATIC_DIR").unwrap_or(defaults.static_dir),
            challenge_ttl: match env::var("CHALLENGE_TTL_SECS") {
                Ok(secs) => Duration::from_secs(secs.parse()?),
                Err(_) => defaults.challenge_ttl,
            },
            sweep_interval: match env::var("CHALLENGE_SWEEP_SECS") {
                Ok(secs) => Duration::from_secs(secs.parse()?),
                Err(_) => defaults.sweep_interval,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Check that the relying-party settings are consistent with each other
    pub fn validate(&self) -> Result<()> {
        let rp_id = self.rp_id.trim();
        if rp_id.is_empty() {
            bail!("RP_ID must not be empty");
        }
        if self.rp_origins.is_empty() {
            bail!("at least one relying-party origin is required");
        }
        for origin in &self.rp_origins {
            let host = origin
                .host_str()
                .ok_or_else(|| anyhow!("origin '{}' has no host", origin))?;
            if host != rp_id && !host.ends_with(&format!(".{}", rp_id)) {
                bail!(
                    "origin '{}' is not within relying-party ID '{}'",
                    origin,
                    rp_id
                );
            }
        }
        if self.challenge_ttl.is_zero() {
            bail!("CHALLENGE_TTL_SECS must be greater than zero");
        }
        if self.challenge_ttl > MAX_CHALLENGE_TTL {
            bail!(
                "CHALLENGE_TTL_SECS must be at most {} seconds",
                MAX_CHALLENGE_TTL.as_secs()
            );
        }
        if self.sweep_interval.is_zero() {
            bail!("CHALLENGE_SWEEP_SECS must be greater than zero");
        }
        Ok(())
    }

    /// Socket address for `tokio::net::TcpListener::bind()`, e.g. "127.0.0.1:8080"
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_origins(raw: &str) -> Result<Vec<Url>> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| Url::parse(origin).map_err(|e| anyhow!("invalid origin '{}': {}", origin, e)))
        .collect()
}
