use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "secret",
];

/// Server settings, read from `JOBHUB_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub ai_service_url: Option<String>,
    pub ai_timeout_secs: u64,
    /// Email and password of the admin account created on first start.
    pub bootstrap_admin: Option<(String, String)>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let jwt_secret = var("JOBHUB_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("JOBHUB_JWT_SECRET is unset or still a placeholder");
        }

        let port = match var("JOBHUB_PORT") {
            Some(v) => v.parse().context("JOBHUB_PORT must be a port number")?,
            None => 3000,
        };
        let token_ttl_hours = match var("JOBHUB_TOKEN_TTL_HOURS") {
            Some(v) => v.parse().context("JOBHUB_TOKEN_TTL_HOURS must be an integer")?,
            None => 168, // 7 days
        };
        if token_ttl_hours <= 0 {
            bail!("JOBHUB_TOKEN_TTL_HOURS must be positive");
        }
        let ai_timeout_secs = match var("JOBHUB_AI_TIMEOUT_SECS") {
            Some(v) => v.parse().context("JOBHUB_AI_TIMEOUT_SECS must be an integer")?,
            None => 60,
        };

        let bootstrap_admin = match (var("JOBHUB_ADMIN_EMAIL"), var("JOBHUB_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some((email, password)),
            (None, None) => None,
            _ => bail!("JOBHUB_ADMIN_EMAIL and JOBHUB_ADMIN_PASSWORD must be set together"),
        };

        Ok(Self {
            host: var("JOBHUB_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_path: var("JOBHUB_DB_PATH").unwrap_or_else(|| "jobhub.db".into()).into(),
            jwt_secret,
            token_ttl_hours,
            ai_service_url: var("JOBHUB_AI_SERVICE_URL"),
            ai_timeout_secs,
            bootstrap_admin,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }
}
