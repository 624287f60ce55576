use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, bail};

use foodconnect_api::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub environment: Environment,
    pub enforce_ownership: bool,
    pub strict_status: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset and blank values take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("PORT must be a port number, got '{}'", raw))?,
            None => 5000,
        };

        let environment = match get("FOODCONNECT_ENV").as_deref() {
            None | Some("development") => Environment::Development,
            Some("production") => Environment::Production,
            Some(other) => bail!(
                "FOODCONNECT_ENV must be 'development' or 'production', got '{}'",
                other
            ),
        };

        Ok(Self {
            host: get("FOODCONNECT_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_path: get("FOODCONNECT_DB_PATH")
                .unwrap_or_else(|| "foodconnect.db".into())
                .into(),
            environment,
            enforce_ownership: flag(&get, "FOODCONNECT_ENFORCE_OWNERSHIP")?,
            strict_status: flag(&get, "FOODCONNECT_STRICT_STATUS")?,
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }

    pub fn settings(&self) -> Settings {
        Settings {
            expose_errors: self.environment == Environment::Development,
            enforce_ownership: self.enforce_ownership,
            strict_transitions: self.strict_status,
        }
    }
}

fn flag(get: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<bool> {
    match get(key).map(|v| v.to_ascii_lowercase()).as_deref() {
        None | Some("0") | Some("false") | Some("no") | Some("off") => Ok(false),
        Some("1") | Some("true") | Some("yes") | Some("on") => Ok(true),
        Some(other) => bail!("{} must be true or false, got '{}'", key, other),
    }
}
