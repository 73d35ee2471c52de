use std::{env, fmt, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{anyhow, bail};

use crate::processor::paystack::DEFAULT_BASE_URL;

pub const LOCAL_FRONTEND_ORIGIN: &str = "http://localhost:4243";
pub const CALLBACK_PATH: &str = "/Payment-success";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub frontend_url: String,
    pub paystack_secret_key: String,
    pub paystack_base_url: String,
    pub paystack_timeout: Duration,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub store_timeout: Duration,
    pub idempotent_verification: bool,
    pub static_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key/value source; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let paystack_secret_key =
            get("PAYSTACK_SECRET_KEY").ok_or_else(|| anyhow!("PAYSTACK_SECRET_KEY is not set"))?;

        let environment = match get("APP_ENV").or_else(|| get("NODE_ENV")).as_deref() {
            Some("production") => Environment::Production,
            _ => Environment::Development,
        };

        let port = parse_or("APP_PORT", get("APP_PORT").or_else(|| get("PORT")), 5001)?;

        Ok(Self {
            host: get("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            environment,
            frontend_url: get("FRONTEND_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| LOCAL_FRONTEND_ORIGIN.to_string()),
            paystack_secret_key,
            paystack_base_url: get("PAYSTACK_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            paystack_timeout: Duration::from_secs(parse_or(
                "PAYSTACK_TIMEOUT_SECS",
                get("PAYSTACK_TIMEOUT_SECS"),
                15,
            )?),
            database_url: get("DATABASE_URL"),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), 10)?,
            store_timeout: Duration::from_secs(parse_or(
                "STORE_TIMEOUT_SECS",
                get("STORE_TIMEOUT_SECS"),
                10,
            )?),
            idempotent_verification: parse_flag(
                "IDEMPOTENT_VERIFICATION",
                get("IDEMPOTENT_VERIFICATION"),
                true,
            )?,
            static_dir: get("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("build")),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn callback_url(&self) -> String {
        format!("{}{}", self.frontend_url, CALLBACK_PATH)
    }

    pub fn allowed_origins(&self) -> Vec<String> {
        let mut origins = vec![self.frontend_url.clone()];
        if self.frontend_url != LOCAL_FRONTEND_ORIGIN {
            origins.push(LOCAL_FRONTEND_ORIGIN.to_string());
        }
        origins
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("environment", &self.environment)
            .field("frontend_url", &self.frontend_url)
            .field("paystack_secret_key", &"[redacted]")
            .field("paystack_base_url", &self.paystack_base_url)
            .field("paystack_timeout", &self.paystack_timeout)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("store_timeout", &self.store_timeout)
            .field("idempotent_verification", &self.idempotent_verification)
            .field("static_dir", &self.static_dir)
            .finish()
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|err| anyhow!("invalid {key} {raw:?}: {err}")),
        None => Ok(default),
    }
}

fn parse_flag(key: &str, value: Option<String>, default: bool) -> anyhow::Result<bool> {
    let Some(raw) = value else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("invalid {key} {raw:?}: expected true or false"),
    }
}
