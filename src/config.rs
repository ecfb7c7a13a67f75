use std::env;
use std::path::PathBuf;

use derive_more::{Display, Error};
use log::warn;

pub const DEFAULT_JWT_SECRET: &str = "dev_secret_change_me";
const DEFAULT_PORT: u16 = 4000;
const DEFAULT_PYTHON_CMD: &str = "python3";

#[derive(Debug, Display, Error)]
pub enum ConfigError {
    #[display(fmt = "environment variable '{}' must be set", _0)]
    Missing(#[error(not(source))] &'static str),

    #[display(fmt = "environment variable '{}' has an invalid value", _0)]
    Invalid(#[error(not(source))] &'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub master_admin_code: Option<String>,
    pub importer: ImporterConfig,
}

#[derive(Debug, Clone)]
pub struct ImporterConfig {
    /// Interpreter command line, e.g. `python3` or `npx python`.
    pub python_cmd: String,
    /// Explicit script location, probed before the built-in candidates.
    pub script: Option<PathBuf>,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            python_cmd: DEFAULT_PYTHON_CMD.to_string(),
            script: None,
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Reads the configuration from the environment. `.env` must already be loaded.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = non_empty("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let port = match non_empty("PORT") {
            Some(v) => v.parse::<u16>().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => DEFAULT_PORT,
        };
        let jwt_secret = non_empty("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET is not set, falling back to the development secret");
            DEFAULT_JWT_SECRET.to_string()
        });

        Ok(Self {
            database_url,
            host: non_empty("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            jwt_secret,
            master_admin_code: non_empty("MASTER_ADMIN_CODE"),
            importer: ImporterConfig {
                python_cmd: non_empty("PYTHON_CMD").unwrap_or_else(|| DEFAULT_PYTHON_CMD.to_string()),
                script: non_empty("IMPORT_SCRIPT").map(PathBuf::from),
            },
        })
    }
}
