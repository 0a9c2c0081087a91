use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ProvisionError;
use crate::infra::db::readiness::ReadinessStrategy;

pub const DEFAULT_DATA_DIR: &str = "App_Data";
pub const DEFAULT_ADMIN_CATALOG: &str = "master";
pub const DEFAULT_SETTLE_MS: u64 = 5000;
pub const DEFAULT_READY_TIMEOUT_MS: u64 = 30000;

/// Settings for one provisioning run. Built once before the run starts and
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionSettings {
    /// Data directory for `.mdf`/`.ldf` files, relative to the executable unless absolute.
    pub data_dir: PathBuf,
    /// Catalog used for server-level statements such as `CREATE DATABASE`.
    pub admin_catalog: String,
    pub readiness: ReadinessStrategy,
}

impl Default for ProvisionSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            admin_catalog: DEFAULT_ADMIN_CATALOG.to_string(),
            readiness: ReadinessStrategy::default(),
        }
    }
}

impl ProvisionSettings {
    /// Read settings from `SQLPROV_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ProvisionError> {
        let data_dir = PathBuf::from(
            env::var("SQLPROV_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string()),
        );

        let admin_catalog = env::var("SQLPROV_ADMIN_CATALOG")
            .unwrap_or_else(|_| DEFAULT_ADMIN_CATALOG.to_string());
        if admin_catalog.trim().is_empty() {
            return Err(ProvisionError::config(
                "SQLPROV_ADMIN_CATALOG must not be empty",
            ));
        }

        let readiness = match env::var("SQLPROV_READINESS")
            .unwrap_or_else(|_| "fixed".to_string())
            .to_lowercase()
            .as_str()
        {
            "fixed" => ReadinessStrategy::FixedDelay(Duration::from_millis(millis_var(
                "SQLPROV_SETTLE_MS",
                DEFAULT_SETTLE_MS,
            )?)),
            "poll" => ReadinessStrategy::poll(Duration::from_millis(millis_var(
                "SQLPROV_READY_TIMEOUT_MS",
                DEFAULT_READY_TIMEOUT_MS,
            )?)),
            other => {
                return Err(ProvisionError::config(format!(
                    "SQLPROV_READINESS must be 'fixed' or 'poll', got '{other}'"
                )))
            }
        };

        Ok(Self {
            data_dir,
            admin_catalog,
            readiness,
        })
    }
}

fn millis_var(name: &str, default: u64) -> Result<u64, ProvisionError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<u64>().map_err(|_| {
            ProvisionError::config(format!(
                "Environment variable '{name}' must be a number of milliseconds, got '{raw}'"
            ))
        }),
        Err(_) => Ok(default),
    }
}
