//! poolctl configuration stored at `~/.poolctl/config.json`.
//!
//! The config path resolution chain (highest priority first):
//! 1. `POOLCTL_CONFIG` environment variable
//! 2. `~/.poolctl/config.json`
//!
//! A missing file is not an error; every field has a default. The OCM URL
//! can also be overridden per invocation with `--ocm-url` / `OCM_URL`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use poolctl_access::{TeardownSettings, DEFAULT_JUMP_POD_LABEL_KEY, DEFAULT_OCM_URL};
use poolctl_account::{AccountNaming, AssignSettings};
use poolctl_common::PollConfig;

use crate::{Error, Result};

const CONFIG_DIR_NAME: &str = ".poolctl";
const CONFIG_FILE_NAME: &str = "config.json";
const POOLCTL_CONFIG_ENV: &str = "POOLCTL_CONFIG";

/// Root and destination OUs of one payer account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayerOus {
    /// OU holding unclaimed accounts
    pub root_ou: String,
    /// OU claimed accounts are moved into
    pub destination_ou: String,
}

/// Poll timings, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PollSettings {
    pub account_creation_timeout_secs: u64,
    pub pod_termination_interval_secs: u64,
    pub pod_termination_timeout_secs: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            account_creation_timeout_secs: 600,
            pod_termination_interval_secs: 5,
            pod_termination_timeout_secs: 300,
        }
    }
}

impl PollSettings {
    /// Backoff poll for account creation
    pub fn account_creation(&self) -> PollConfig {
        PollConfig::with_backoff(
            Duration::from_secs(2),
            Duration::from_secs(30),
            Duration::from_secs(self.account_creation_timeout_secs),
        )
    }

    /// Fixed-interval poll for jump pod termination
    pub fn pod_termination(&self) -> PollConfig {
        PollConfig::fixed(
            Duration::from_secs(self.pod_termination_interval_secs.max(1)),
            Duration::from_secs(self.pod_termination_timeout_secs),
        )
    }
}

/// Persistent CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PoolConfig {
    /// Named payer presets selectable with `--payer`
    pub payers: BTreeMap<String, PayerOus>,
    /// Naming of provisioned accounts
    pub naming: AccountNaming,
    /// Label key marking jump pods
    pub jump_pod_label_key: String,
    /// OCM API endpoint
    pub ocm_url: String,
    pub polling: PollSettings,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            payers: BTreeMap::new(),
            naming: AccountNaming::default(),
            jump_pod_label_key: DEFAULT_JUMP_POD_LABEL_KEY.to_string(),
            ocm_url: DEFAULT_OCM_URL.to_string(),
            polling: PollSettings::default(),
        }
    }
}

impl PoolConfig {
    /// OUs for the preset named `payer`
    pub fn payer(&self, payer: &str) -> Result<&PayerOus> {
        self.payers.get(payer).ok_or_else(|| {
            let known: Vec<&str> = self.payers.keys().map(String::as_str).collect();
            Error::validation(format!(
                "unknown payer '{}', configured payers: [{}]",
                payer,
                known.join(", ")
            ))
        })
    }

    /// Settings for the assign workflow
    pub fn assign_settings(&self) -> AssignSettings {
        AssignSettings {
            naming: self.naming.clone(),
            creation_poll: self.polling.account_creation(),
        }
    }

    /// Settings for access teardown
    pub fn teardown_settings(&self) -> TeardownSettings {
        TeardownSettings {
            jump_pod_label_key: self.jump_pod_label_key.clone(),
            termination_poll: self.polling.pod_termination(),
        }
    }
}

/// Returns `~/.poolctl/`.
pub fn poolctl_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| Error::command_failed("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Config file path, honouring `POOLCTL_CONFIG`.
pub fn config_path() -> Result<PathBuf> {
    match std::env::var(POOLCTL_CONFIG_ENV) {
        Ok(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => Ok(poolctl_dir()?.join(CONFIG_FILE_NAME)),
    }
}

/// Load config from the resolved path, returning default if missing.
pub fn load_config() -> Result<PoolConfig> {
    load_config_from(&config_path()?)
}

/// Load config from `path`, returning default if missing.
pub fn load_config_from(path: &Path) -> Result<PoolConfig> {
    if !path.exists() {
        return Ok(PoolConfig::default());
    }
    let data = std::fs::read_to_string(path)
        .map_err(|e| Error::config(path, format!("failed to read: {}", e)))?;
    serde_json::from_str(&data).map_err(|e| Error::config(path, format!("failed to parse: {}", e)))
}
