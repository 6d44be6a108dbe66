//! etcd.rs
//!
//! Configuration model for the embedded etcd member and its materialization
//! to `<data-dir>/config`, the file handed to `etcd --config-file`.
//!
//! Key names follow etcd's own config-file format. Optional members are
//! skipped when zero-valued; the two transport-security blocks are always
//! written.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use keel_common::{KeelError, Result};

use crate::fsutil::{create_private_dir, write_private_file};

pub const CONFIG_FILE_NAME: &str = "config";

/// Minimal bootstrap options describing how this member joins the cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialOptions {
    #[serde(rename = "initial-advertise-peer-urls", skip_serializing_if = "String::is_empty")]
    pub advertise_peer_url: String,

    #[serde(rename = "initial-cluster", skip_serializing_if = "String::is_empty")]
    pub cluster: String,

    /// `new` or `existing`.
    #[serde(rename = "initial-cluster-state", skip_serializing_if = "String::is_empty")]
    pub state: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TransportSecurity {
    pub cert_file: String,
    pub key_file: String,
    pub client_cert_auth: bool,
    pub trusted_ca_file: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EtcdConfig {
    #[serde(flatten)]
    pub initial: InitialOptions,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub listen_client_urls: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub listen_metrics_urls: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub listen_peer_urls: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub advertise_client_urls: String,

    #[serde(skip_serializing_if = "is_empty_path")]
    pub data_dir: PathBuf,
    #[serde(skip_serializing_if = "is_zero")]
    pub snapshot_count: u64,

    #[serde(rename = "client-transport-security")]
    pub server_trust: TransportSecurity,
    #[serde(rename = "peer-transport-security")]
    pub peer_trust: TransportSecurity,

    #[serde(skip_serializing_if = "is_false")]
    pub force_new_cluster: bool,
    /// Milliseconds.
    #[serde(skip_serializing_if = "is_zero")]
    pub heartbeat_interval: u64,
    /// Milliseconds.
    #[serde(skip_serializing_if = "is_zero")]
    pub election_timeout: u64,

    pub logger: String,
    pub log_outputs: Vec<String>,
}

fn is_zero(v: &u64) -> bool {
    *v == 0
}

fn is_false(v: &bool) -> bool {
    !*v
}

fn is_empty_path(p: &Path) -> bool {
    p.as_os_str().is_empty()
}

impl EtcdConfig {
    /// `<data-dir>/config`.
    pub fn config_file_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE_NAME)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_yaml(data: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(data)?)
    }

    /// Writes the configuration to `<data-dir>/config` and returns that path.
    ///
    /// The data directory is created (0700) with any missing parents; the file
    /// is written 0600 and fully replaced on every call, so materializing the
    /// same value twice yields identical bytes. Callers must serialize
    /// concurrent calls targeting the same directory.
    pub fn to_config_file(&self) -> Result<PathBuf> {
        if is_empty_path(&self.data_dir) {
            return Err(KeelError::Config("etcd data-dir must be set".to_string()));
        }

        let conf_file = self.config_file_path();
        let yaml = self.to_yaml()?;

        create_private_dir(&self.data_dir)?;
        write_private_file(&conf_file, yaml.as_bytes())?;
        Ok(conf_file)
    }

    pub fn load_config_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_yaml(&data)
    }
}
