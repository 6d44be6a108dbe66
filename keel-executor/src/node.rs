use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use keel_common::{KeelError, Result};

/// Node identity and filesystem layout consumed by `Executor::bootstrap`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub name: String,
    pub data_dir: PathBuf,
    /// Directory holding the component executables.
    pub bin_dir: PathBuf,
    pub token: Option<String>,
}

impl NodeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(KeelError::Config("node name must not be empty".to_string()));
        }
        if self.data_dir.as_os_str().is_empty() {
            return Err(KeelError::Config(format!("node {} has no data dir", self.name)));
        }
        Ok(())
    }
}

/// Agent-level settings shared by kubelet and kube-proxy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub server_url: String,
    pub node_ip: Option<String>,
    /// Working directory for the node agent. Falls back to the node data dir.
    pub root_dir: Option<PathBuf>,
    pub disable_kube_proxy: bool,
}
