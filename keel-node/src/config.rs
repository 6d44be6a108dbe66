use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use keel_common::Result;
use keel_executor::{AgentConfig, EtcdConfig, NodeConfig};

use crate::driver::DriverKind;

/// Everything the node binary needs to bring its components up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSettings {
    pub driver: DriverKind,
    pub node: NodeConfig,
    pub agent: AgentConfig,
    /// Absent when etcd runs elsewhere; etcd readiness then comes from the probe alone.
    pub etcd: Option<EtcdConfig>,
    pub components: ComponentSettings,
    pub probes: ProbeSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentSettings {
    /// Raw etcd driver options, decoded into `EtcdOptions` at startup.
    pub etcd_options: Map<String, Value>,
    pub api_server: StageSettings,
    pub scheduler: StageSettings,
    pub controller_manager: StageSettings,
    pub cloud_controller_manager: StageSettings,
    pub kubelet: StageSettings,
    pub kube_proxy: StageSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageSettings {
    pub enabled: bool,
    pub args: Vec<String>,
    pub options: Map<String, Value>,
}

impl Default for StageSettings {
    fn default() -> Self {
        Self { enabled: true, args: Vec::new(), options: Map::new() }
    }
}

/// Addresses polled to decide when a component is ready. A missing address
/// means the stage counts as ready once its driver call returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    pub etcd: Option<String>,
    pub api_server: Option<String>,
    pub interval_ms: u64,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self { etcd: None, api_server: None, interval_ms: 500 }
    }
}

impl NodeSettings {
    /// Moves the node data dir, taking the local etcd data dir along with it.
    pub fn set_data_dir(&mut self, dir: PathBuf) {
        if let Some(etcd) = self.etcd.as_mut() {
            etcd.data_dir = dir.join("db").join("etcd");
        }
        self.node.data_dir = dir;
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let parsed = serde_json::from_str::<NodeSettings>(&data)?;
        Ok(parsed)
    }
}
