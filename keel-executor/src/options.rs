//! Typed per-operation options.
//!
//! Each struct enumerates the options a driver recognizes for one operation.
//! They can be built from a loose JSON object with [`FromExtras`]; unknown keys
//! are rejected with `KeelError::Config` so a typo never silently disables an
//! option.

use std::{collections::BTreeMap, path::PathBuf};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use keel_common::{KeelError, Result};

pub trait FromExtras: DeserializeOwned {
    fn from_extras(extras: Map<String, Value>) -> Result<Self> {
        serde_json::from_value(Value::Object(extras))
            .map_err(|e| KeelError::Config(format!("invalid options: {e}")))
    }
}

/// Options for kubelet, kube-proxy, scheduler, controller-manager and
/// cloud-controller-manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ComponentOptions {
    /// Replaces `<bin-dir>/<component>` as the executable to launch.
    pub binary: Option<PathBuf>,
    /// Extra environment for the launched component.
    pub env: BTreeMap<String, String>,
}

impl FromExtras for ComponentOptions {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ApiServerOptions {
    pub binary: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    /// Static token file backing the returned authenticator
    /// (`token,user,uid,"group1,group2"` per line).
    pub token_file: Option<PathBuf>,
    /// Base URL the returned HTTP handler redirects requests to.
    pub advertise_url: Option<String>,
}

impl FromExtras for ApiServerOptions {}

impl ApiServerOptions {
    pub fn component(&self) -> ComponentOptions {
        ComponentOptions { binary: self.binary.clone(), env: self.env.clone() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct EtcdOptions {
    pub binary: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
}

impl FromExtras for EtcdOptions {}

impl EtcdOptions {
    pub fn component(&self) -> ComponentOptions {
        ComponentOptions { binary: self.binary.clone(), env: self.env.clone() }
    }
}
