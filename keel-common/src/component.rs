use std::fmt;

use serde::{Deserialize, Serialize};

/// The control-plane components a driver knows how to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Component {
    Etcd,
    ApiServer,
    Scheduler,
    ControllerManager,
    CloudControllerManager,
    Kubelet,
    KubeProxy,
}

impl Component {
    pub const ALL: [Component; 7] = [
        Component::Etcd,
        Component::ApiServer,
        Component::Scheduler,
        Component::ControllerManager,
        Component::CloudControllerManager,
        Component::Kubelet,
        Component::KubeProxy,
    ];

    /// Default executable name looked up in the node's binary directory.
    pub fn binary_name(&self) -> &'static str {
        match self {
            Component::Etcd => "etcd",
            Component::ApiServer => "kube-apiserver",
            Component::Scheduler => "kube-scheduler",
            Component::ControllerManager => "kube-controller-manager",
            Component::CloudControllerManager => "cloud-controller-manager",
            Component::Kubelet => "kubelet",
            Component::KubeProxy => "kube-proxy",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary_name())
    }
}
