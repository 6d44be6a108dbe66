#![allow(dead_code)]

use std::path::Path;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use axum::Router;
use keel_executor::{
    AgentConfig, AnonymousAuthenticator, ApiServerHandlers, ApiServerOptions, CancellationToken,
    ComponentOptions, EtcdConfig, EtcdOptions, Executor, InitialOptions, KeelError, LaunchSpec,
    Launcher, NodeConfig, ReadySignal, Result,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Bootstrap { node: NodeConfig, agent: AgentConfig },
    Kubelet { args: Vec<String>, options: ComponentOptions },
    KubeProxy { args: Vec<String>, options: ComponentOptions },
    ApiServer { signal: String, args: Vec<String>, options: ApiServerOptions },
    Scheduler { signal: String, args: Vec<String>, options: ComponentOptions },
    ControllerManager { signal: String, args: Vec<String>, options: ComponentOptions },
    CloudControllerManager { signal: String, args: Vec<String>, options: ComponentOptions },
    Etcd { config: EtcdConfig, options: EtcdOptions },
    CurrentEtcdOptions,
}

/// Executor that records every call and starts nothing.
#[derive(Default, Clone)]
pub struct RecordingExecutor {
    pub calls: Arc<Mutex<Vec<Call>>>,
    pub etcd_options: Arc<Mutex<Option<InitialOptions>>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Executor for RecordingExecutor {
    async fn bootstrap(
        &self,
        _cancel: &CancellationToken,
        node: &NodeConfig,
        agent: &AgentConfig,
    ) -> Result<()> {
        self.record(Call::Bootstrap { node: node.clone(), agent: agent.clone() });
        Ok(())
    }

    async fn kubelet(&self, args: Vec<String>, options: ComponentOptions) -> Result<()> {
        self.record(Call::Kubelet { args, options });
        Ok(())
    }

    async fn kube_proxy(&self, args: Vec<String>, options: ComponentOptions) -> Result<()> {
        self.record(Call::KubeProxy { args, options });
        Ok(())
    }

    async fn api_server(
        &self,
        _cancel: &CancellationToken,
        etcd_ready: ReadySignal,
        args: Vec<String>,
        options: ApiServerOptions,
    ) -> Result<ApiServerHandlers> {
        self.record(Call::ApiServer { signal: etcd_ready.name().to_string(), args, options });
        Ok((Arc::new(AnonymousAuthenticator), Router::new()))
    }

    async fn scheduler(
        &self,
        api_ready: ReadySignal,
        args: Vec<String>,
        options: ComponentOptions,
    ) -> Result<()> {
        self.record(Call::Scheduler { signal: api_ready.name().to_string(), args, options });
        Ok(())
    }

    async fn controller_manager(
        &self,
        api_ready: ReadySignal,
        args: Vec<String>,
        options: ComponentOptions,
    ) -> Result<()> {
        self.record(Call::ControllerManager { signal: api_ready.name().to_string(), args, options });
        Ok(())
    }

    fn current_etcd_options(&self) -> Result<InitialOptions> {
        self.record(Call::CurrentEtcdOptions);
        self.etcd_options.lock().unwrap().clone().ok_or(KeelError::EtcdNotStarted)
    }

    async fn etcd(&self, config: EtcdConfig, options: EtcdOptions) -> Result<()> {
        *self.etcd_options.lock().unwrap() = Some(config.initial.clone());
        self.record(Call::Etcd { config, options });
        Ok(())
    }

    async fn cloud_controller_manager(
        &self,
        rbac_ready: ReadySignal,
        args: Vec<String>,
        options: ComponentOptions,
    ) -> Result<()> {
        self.record(Call::CloudControllerManager {
            signal: rbac_ready.name().to_string(),
            args,
            options,
        });
        Ok(())
    }
}

/// Launcher that records launch specs instead of spawning processes.
#[derive(Default, Clone)]
pub struct RecordingLauncher {
    pub launched: Arc<Mutex<Vec<LaunchSpec>>>,
    pub terminated: Arc<AtomicBool>,
}

impl RecordingLauncher {
    pub fn launched(&self) -> Vec<LaunchSpec> {
        self.launched.lock().unwrap().clone()
    }

    pub fn was_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Launcher for RecordingLauncher {
    async fn launch(&self, spec: LaunchSpec) -> Result<()> {
        self.launched.lock().unwrap().push(spec);
        Ok(())
    }

    async fn terminate_all(&self) -> Result<()> {
        self.terminated.store(true, Ordering::SeqCst);
        Ok(())
    }
}

pub fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

pub fn node_in(dir: &Path) -> NodeConfig {
    NodeConfig {
        name: "node1".to_string(),
        data_dir: dir.join("data"),
        bin_dir: dir.join("bin"),
        token: None,
    }
}

pub fn etcd_config(data_dir: &Path) -> EtcdConfig {
    EtcdConfig {
        initial: InitialOptions {
            advertise_peer_url: "https://10.0.0.1:2380".to_string(),
            cluster: "node1=https://10.0.0.1:2380".to_string(),
            state: "new".to_string(),
        },
        name: "node1".to_string(),
        listen_client_urls: "https://127.0.0.1:2379".to_string(),
        advertise_client_urls: "https://10.0.0.1:2379".to_string(),
        data_dir: data_dir.to_path_buf(),
        snapshot_count: 10_000,
        heartbeat_interval: 500,
        election_timeout: 5000,
        logger: "zap".to_string(),
        log_outputs: vec!["stderr".to_string()],
        ..Default::default()
    }
}
