//! Driver that runs every control-plane component as an external process.

pub mod launcher;

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use axum::{
    http::{StatusCode, Uri},
    response::Redirect,
    Router,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use keel_common::{Component, KeelError, ReadySignal, Result};

use crate::{
    auth::{AnonymousAuthenticator, RequestAuthenticator, StaticTokenAuthenticator},
    etcd::{EtcdConfig, InitialOptions},
    executor::{ApiServerHandlers, Executor},
    fsutil::create_private_dir,
    node::{AgentConfig, NodeConfig},
    options::{ApiServerOptions, ComponentOptions, EtcdOptions},
};

pub use launcher::{CommandLauncher, DryRunLauncher, LaunchSpec, Launcher};

#[derive(Debug, Clone)]
struct BootstrapState {
    node: NodeConfig,
    agent: AgentConfig,
}

pub struct ProcessExecutor<L: Launcher = CommandLauncher> {
    launcher: L,
    state: RwLock<Option<BootstrapState>>,
    etcd_options: RwLock<Option<InitialOptions>>,
}

impl ProcessExecutor<CommandLauncher> {
    pub fn new() -> Self {
        Self::with_launcher(CommandLauncher::new())
    }
}

impl Default for ProcessExecutor<CommandLauncher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Launcher> ProcessExecutor<L> {
    pub fn with_launcher(launcher: L) -> Self {
        Self {
            launcher,
            state: RwLock::new(None),
            etcd_options: RwLock::new(None),
        }
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.state.read().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    /// Stops every process this driver launched.
    pub async fn shutdown(&self) -> Result<()> {
        info!("Stopping control-plane processes...");
        self.launcher.terminate_all().await
    }

    fn bootstrap_state(&self, component: Component) -> Result<BootstrapState> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(KeelError::NotBootstrapped(component))
    }

    fn launch_spec(
        &self,
        state: &BootstrapState,
        component: Component,
        args: Vec<String>,
        options: ComponentOptions,
    ) -> LaunchSpec {
        let program = options
            .binary
            .unwrap_or_else(|| state.node.bin_dir.join(component.binary_name()));

        let current_dir = match component {
            Component::Kubelet | Component::KubeProxy => state
                .agent
                .root_dir
                .clone()
                .or_else(|| Some(state.node.data_dir.clone())),
            _ => Some(state.node.data_dir.clone()),
        };

        LaunchSpec { component, program, args, env: options.env, current_dir }
    }

    /// Checks bootstrap, waits for the upstream signal, then launches.
    async fn start_gated(
        &self,
        component: Component,
        ready: Option<ReadySignal>,
        args: Vec<String>,
        options: ComponentOptions,
    ) -> Result<()> {
        let state = self.bootstrap_state(component)?;

        if let Some(ready) = ready {
            debug!(%component, signal = ready.name(), "waiting for upstream readiness");
            ready.wait().await?;
        }

        let spec = self.launch_spec(&state, component, args, options);
        self.launcher.launch(spec).await
    }
}

fn api_handler(advertise_url: Option<String>) -> Router {
    match advertise_url {
        Some(base) => {
            let base = base.trim_end_matches('/').to_string();
            Router::new().fallback(move |uri: Uri| {
                let base = base.clone();
                async move {
                    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
                    Redirect::temporary(&format!("{base}{path}"))
                }
            })
        }
        None => Router::new().fallback(|| async {
            (StatusCode::SERVICE_UNAVAILABLE, "apiserver is running out of process")
        }),
    }
}

#[async_trait]
impl<L: Launcher + 'static> Executor for ProcessExecutor<L> {
    async fn bootstrap(
        &self,
        cancel: &CancellationToken,
        node: &NodeConfig,
        agent: &AgentConfig,
    ) -> Result<()> {
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = None;

        if cancel.is_cancelled() {
            return Err(KeelError::Cancelled);
        }
        node.validate()?;

        let mut dirs = vec![node.data_dir.clone()];
        if let Some(root) = &agent.root_dir {
            dirs.push(root.clone());
        }
        let create = tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            for dir in &dirs {
                create_private_dir(dir)?;
            }
            Ok(())
        });

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(KeelError::Cancelled),
            res = create => {
                res.map_err(|e| KeelError::Other(format!("bootstrap task failed: {e}")))??;
            }
        }

        *self.state.write().unwrap_or_else(|e| e.into_inner()) =
            Some(BootstrapState { node: node.clone(), agent: agent.clone() });

        info!(node = %node.name, data_dir = %node.data_dir.display(), "✅ process executor bootstrapped");
        Ok(())
    }

    async fn kubelet(&self, args: Vec<String>, options: ComponentOptions) -> Result<()> {
        self.start_gated(Component::Kubelet, None, args, options).await
    }

    async fn kube_proxy(&self, args: Vec<String>, options: ComponentOptions) -> Result<()> {
        let state = self.bootstrap_state(Component::KubeProxy)?;
        if state.agent.disable_kube_proxy {
            info!("kube-proxy disabled, not starting");
            return Ok(());
        }
        self.start_gated(Component::KubeProxy, None, args, options).await
    }

    async fn api_server(
        &self,
        cancel: &CancellationToken,
        etcd_ready: ReadySignal,
        args: Vec<String>,
        options: ApiServerOptions,
    ) -> Result<ApiServerHandlers> {
        let state = self.bootstrap_state(Component::ApiServer)?;

        let authenticator: Arc<dyn RequestAuthenticator> = match &options.token_file {
            Some(path) => Arc::new(StaticTokenAuthenticator::from_file(path)?),
            None => Arc::new(AnonymousAuthenticator),
        };

        debug!(signal = etcd_ready.name(), "apiserver waiting for etcd");
        etcd_ready.wait_or_cancel(cancel).await?;

        let spec = self.launch_spec(&state, Component::ApiServer, args, options.component());
        self.launcher.launch(spec).await?;

        Ok((authenticator, api_handler(options.advertise_url)))
    }

    async fn scheduler(
        &self,
        api_ready: ReadySignal,
        args: Vec<String>,
        options: ComponentOptions,
    ) -> Result<()> {
        self.start_gated(Component::Scheduler, Some(api_ready), args, options).await
    }

    async fn controller_manager(
        &self,
        api_ready: ReadySignal,
        args: Vec<String>,
        options: ComponentOptions,
    ) -> Result<()> {
        self.start_gated(Component::ControllerManager, Some(api_ready), args, options).await
    }

    fn current_etcd_options(&self) -> Result<InitialOptions> {
        self.etcd_options
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(KeelError::EtcdNotStarted)
    }

    async fn etcd(&self, config: EtcdConfig, options: EtcdOptions) -> Result<()> {
        let state = self.bootstrap_state(Component::Etcd)?;

        let initial = config.initial.clone();
        let conf_file = tokio::task::spawn_blocking(move || config.to_config_file())
            .await
            .map_err(|e| KeelError::Other(format!("etcd config task failed: {e}")))??;
        info!(path = %conf_file.display(), "📝 etcd config written");

        let args = vec!["--config-file".to_string(), conf_file.display().to_string()];
        let spec = self.launch_spec(&state, Component::Etcd, args, options.component());
        self.launcher.launch(spec).await?;

        *self.etcd_options.write().unwrap_or_else(|e| e.into_inner()) = Some(initial);
        Ok(())
    }

    async fn cloud_controller_manager(
        &self,
        rbac_ready: ReadySignal,
        args: Vec<String>,
        options: ComponentOptions,
    ) -> Result<()> {
        self.start_gated(Component::CloudControllerManager, Some(rbac_ready), args, options)
            .await
    }
}
