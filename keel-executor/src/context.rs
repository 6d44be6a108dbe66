use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use keel_common::{ReadySignal, Result};

use crate::{
    etcd::{EtcdConfig, InitialOptions},
    executor::{ApiServerHandlers, Executor},
    node::{AgentConfig, NodeConfig},
    options::{ApiServerOptions, ComponentOptions, EtcdOptions},
    registry,
};

/// Explicit handle on the selected driver, threaded through orchestration
/// code instead of reading the process-wide registry.
#[derive(Clone)]
pub struct ExecutorContext {
    driver: Arc<dyn Executor>,
}

impl ExecutorContext {
    pub fn new(driver: Arc<dyn Executor>) -> Self {
        Self { driver }
    }

    /// Also publishes this context's driver to the process-wide registry so
    /// the free facade functions reach it.
    pub fn install_global(&self) -> Result<()> {
        registry::register(Arc::clone(&self.driver))
    }

    pub fn driver(&self) -> &Arc<dyn Executor> {
        &self.driver
    }

    pub async fn bootstrap(
        &self,
        cancel: &CancellationToken,
        node: &NodeConfig,
        agent: &AgentConfig,
    ) -> Result<()> {
        self.driver.bootstrap(cancel, node, agent).await
    }

    pub async fn kubelet(&self, args: Vec<String>, options: ComponentOptions) -> Result<()> {
        self.driver.kubelet(args, options).await
    }

    pub async fn kube_proxy(&self, args: Vec<String>, options: ComponentOptions) -> Result<()> {
        self.driver.kube_proxy(args, options).await
    }

    pub async fn api_server(
        &self,
        cancel: &CancellationToken,
        etcd_ready: ReadySignal,
        args: Vec<String>,
        options: ApiServerOptions,
    ) -> Result<ApiServerHandlers> {
        self.driver.api_server(cancel, etcd_ready, args, options).await
    }

    pub async fn scheduler(
        &self,
        api_ready: ReadySignal,
        args: Vec<String>,
        options: ComponentOptions,
    ) -> Result<()> {
        self.driver.scheduler(api_ready, args, options).await
    }

    pub async fn controller_manager(
        &self,
        api_ready: ReadySignal,
        args: Vec<String>,
        options: ComponentOptions,
    ) -> Result<()> {
        self.driver.controller_manager(api_ready, args, options).await
    }

    pub fn current_etcd_options(&self) -> Result<InitialOptions> {
        self.driver.current_etcd_options()
    }

    pub async fn etcd(&self, config: EtcdConfig, options: EtcdOptions) -> Result<()> {
        self.driver.etcd(config, options).await
    }

    pub async fn cloud_controller_manager(
        &self,
        rbac_ready: ReadySignal,
        args: Vec<String>,
        options: ComponentOptions,
    ) -> Result<()> {
        self.driver.cloud_controller_manager(rbac_ready, args, options).await
    }
}
