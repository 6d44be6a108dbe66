//! Free functions forwarding to the registered driver.
//!
//! Arguments and results pass through untouched. Every call fails with
//! `KeelError::NoDriver` when no driver has been registered.

use tokio_util::sync::CancellationToken;

use keel_common::{ReadySignal, Result};

use crate::{
    etcd::{EtcdConfig, InitialOptions},
    executor::ApiServerHandlers,
    node::{AgentConfig, NodeConfig},
    options::{ApiServerOptions, ComponentOptions, EtcdOptions},
    registry,
};

pub async fn bootstrap(
    cancel: &CancellationToken,
    node: &NodeConfig,
    agent: &AgentConfig,
) -> Result<()> {
    registry::current()?.bootstrap(cancel, node, agent).await
}

pub async fn kubelet(args: Vec<String>, options: ComponentOptions) -> Result<()> {
    registry::current()?.kubelet(args, options).await
}

pub async fn kube_proxy(args: Vec<String>, options: ComponentOptions) -> Result<()> {
    registry::current()?.kube_proxy(args, options).await
}

pub async fn api_server(
    cancel: &CancellationToken,
    etcd_ready: ReadySignal,
    args: Vec<String>,
    options: ApiServerOptions,
) -> Result<ApiServerHandlers> {
    registry::current()?.api_server(cancel, etcd_ready, args, options).await
}

pub async fn scheduler(
    api_ready: ReadySignal,
    args: Vec<String>,
    options: ComponentOptions,
) -> Result<()> {
    registry::current()?.scheduler(api_ready, args, options).await
}

pub async fn controller_manager(
    api_ready: ReadySignal,
    args: Vec<String>,
    options: ComponentOptions,
) -> Result<()> {
    registry::current()?.controller_manager(api_ready, args, options).await
}

pub fn current_etcd_options() -> Result<InitialOptions> {
    registry::current()?.current_etcd_options()
}

pub async fn etcd(config: EtcdConfig, options: EtcdOptions) -> Result<()> {
    registry::current()?.etcd(config, options).await
}

pub async fn cloud_controller_manager(
    rbac_ready: ReadySignal,
    args: Vec<String>,
    options: ComponentOptions,
) -> Result<()> {
    registry::current()?.cloud_controller_manager(rbac_ready, args, options).await
}
