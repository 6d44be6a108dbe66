use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use tokio_util::sync::CancellationToken;

use keel_common::{ReadySignal, Result};

use crate::{
    auth::RequestAuthenticator,
    etcd::{EtcdConfig, InitialOptions},
    node::{AgentConfig, NodeConfig},
    options::{ApiServerOptions, ComponentOptions, EtcdOptions},
};

/// What `api_server` hands back: the request authenticator and the HTTP
/// handler to mount on the shared server. Neither is started by the call.
pub type ApiServerHandlers = (Arc<dyn RequestAuthenticator>, Router);

/// Capability set a backend must provide to start the control-plane components.
///
/// Operations taking a [`ReadySignal`] must not start their component before
/// that signal fires. Only `bootstrap` and `api_server` accept a cancellation
/// token; the rest run to completion or failure.
#[async_trait]
pub trait Executor: Send + Sync {
    /// One-time backend initialization. Fails fast, leaving no partial state.
    async fn bootstrap(
        &self,
        cancel: &CancellationToken,
        node: &NodeConfig,
        agent: &AgentConfig,
    ) -> Result<()>;

    async fn kubelet(&self, args: Vec<String>, options: ComponentOptions) -> Result<()>;

    async fn kube_proxy(&self, args: Vec<String>, options: ComponentOptions) -> Result<()>;

    async fn api_server(
        &self,
        cancel: &CancellationToken,
        etcd_ready: ReadySignal,
        args: Vec<String>,
        options: ApiServerOptions,
    ) -> Result<ApiServerHandlers>;

    async fn scheduler(
        &self,
        api_ready: ReadySignal,
        args: Vec<String>,
        options: ComponentOptions,
    ) -> Result<()>;

    async fn controller_manager(
        &self,
        api_ready: ReadySignal,
        args: Vec<String>,
        options: ComponentOptions,
    ) -> Result<()>;

    /// The initial options of the etcd member this driver started.
    /// Pure read; fails with `EtcdNotStarted` if `etcd` never ran.
    fn current_etcd_options(&self) -> Result<InitialOptions>;

    async fn etcd(&self, config: EtcdConfig, options: EtcdOptions) -> Result<()>;

    async fn cloud_controller_manager(
        &self,
        rbac_ready: ReadySignal,
        args: Vec<String>,
        options: ComponentOptions,
    ) -> Result<()>;
}
