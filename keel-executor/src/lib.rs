// lib.rs
pub mod auth;
pub mod context;
pub mod etcd;
pub mod executor;
pub mod facade;
mod fsutil;
pub mod node;
pub mod options;
pub mod process;
pub mod registry;

pub use auth::{AnonymousAuthenticator, RequestAuthenticator, StaticTokenAuthenticator, UserInfo};
pub use context::ExecutorContext;
pub use etcd::{EtcdConfig, InitialOptions, TransportSecurity};
pub use executor::{ApiServerHandlers, Executor};
pub use node::{AgentConfig, NodeConfig};
pub use options::{ApiServerOptions, ComponentOptions, EtcdOptions, FromExtras};
pub use process::{CommandLauncher, DryRunLauncher, LaunchSpec, Launcher, ProcessExecutor};
pub use registry::register;

pub use keel_common::{
    ready_pair, CancellationToken, Component, KeelError, ReadySignal, ReadyTrigger, Result,
};
