use std::sync::Arc;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::info;

use keel_common::Result;
use keel_executor::{CommandLauncher, DryRunLauncher, ExecutorContext, ProcessExecutor};

/// Backend chosen at start time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DriverKind {
    /// Launch every component as an external process.
    #[default]
    Process,
    /// Log what would be launched without spawning anything.
    DryRun,
}

/// The selected driver, kept concrete so it can be shut down after startup.
pub enum ActiveDriver {
    Process(Arc<ProcessExecutor<CommandLauncher>>),
    DryRun(Arc<ProcessExecutor<DryRunLauncher>>),
}

pub fn select_driver(kind: DriverKind) -> ActiveDriver {
    info!("🔧 selected driver: {:?}", kind);
    match kind {
        DriverKind::Process => ActiveDriver::Process(Arc::new(ProcessExecutor::new())),
        DriverKind::DryRun => ActiveDriver::DryRun(Arc::new(ProcessExecutor::with_launcher(
            DryRunLauncher::new(),
        ))),
    }
}

impl ActiveDriver {
    pub fn context(&self) -> ExecutorContext {
        match self {
            ActiveDriver::Process(d) => ExecutorContext::new(d.clone()),
            ActiveDriver::DryRun(d) => ExecutorContext::new(d.clone()),
        }
    }

    pub async fn shutdown(&self) -> Result<()> {
        match self {
            ActiveDriver::Process(d) => d.shutdown().await,
            ActiveDriver::DryRun(d) => d.shutdown().await,
        }
    }
}
