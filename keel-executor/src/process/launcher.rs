use std::{collections::BTreeMap, path::PathBuf, process::Stdio};

use async_trait::async_trait;
use tokio::{process::Child, process::Command, sync::Mutex};
use tracing::{info, warn};

use keel_common::{Component, KeelError, Result};

/// Everything needed to start one component process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub component: Component,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub current_dir: Option<PathBuf>,
}

/// Starts component processes. Supervision and restarts are not its concern.
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(&self, spec: LaunchSpec) -> Result<()>;

    async fn terminate_all(&self) -> Result<()>;
}

/// Spawns real OS processes with `tokio::process`.
#[derive(Debug, Default)]
pub struct CommandLauncher {
    children: Mutex<Vec<(Component, Child)>>,
}

impl CommandLauncher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Launcher for CommandLauncher {
    async fn launch(&self, spec: LaunchSpec) -> Result<()> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .envs(&spec.env)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if let Some(dir) = &spec.current_dir {
            cmd.current_dir(dir);
        }

        let child = cmd.spawn().map_err(|e| {
            KeelError::Backend(format!(
                "failed to launch {} ({}): {}",
                spec.component,
                spec.program.display(),
                e
            ))
        })?;

        info!(component = %spec.component, pid = ?child.id(), "🚀 process started");
        self.children.lock().await.push((spec.component, child));
        Ok(())
    }

    async fn terminate_all(&self) -> Result<()> {
        let mut children = self.children.lock().await;
        // reverse launch order: dependents go first
        while let Some((component, mut child)) = children.pop() {
            if let Err(e) = child.start_kill() {
                warn!(%component, "could not signal process: {}", e);
                continue;
            }
            match child.wait().await {
                Ok(status) => info!(%component, %status, "🔴 process stopped"),
                Err(e) => warn!(%component, "error waiting for process: {}", e),
            }
        }
        Ok(())
    }
}

/// Logs what would be launched and keeps the specs instead of spawning.
#[derive(Debug, Default)]
pub struct DryRunLauncher {
    launched: std::sync::Mutex<Vec<LaunchSpec>>,
}

impl DryRunLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn launched(&self) -> Vec<LaunchSpec> {
        self.launched.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Launcher for DryRunLauncher {
    async fn launch(&self, spec: LaunchSpec) -> Result<()> {
        info!(
            component = %spec.component,
            program = %spec.program.display(),
            args = ?spec.args,
            "[dry-run] would launch"
        );
        self.launched.lock().unwrap_or_else(|e| e.into_inner()).push(spec);
        Ok(())
    }

    async fn terminate_all(&self) -> Result<()> {
        let count = self.launched.lock().unwrap_or_else(|e| e.into_inner()).len();
        info!("[dry-run] would stop {} processes", count);
        Ok(())
    }
}
