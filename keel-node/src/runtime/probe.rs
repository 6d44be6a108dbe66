use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tracing::debug;

use keel_common::{CancellationToken, KeelError, ReadySignal, Result};

/// Decides when a launched component is ready to be depended on.
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    /// Resolves once the component is ready, or with `Cancelled`.
    async fn wait_ready(&self, cancel: &CancellationToken) -> Result<()>;
}

/// Ready as soon as it is asked.
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

#[async_trait]
impl ReadinessProbe for Immediate {
    async fn wait_ready(&self, cancel: &CancellationToken) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(KeelError::Cancelled);
        }
        Ok(())
    }
}

/// Polls a TCP address until a connection is accepted.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    addr: String,
    interval: Duration,
}

impl TcpProbe {
    pub fn new(addr: impl Into<String>, interval: Duration) -> Self {
        Self { addr: addr.into(), interval }
    }
}

#[async_trait]
impl ReadinessProbe for TcpProbe {
    async fn wait_ready(&self, cancel: &CancellationToken) -> Result<()> {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(KeelError::Cancelled),
                res = TcpStream::connect(&self.addr) => match res {
                    Ok(_) => return Ok(()),
                    Err(e) => debug!(addr = %self.addr, "probe not ready: {}", e),
                },
            }
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(KeelError::Cancelled),
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }
}

/// Ready when another signal fires.
#[derive(Debug, Clone)]
pub struct SignalProbe {
    signal: ReadySignal,
}

impl SignalProbe {
    pub fn new(signal: ReadySignal) -> Self {
        Self { signal }
    }
}

#[async_trait]
impl ReadinessProbe for SignalProbe {
    async fn wait_ready(&self, cancel: &CancellationToken) -> Result<()> {
        self.signal.wait_or_cancel(cancel).await
    }
}
