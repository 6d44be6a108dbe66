//! ready.rs
//!
//! One-shot readiness signals used to sequence dependent startup stages.
//!
//! A [`ReadyTrigger`] is held by the stage that produces readiness; any number
//! of [`ReadySignal`] clones can wait on it. Firing is irreversible and
//! idempotent. If every trigger is dropped without firing, waiters are released
//! with [`KeelError::SignalAbandoned`] instead of hanging forever.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::{KeelError, Result};

/// Creates a linked trigger/signal pair. `name` shows up in logs and errors.
pub fn ready_pair(name: &str) -> (ReadyTrigger, ReadySignal) {
    let (tx, rx) = watch::channel(false);
    let name: Arc<str> = Arc::from(name);
    (
        ReadyTrigger { name: Arc::clone(&name), tx: Arc::new(tx) },
        ReadySignal { name, rx },
    )
}

#[derive(Debug, Clone)]
pub struct ReadyTrigger {
    name: Arc<str>,
    tx: Arc<watch::Sender<bool>>,
}

impl ReadyTrigger {
    /// Marks the signal as ready. Returns `true` only for the call that
    /// performed the transition.
    pub fn fire(&self) -> bool {
        let previous = self.tx.send_replace(true);
        !previous
    }

    pub fn is_fired(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn signal(&self) -> ReadySignal {
        ReadySignal { name: Arc::clone(&self.name), rx: self.tx.subscribe() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone)]
pub struct ReadySignal {
    name: Arc<str>,
    rx: watch::Receiver<bool>,
}

impl ReadySignal {
    /// A signal that is ready from the start, for stages with no upstream.
    pub fn fired(name: &str) -> Self {
        let (trigger, signal) = ready_pair(name);
        trigger.fire();
        signal
    }

    pub fn is_ready(&self) -> bool {
        *self.rx.borrow()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Waits until the signal fires.
    pub async fn wait(&self) -> Result<()> {
        let mut rx = self.rx.clone();
        rx.wait_for(|ready| *ready)
            .await
            .map(|_| ())
            .map_err(|_| KeelError::SignalAbandoned(self.name.to_string()))
    }

    /// Waits until the signal fires or `cancel` is triggered, whichever comes
    /// first. Cancellation wins when both are already true.
    pub async fn wait_or_cancel(&self, cancel: &CancellationToken) -> Result<()> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(KeelError::Cancelled),
            res = self.wait() => res,
        }
    }
}
