//! Process-wide driver slot.
//!
//! Written once during initialization, read by every facade call. A second
//! `register` is rejected rather than silently replacing the active driver.

use std::sync::{Arc, OnceLock};

use keel_common::{KeelError, Result};

use crate::executor::Executor;

static EXECUTOR: OnceLock<Arc<dyn Executor>> = OnceLock::new();

pub fn register(driver: Arc<dyn Executor>) -> Result<()> {
    EXECUTOR.set(driver).map_err(|_| KeelError::AlreadyRegistered)
}

/// The registered driver, or `NoDriver` if initialization has not run yet.
pub fn current() -> Result<Arc<dyn Executor>> {
    EXECUTOR.get().cloned().ok_or(KeelError::NoDriver)
}

pub fn is_registered() -> bool {
    EXECUTOR.get().is_some()
}
