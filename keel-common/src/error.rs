// src/error.rs
use thiserror::Error;

use crate::component::Component;

pub type Result<T> = std::result::Result<T, KeelError>;

#[derive(Debug, Error)]
pub enum KeelError {
    #[error("Invalid config: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A facade call was made before any driver was registered.
    #[error("no executor driver registered")]
    NoDriver,

    #[error("an executor driver is already registered")]
    AlreadyRegistered,

    #[error("executor not bootstrapped, cannot start {0}")]
    NotBootstrapped(Component),

    /// `current_etcd_options` was queried before the driver ever started etcd.
    #[error("etcd options not established: etcd has not been started by this driver")]
    EtcdNotStarted,

    #[error("operation cancelled")]
    Cancelled,

    /// Every trigger of a readiness signal was dropped before it fired.
    #[error("readiness signal '{0}' abandoned before firing")]
    SignalAbandoned(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Other: {0}")]
    Other(String),
}

impl From<serde_json::Error> for KeelError {
    fn from(err: serde_json::Error) -> Self {
        KeelError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for KeelError {
    fn from(err: serde_yaml::Error) -> Self {
        KeelError::Serialization(err.to_string())
    }
}
