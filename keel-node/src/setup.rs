use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;

use keel_common::Result;
use keel_executor::{AgentConfig, EtcdConfig, NodeConfig};

use crate::config::NodeSettings;

/// Log target for startup stage events, routed to the audit file.
pub const STARTUP_TARGET: &str = "startup";

/// Writes a default settings file when none exists yet. Returns `true` when
/// it did. Runs before logging is up, so the caller reports the outcome.
pub fn ensure_settings<P: AsRef<Path>>(path: P) -> Result<bool> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(false);
    }

    let suffix = uuid::Uuid::new_v4().to_string();
    let name = format!("node-{}", suffix.split('-').next().unwrap_or("0"));
    let settings = default_settings(name);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    settings.save_to_file(path)?;
    Ok(true)
}

fn default_settings(name: String) -> NodeSettings {
    let data_dir = PathBuf::from("data");
    let etcd = EtcdConfig {
        name: name.clone(),
        data_dir: data_dir.join("db").join("etcd"),
        listen_client_urls: "http://127.0.0.1:2379".into(),
        listen_peer_urls: "http://127.0.0.1:2380".into(),
        advertise_client_urls: "http://127.0.0.1:2379".into(),
        logger: "zap".into(),
        log_outputs: vec!["stderr".into()],
        ..Default::default()
    };

    let mut settings = NodeSettings {
        node: NodeConfig {
            name,
            data_dir,
            bin_dir: PathBuf::from("bin"),
            token: None,
        },
        agent: AgentConfig {
            server_url: "https://127.0.0.1:6443".into(),
            ..Default::default()
        },
        etcd: Some(etcd),
        ..Default::default()
    };
    settings.probes.etcd = Some("127.0.0.1:2379".into());
    settings.probes.api_server = Some("127.0.0.1:6443".into());
    settings
}

/// Installs stdout logging plus a file layer for startup events. The guard
/// must live as long as the process or buffered lines are lost.
pub fn init_logging(log_dir: &Path, node_name: &str) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let file_appender =
        tracing_appender::rolling::never(log_dir, format!("startup-{}.log", node_name));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let startup_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(tracing_subscriber::filter::filter_fn(|metadata| {
            metadata.target() == STARTUP_TARGET || metadata.target().starts_with("keel_executor")
        }));

    let stdout_layer = tracing_subscriber::fmt::layer().with_filter(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "info,keel_node=debug,keel_executor=debug".into()),
    );

    tracing_subscriber::registry()
        .with(startup_layer)
        .with(stdout_layer)
        .try_init()
        .map_err(|e| keel_common::KeelError::Other(format!("logging already initialized: {}", e)))?;
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_settings_writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("config.json");

        assert!(ensure_settings(&path).unwrap());
        let first = NodeSettings::load_from_file(&path).unwrap();
        assert!(first.node.name.starts_with("node-"));
        assert!(first.node.validate().is_ok());
        let etcd = first.etcd.as_ref().unwrap();
        assert_eq!(etcd.name, first.node.name);
        assert_eq!(etcd.log_outputs, vec!["stderr".to_string()]);

        // an existing file is left alone
        assert!(!ensure_settings(&path).unwrap());
        let second = NodeSettings::load_from_file(&path).unwrap();
        assert_eq!(first, second);
    }
}
