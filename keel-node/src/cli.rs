use std::path::PathBuf;

use clap::Parser;

use crate::driver::DriverKind;

#[derive(Parser, Debug)]
#[command(name = "keel-node")]
#[command(about = "Starts the control-plane and node components through a pluggable executor")]
pub struct Args {
    /// Settings file, created with defaults when missing
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    pub config: PathBuf,

    /// Overrides the driver named in the settings file
    #[arg(long, value_enum)]
    pub driver: Option<DriverKind>,

    /// Overrides the node data directory
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[arg(long, value_name = "DIR", default_value = "logs")]
    pub log_dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["keel-node"]);
        assert_eq!(args.config, PathBuf::from("config.json"));
        assert_eq!(args.log_dir, PathBuf::from("logs"));
        assert!(args.driver.is_none());
        assert!(args.data_dir.is_none());
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "keel-node",
            "--config",
            "/etc/keel/node.json",
            "--driver",
            "dry-run",
            "--data-dir",
            "/var/lib/keel",
        ]);
        assert_eq!(args.config, PathBuf::from("/etc/keel/node.json"));
        assert_eq!(args.driver, Some(DriverKind::DryRun));
        assert_eq!(args.data_dir, Some(PathBuf::from("/var/lib/keel")));
    }
}
