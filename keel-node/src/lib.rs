pub mod cli;
pub mod config;
pub mod driver;
pub mod runtime;
pub mod setup;

pub use config::NodeSettings;
pub use driver::{select_driver, ActiveDriver, DriverKind};
pub use runtime::probe::{ReadinessProbe, SignalProbe, TcpProbe};
pub use runtime::sequencer::{start, Probes, StartupHandle};
