pub mod component;
pub mod error;
pub mod ready;

pub use component::Component;
pub use error::{KeelError, Result};
pub use ready::{ready_pair, ReadySignal, ReadyTrigger};
pub use tokio_util::sync::CancellationToken;
