//! Shared utilities: logging setup and evaluation metrics.

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogConfig};
pub use metrics::{accuracy, EpochReport};
