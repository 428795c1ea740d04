//! Utility module: errors, logging, and metrics.

pub mod errors;
pub mod metrics;
pub mod logging;

pub use errors::{NotaryError, Result};
pub use metrics::{MetricsRegistry, METRICS};
pub use logging::init_logging;
