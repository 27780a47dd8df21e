pub mod logging;

pub use logging::{init_logger, init_stdout_logger, LogConfig, LogTarget, Logger};

// Re-export log crate so downstream crates can use caliper_base::log::*
pub use log;
