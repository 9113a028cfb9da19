//! Host-side configuration schemas consumed by plugins.

pub mod logging;

pub use logging::LoggingConfig;
