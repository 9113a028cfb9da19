//! # docsmith-scripts
//!
//! Docsmith plugin that lets users bind external `rhai` script files to
//! build lifecycle events. Provides:
//!
//! - A configuration scheme generated from the fixed event list, one
//!   entry per event accepting a repeatable list of script bindings
//! - A dispatch table built once at plugin construction, one handler
//!   per event, with per-event overrides
//! - A script executor that runs an event's bindings in declared order,
//!   optionally threading the carried pipeline object through them
//! - A module loader that compiles each referenced script fresh on
//!   every dispatch (deliberately uncached)
//!
//! Scripts run with the full ambient privileges of the host process;
//! there is no sandboxing or resource limiting.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod loader;
pub mod plugin;

pub use config::{OPTIONS_SCHEMA, ScriptBinding, ScriptsConfig, config_scheme};
pub use dispatch::DispatchTable;
pub use error::ScriptError;
pub use executor::ScriptExecutor;
pub use loader::{ModuleLoader, SCRIPT_EXTENSION};
pub use plugin::ScriptsPlugin;
