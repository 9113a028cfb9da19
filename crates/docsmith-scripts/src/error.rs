//! Unified error type for the scripts plugin.
//!
//! All script resolution and invocation failures are consolidated into a
//! single `ScriptError` enum that maps cleanly to
//! `docsmith_core::error::AppError`.

use std::path::PathBuf;

use thiserror::Error;

use docsmith_core::LifecycleEvent;
use docsmith_core::error::{AppError, ErrorKind};

/// Unified error type for script loading and execution.
#[derive(Debug, Error)]
pub enum ScriptError {
    // --- Resolution errors ---
    /// The referenced script file does not exist.
    #[error("script module not found: {path}")]
    ModuleNotFound {
        /// The resolved path that was checked.
        path: PathBuf,
    },

    /// The script file failed to compile.
    #[error("failed to compile script module '{id}': {message}")]
    Compile {
        /// Derived module identifier.
        id: String,
        /// Compiler diagnostic.
        message: String,
    },

    /// The configured function is not defined at the module's top level.
    #[error("function '{function}' not found in script module '{id}'")]
    FunctionNotFound {
        /// The function name that was looked up.
        function: String,
        /// Derived module identifier.
        id: String,
    },

    /// The function exists but does not match the expected call contract.
    #[error(
        "function '{function}' in script module '{id}' takes {actual} parameter(s), expected {expected}"
    )]
    SignatureMismatch {
        /// The function name.
        function: String,
        /// Derived module identifier.
        id: String,
        /// Parameter count the call contract requires.
        expected: usize,
        /// Parameter count the script function declares.
        actual: usize,
    },

    // --- Invocation errors ---
    /// The script function raised an error; propagated unmodified.
    #[error("script function '{function}' in module '{id}' failed: {message}")]
    Execution {
        /// The function name.
        function: String,
        /// Derived module identifier.
        id: String,
        /// The script's error, rendered.
        message: String,
    },

    /// A value could not cross the host/script boundary.
    #[error("cannot convert value for script module '{id}': {message}")]
    Value {
        /// Derived module identifier.
        id: String,
        /// Conversion diagnostic.
        message: String,
    },

    // --- State errors ---
    /// A module path was resolved before the base directory was set.
    #[error("base directory not established before '{event}' dispatch")]
    BaseDirUnset {
        /// The event whose dispatch hit the unset state.
        event: LifecycleEvent,
    },
}

impl From<ScriptError> for AppError {
    fn from(err: ScriptError) -> Self {
        let kind = match &err {
            ScriptError::ModuleNotFound { .. } => ErrorKind::NotFound,
            ScriptError::Compile { .. }
            | ScriptError::FunctionNotFound { .. }
            | ScriptError::SignatureMismatch { .. }
            | ScriptError::Execution { .. }
            | ScriptError::Value { .. } => ErrorKind::Script,
            ScriptError::BaseDirUnset { .. } => ErrorKind::Internal,
        };
        AppError::new(kind, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_not_found_maps_to_script_kind() {
        let err: AppError = ScriptError::FunctionNotFound {
            function: "main".to_string(),
            id: "script_plugin_setup".to_string(),
        }
        .into();
        assert_eq!(err.kind, ErrorKind::Script);
        assert!(err.message.contains("main"));
        assert!(err.message.contains("script_plugin_setup"));
    }

    #[test]
    fn test_module_not_found_maps_to_not_found_kind() {
        let err: AppError = ScriptError::ModuleNotFound {
            path: PathBuf::from("/proj/scripts/hook.rhai"),
        }
        .into();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn test_base_dir_unset_names_the_event() {
        let err = ScriptError::BaseDirUnset {
            event: LifecycleEvent::PreBuild,
        };
        assert!(err.to_string().contains("pre_build"));
    }
}
