//! Script executor — runs all bindings configured for one event firing.
//!
//! Bindings execute strictly sequentially in declared order; the carried
//! object is a single-writer baton passed from one binding's output to
//! the next binding's input. Any failure is fatal and propagates
//! unmodified, discarding object transformations from earlier bindings
//! of the same firing.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use docsmith_core::context::EventContext;
use docsmith_core::events::LifecycleEvent;
use docsmith_core::result::AppResult;

use crate::config::ScriptBinding;
use crate::error::ScriptError;
use crate::loader::ModuleLoader;

/// Resolves and runs script bindings for lifecycle events.
#[derive(Debug)]
pub struct ScriptExecutor {
    /// Directory all relative module paths resolve against. Established
    /// at the `config` event, before any other event fires.
    base_dir: Option<PathBuf>,
    /// The module loader.
    loader: ModuleLoader,
}

impl ScriptExecutor {
    /// Creates an executor with no base directory established yet.
    pub fn new() -> Self {
        Self {
            base_dir: None,
            loader: ModuleLoader::new(),
        }
    }

    /// Establishes the directory relative module paths resolve against.
    pub fn set_base_dir(&mut self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        info!(base_dir = %dir.display(), "Script base directory established");
        self.base_dir = Some(dir);
    }

    /// Returns the established base directory, if any.
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Returns the module loader.
    pub fn loader(&self) -> &ModuleLoader {
        &self.loader
    }

    /// Runs all `bindings` for one firing of `event`, in declared order,
    /// and returns the carried object after the last binding.
    ///
    /// Bindings with `process_object` replace the carried object with
    /// their function's return value; the rest run for side effects
    /// only. With no bindings the object is returned untouched and no
    /// module is loaded.
    pub fn run_scripts(
        &mut self,
        event: LifecycleEvent,
        bindings: &[ScriptBinding],
        mut object: Value,
        context: &EventContext,
    ) -> AppResult<Value> {
        if bindings.is_empty() {
            return Ok(object);
        }

        let base_dir = self
            .base_dir
            .clone()
            .ok_or(ScriptError::BaseDirUnset { event })?;

        for binding in bindings {
            let module = self.loader.load(&base_dir, &binding.module)?;
            let parameters = binding.call_parameters(&context.kwargs);

            debug!(
                event = %event,
                module = %module.id,
                path = %module.path.display(),
                function = %binding.function,
                parameters = ?parameters,
                "Executing script function"
            );

            if binding.process_object {
                let result =
                    self.loader
                        .invoke(&module, &binding.function, Some(object), &parameters)?;
                object = result.unwrap_or(Value::Null);
            } else {
                self.loader
                    .invoke(&module, &binding.function, None, &parameters)?;
            }
        }

        Ok(object)
    }
}

impl Default for ScriptExecutor {
    fn default() -> Self {
        Self::new()
    }
}
