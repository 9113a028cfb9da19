//! The scripts plugin — binds user script files to lifecycle events.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;
use tracing::info;

use docsmith_core::context::EventContext;
use docsmith_core::error::AppError;
use docsmith_core::events::LifecycleEvent;
use docsmith_core::result::AppResult;
use docsmith_core::scheme::ConfigScheme;
use docsmith_core::traits::Plugin;

use crate::config::{ScriptsConfig, config_scheme};
use crate::dispatch::{DispatchTable, Handler};
use crate::executor::ScriptExecutor;

/// Name this plugin registers under in the host configuration file.
pub const PLUGIN_NAME: &str = "scripts";

/// Docsmith plugin that runs user script bindings at lifecycle events.
///
/// Every event is handled by a generated forwarder into the script
/// executor, except `config`, which carries the one hand-written
/// handler: it establishes the base directory from the carried build
/// configuration before forwarding.
#[derive(Debug)]
pub struct ScriptsPlugin {
    /// Validated script bindings per event.
    config: ScriptsConfig,
    /// The script executor.
    executor: ScriptExecutor,
    /// Event → handler, built once at construction.
    table: DispatchTable,
}

impl ScriptsPlugin {
    /// Creates the plugin with an empty configuration.
    pub fn new() -> Self {
        let mut overrides: HashMap<LifecycleEvent, Handler> = HashMap::new();
        overrides.insert(LifecycleEvent::Config, Box::new(on_config));

        Self {
            config: ScriptsConfig::empty(),
            executor: ScriptExecutor::new(),
            table: DispatchTable::build(overrides),
        }
    }

    /// Returns the script executor.
    pub fn executor(&self) -> &ScriptExecutor {
        &self.executor
    }

    /// Returns the validated configuration.
    pub fn config(&self) -> &ScriptsConfig {
        &self.config
    }
}

/// Handler for the `config` event: derives the base directory from the
/// carried build configuration's `config_file_path`, installs it on the
/// executor, then forwards into the shared executor routine.
fn on_config(
    executor: &mut ScriptExecutor,
    config: &ScriptsConfig,
    object: Value,
    context: &EventContext,
) -> AppResult<Value> {
    let path = object
        .get("config_file_path")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            AppError::configuration("build configuration is missing 'config_file_path'")
        })?;
    let base_dir = Path::new(path).parent().ok_or_else(|| {
        AppError::configuration(format!(
            "cannot determine the directory of config file '{path}'"
        ))
    })?;
    executor.set_base_dir(base_dir);

    executor.run_scripts(
        LifecycleEvent::Config,
        config.bindings(LifecycleEvent::Config),
        object,
        context,
    )
}

impl Plugin for ScriptsPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn config_scheme(&self) -> ConfigScheme {
        config_scheme()
    }

    fn load_config(&mut self, block: &serde_yaml::Value, config_file_path: &Path) -> AppResult<()> {
        let parsed = ScriptsConfig::from_yaml(block)?;

        let base_dir = config_file_path.parent().ok_or_else(|| {
            AppError::configuration(format!(
                "cannot determine the directory of config file '{}'",
                config_file_path.display()
            ))
        })?;
        parsed.validate_modules(base_dir)?;

        info!(
            plugin = PLUGIN_NAME,
            events = parsed.configured_events().len(),
            "Script bindings validated"
        );
        self.config = parsed;
        Ok(())
    }

    fn on_event(
        &mut self,
        event: LifecycleEvent,
        object: Value,
        context: &EventContext,
    ) -> AppResult<Value> {
        self.table
            .dispatch(event, &mut self.executor, &self.config, object, context)
    }
}

impl Default for ScriptsPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_event_establishes_base_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config_file = dir.path().join("docsmith.yml");

        let mut plugin = ScriptsPlugin::new();
        assert!(plugin.executor().base_dir().is_none());

        let object = json!({"config_file_path": config_file.to_str().expect("utf-8 path")});
        plugin
            .on_event(LifecycleEvent::Config, object, &EventContext::new())
            .expect("dispatch");
        assert_eq!(plugin.executor().base_dir(), Some(dir.path()));
    }

    #[test]
    fn test_config_event_requires_config_file_path() {
        let mut plugin = ScriptsPlugin::new();
        let err = plugin
            .on_event(LifecycleEvent::Config, json!({}), &EventContext::new())
            .expect_err("must fail");
        assert!(err.message.contains("config_file_path"));
    }

    #[test]
    fn test_load_config_rejects_missing_module() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config_file = dir.path().join("docsmith.yml");
        let block: serde_yaml::Value =
            serde_yaml::from_str("pre_build:\n  - module: ghost\n").expect("yaml");

        let mut plugin = ScriptsPlugin::new();
        let err = plugin
            .load_config(&block, &config_file)
            .expect_err("must fail");
        assert!(err.message.contains("ghost"));
    }

    #[test]
    fn test_plugin_name_and_scheme() {
        let plugin = ScriptsPlugin::new();
        assert_eq!(plugin.name(), PLUGIN_NAME);
        assert_eq!(
            plugin.config_scheme().entries.len(),
            LifecycleEvent::ALL.len()
        );
    }
}
