//! Script binding configuration.
//!
//! One configuration key per lifecycle event, each holding an ordered
//! list of script bindings. The scheme is generated from the fixed event
//! list so that new host events never require hand-written entries here.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use docsmith_core::error::AppError;
use docsmith_core::events::LifecycleEvent;
use docsmith_core::result::AppResult;
use docsmith_core::scheme::{ConfigScheme, FieldKind, FieldSpec, SchemeEntry};

use crate::loader::resolve_module_path;

/// Field shape of one script binding, shared by every generated scheme
/// entry.
pub const OPTIONS_SCHEMA: &[FieldSpec] = &[
    FieldSpec {
        name: "module",
        kind: FieldKind::File { must_exist: true },
        required: true,
    },
    FieldSpec {
        name: "function",
        kind: FieldKind::Str,
        required: false,
    },
    FieldSpec {
        name: "process_object",
        kind: FieldKind::Bool,
        required: false,
    },
    FieldSpec {
        name: "pass_parameters",
        kind: FieldKind::StrList,
        required: false,
    },
    FieldSpec {
        name: "extra_parameters",
        kind: FieldKind::Map,
        required: false,
    },
];

/// Builds the plugin's configuration scheme: one entry per lifecycle
/// event, each accepting a repeatable list of script bindings.
pub fn config_scheme() -> ConfigScheme {
    ConfigScheme {
        entries: LifecycleEvent::ALL
            .iter()
            .map(|event| SchemeEntry {
                key: event.as_str().to_string(),
                required: false,
                fields: OPTIONS_SCHEMA,
            })
            .collect(),
    }
}

/// One user-declared mapping from an event to a loadable script file,
/// function, and parameter policy. Immutable once validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptBinding {
    /// Path to the script file, relative to the host configuration file.
    pub module: String,
    /// Name of the function to call, defined at the module's top level.
    #[serde(default = "default_function")]
    pub function: String,
    /// Whether the function receives and returns the carried object.
    #[serde(default)]
    pub process_object: bool,
    /// Event parameters to select and forward, by name, in order.
    #[serde(default)]
    pub pass_parameters: Vec<String>,
    /// Additional parameters always forwarded; win on name collision.
    #[serde(default)]
    pub extra_parameters: BTreeMap<String, Value>,
}

fn default_function() -> String {
    "main".to_string()
}

impl ScriptBinding {
    /// Computes the call parameters for one invocation: the event
    /// parameters named in `pass_parameters`, overlaid with
    /// `extra_parameters`.
    pub fn call_parameters(&self, kwargs: &HashMap<String, Value>) -> BTreeMap<String, Value> {
        let mut parameters = BTreeMap::new();
        for name in &self.pass_parameters {
            if let Some(value) = kwargs.get(name) {
                parameters.insert(name.clone(), value.clone());
            }
        }
        for (name, value) in &self.extra_parameters {
            parameters.insert(name.clone(), value.clone());
        }
        parameters
    }
}

/// Mapping from each lifecycle event to its ordered script bindings.
///
/// Built once from the user-supplied configuration block at startup.
#[derive(Debug, Clone, Default)]
pub struct ScriptsConfig {
    /// Event → bindings, declaration order preserved per event.
    bindings: BTreeMap<LifecycleEvent, Vec<ScriptBinding>>,
}

impl ScriptsConfig {
    /// Creates a configuration with no bindings.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses the plugin's configuration block.
    ///
    /// The block must be a mapping from event names to binding lists
    /// (or null/absent for no bindings at all). Unknown event names and
    /// malformed bindings are validation errors.
    pub fn from_yaml(block: &serde_yaml::Value) -> AppResult<Self> {
        let mapping = match block {
            serde_yaml::Value::Null => return Ok(Self::empty()),
            serde_yaml::Value::Mapping(mapping) => mapping,
            other => {
                return Err(AppError::validation(format!(
                    "scripts configuration must be a mapping of event names, got {}",
                    yaml_type_name(other)
                )));
            }
        };

        let mut bindings = BTreeMap::new();
        for (key, value) in mapping {
            let name = key.as_str().ok_or_else(|| {
                AppError::validation("scripts configuration keys must be event names")
            })?;
            let event = LifecycleEvent::from_str(name)?;

            let list: Vec<ScriptBinding> =
                serde_yaml::from_value(value.clone()).map_err(|e| {
                    AppError::validation(format!("invalid script binding under '{name}': {e}"))
                })?;
            bindings.insert(event, list);
        }

        Ok(Self { bindings })
    }

    /// Returns the bindings declared for an event, in declaration order.
    pub fn bindings(&self, event: LifecycleEvent) -> &[ScriptBinding] {
        self.bindings.get(&event).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the events that have at least one binding.
    pub fn configured_events(&self) -> Vec<LifecycleEvent> {
        self.bindings
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(event, _)| *event)
            .collect()
    }

    /// Returns whether no bindings are declared at all.
    pub fn is_empty(&self) -> bool {
        self.bindings.values().all(Vec::is_empty)
    }

    /// Verifies that every referenced script file exists on disk,
    /// resolved against `base_dir`. Runs before any event fires.
    pub fn validate_modules(&self, base_dir: &Path) -> AppResult<()> {
        for (event, list) in &self.bindings {
            for binding in list {
                let path = resolve_module_path(base_dir, &binding.module);
                if !path.is_file() {
                    return Err(AppError::validation(format!(
                        "script module '{}' for event '{event}' does not exist: {}",
                        binding.module,
                        path.display()
                    )));
                }
            }
        }
        Ok(())
    }
}

fn yaml_type_name(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a sequence",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}
