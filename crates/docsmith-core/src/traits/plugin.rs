//! Plugin system traits.

use std::path::Path;

use serde_json::Value;

use crate::context::EventContext;
use crate::events::LifecycleEvent;
use crate::result::AppResult;
use crate::scheme::ConfigScheme;

/// Trait implemented by Docsmith plugins.
///
/// The host parses its configuration file, validates each plugin's
/// configuration block against [`Plugin::config_scheme`], hands the block
/// to the plugin via [`Plugin::load_config`], and then fires lifecycle
/// events in build order. The `config` event is always fired first.
///
/// Event dispatch is synchronous and single-threaded: the host fires one
/// event at a time and waits for the plugin to return before continuing.
pub trait Plugin {
    /// Unique plugin name, as referenced in the host configuration file.
    fn name(&self) -> &str;

    /// The shape of this plugin's configuration block.
    fn config_scheme(&self) -> ConfigScheme;

    /// Accepts this plugin's validated configuration block.
    ///
    /// `config_file_path` is the location of the host configuration file;
    /// relative paths inside the block resolve against its directory.
    /// Called once, before any event fires. Errors abort the build.
    fn load_config(&mut self, block: &serde_yaml::Value, config_file_path: &Path) -> AppResult<()>;

    /// Handles one firing of a lifecycle event.
    ///
    /// `object` is the carried pipeline value for the event (for example
    /// the build configuration at `config`); the returned value replaces
    /// it for the rest of the pipeline. Errors abort the build.
    fn on_event(
        &mut self,
        event: LifecycleEvent,
        object: Value,
        context: &EventContext,
    ) -> AppResult<Value>;
}
