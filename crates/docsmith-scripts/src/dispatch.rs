//! Dispatch table — one handler per lifecycle event, built once.
//!
//! For every event in the fixed list a forwarding handler into the
//! script executor is generated at construction time; an event with a
//! custom handler keeps it instead. This turns the open-ended event
//! list into a uniform dispatch surface without hand-writing one
//! handler per event.

use std::collections::HashMap;

use serde_json::Value;

use docsmith_core::context::EventContext;
use docsmith_core::error::AppError;
use docsmith_core::events::LifecycleEvent;
use docsmith_core::result::AppResult;

use crate::config::ScriptsConfig;
use crate::executor::ScriptExecutor;

/// An event handler: receives the executor, the plugin configuration,
/// the carried object, and the event context, and returns the carried
/// object for the rest of the pipeline.
pub type Handler =
    Box<dyn Fn(&mut ScriptExecutor, &ScriptsConfig, Value, &EventContext) -> AppResult<Value>>;

/// Table of event handlers, complete over [`LifecycleEvent::ALL`].
pub struct DispatchTable {
    /// Event → installed handler.
    handlers: HashMap<LifecycleEvent, Handler>,
}

impl DispatchTable {
    /// Builds the table: every event gets a generated forwarder unless
    /// `overrides` carries a custom handler for it.
    ///
    /// Construction is deterministic and happens exactly once per
    /// plugin instance.
    pub fn build(mut overrides: HashMap<LifecycleEvent, Handler>) -> Self {
        let mut handlers = HashMap::with_capacity(LifecycleEvent::ALL.len());
        for &event in LifecycleEvent::ALL {
            let handler = overrides.remove(&event).unwrap_or_else(|| forwarder(event));
            handlers.insert(event, handler);
        }
        Self { handlers }
    }

    /// Invokes the handler installed for `event`.
    pub fn dispatch(
        &self,
        event: LifecycleEvent,
        executor: &mut ScriptExecutor,
        config: &ScriptsConfig,
        object: Value,
        context: &EventContext,
    ) -> AppResult<Value> {
        let handler = self.handlers.get(&event).ok_or_else(|| {
            AppError::internal(format!("no handler installed for event '{event}'"))
        })?;
        handler(executor, config, object, context)
    }

    /// Returns the number of installed handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchTable")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Generates the default handler for an event: a thin closure capturing
/// the event name and forwarding into the shared executor routine.
fn forwarder(event: LifecycleEvent) -> Handler {
    Box::new(move |executor, config, object, context| {
        executor.run_scripts(event, config.bindings(event), object, context)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_table_covers_every_event() {
        let table = DispatchTable::build(HashMap::new());
        assert_eq!(table.len(), LifecycleEvent::ALL.len());
        assert!(!table.is_empty());
    }

    #[test]
    fn test_generated_handler_forwards_to_executor() {
        let table = DispatchTable::build(HashMap::new());
        let mut executor = ScriptExecutor::new();
        let config = ScriptsConfig::empty();
        // No bindings: the forwarder must return the object untouched.
        let object = table
            .dispatch(
                LifecycleEvent::Nav,
                &mut executor,
                &config,
                json!(["page"]),
                &EventContext::new(),
            )
            .expect("dispatch");
        assert_eq!(object, json!(["page"]));
    }

    #[test]
    fn test_override_replaces_generated_handler() {
        let mut overrides: HashMap<LifecycleEvent, Handler> = HashMap::new();
        overrides.insert(
            LifecycleEvent::PostBuild,
            Box::new(|_, _, _, _| Ok(json!("overridden"))),
        );
        let table = DispatchTable::build(overrides);
        let mut executor = ScriptExecutor::new();
        let config = ScriptsConfig::empty();

        let object = table
            .dispatch(
                LifecycleEvent::PostBuild,
                &mut executor,
                &config,
                json!(null),
                &EventContext::new(),
            )
            .expect("dispatch");
        assert_eq!(object, json!("overridden"));

        // Other events keep their generated forwarders.
        let object = table
            .dispatch(
                LifecycleEvent::PreBuild,
                &mut executor,
                &config,
                json!(7),
                &EventContext::new(),
            )
            .expect("dispatch");
        assert_eq!(object, json!(7));
    }
}
