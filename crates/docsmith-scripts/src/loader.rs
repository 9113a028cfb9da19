//! Script module loader built on the `rhai` engine.
//!
//! Loading is deliberately uncached: every call to [`ModuleLoader::load`]
//! compiles the file from disk again, and every invocation re-evaluates
//! the module's top-level statements. A module referenced by two bindings
//! of the same event therefore runs its top level twice per dispatch.
//! This keeps the loader free of any cache-invalidation concern at the
//! cost of re-paying the load on every firing.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use rhai::serde::{from_dynamic, to_dynamic};
use rhai::{AST, Dynamic, Engine, Map, Scope};
use serde_json::Value;
use tracing::debug;

use crate::error::ScriptError;

/// File extension of script modules.
pub const SCRIPT_EXTENSION: &str = "rhai";

/// Prefix of derived module identifiers.
const MODULE_ID_PREFIX: &str = "script_plugin_";

/// Resolves a configured module path against the base directory,
/// appending the script extension if absent.
pub fn resolve_module_path(base_dir: &Path, module: &str) -> PathBuf {
    let suffix = format!(".{SCRIPT_EXTENSION}");
    if module.ends_with(&suffix) {
        base_dir.join(module)
    } else {
        base_dir.join(format!("{module}{suffix}"))
    }
}

/// Derives a process-unique module identifier from a configured module
/// path: path separators, hyphens, and any other non-identifier
/// characters are normalized into underscores.
pub fn module_id(module: &str) -> String {
    let suffix = format!(".{SCRIPT_EXTENSION}");
    let trimmed = module.strip_suffix(&suffix).unwrap_or(module);

    let mut id = String::with_capacity(MODULE_ID_PREFIX.len() + trimmed.len());
    id.push_str(MODULE_ID_PREFIX);
    for ch in trimmed.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            id.push(ch);
        } else {
            id.push('_');
        }
    }
    id
}

/// A freshly compiled script module.
#[derive(Debug, Clone)]
pub struct LoadedModule {
    /// Identifier derived from the configured module path.
    pub id: String,
    /// Resolved on-disk location.
    pub path: PathBuf,
    /// The compiled module body.
    ast: AST,
}

/// Compiles and invokes script modules.
///
/// The engine is configured once; script `print`/`debug` output is
/// routed into `tracing` and kept in an inspectable in-process log so
/// the host can surface it post-mortem.
pub struct ModuleLoader {
    /// The rhai engine.
    engine: Engine,
    /// Captured script `print`/`debug` output, in emission order.
    output: Rc<RefCell<Vec<String>>>,
}

impl ModuleLoader {
    /// Creates a loader with a fresh engine.
    pub fn new() -> Self {
        let output = Rc::new(RefCell::new(Vec::new()));
        let mut engine = Engine::new();

        let print_sink = Rc::clone(&output);
        engine.on_print(move |text| {
            debug!(target: "docsmith_scripts::script", "{text}");
            print_sink.borrow_mut().push(text.to_string());
        });

        let debug_sink = Rc::clone(&output);
        engine.on_debug(move |text, source, pos| {
            debug!(target: "docsmith_scripts::script", source, %pos, "{text}");
            debug_sink.borrow_mut().push(text.to_string());
        });

        Self { engine, output }
    }

    /// Compiles the referenced module from disk.
    ///
    /// No previously loaded instance is ever reused, within or across
    /// dispatches.
    pub fn load(&self, base_dir: &Path, module: &str) -> Result<LoadedModule, ScriptError> {
        let path = resolve_module_path(base_dir, module);
        let id = module_id(module);

        if !path.is_file() {
            return Err(ScriptError::ModuleNotFound { path });
        }

        let ast = self
            .engine
            .compile_file(path.clone())
            .map_err(|e| ScriptError::Compile {
                id: id.clone(),
                message: e.to_string(),
            })?;

        Ok(LoadedModule { id, path, ast })
    }

    /// Checks that the module defines `function` with the expected
    /// parameter count.
    pub fn resolve_function(
        &self,
        module: &LoadedModule,
        function: &str,
        expected_arity: usize,
    ) -> Result<(), ScriptError> {
        let mut found_arity = None;
        for f in module.ast.iter_functions() {
            if f.name == function {
                if f.params.len() == expected_arity {
                    return Ok(());
                }
                found_arity = Some(f.params.len());
            }
        }

        match found_arity {
            Some(actual) => Err(ScriptError::SignatureMismatch {
                function: function.to_string(),
                id: module.id.clone(),
                expected: expected_arity,
                actual,
            }),
            None => Err(ScriptError::FunctionNotFound {
                function: function.to_string(),
                id: module.id.clone(),
            }),
        }
    }

    /// Invokes `function` in the module.
    ///
    /// With `object` present the object-transform contract
    /// `fn f(obj, params)` applies and the function's return value is
    /// handed back; without it the side-effect contract `fn f(params)`
    /// applies and the return value is discarded. The module's top-level
    /// statements run before the call either way.
    pub fn invoke(
        &self,
        module: &LoadedModule,
        function: &str,
        object: Option<Value>,
        parameters: &BTreeMap<String, Value>,
    ) -> Result<Option<Value>, ScriptError> {
        self.resolve_function(module, function, if object.is_some() { 2 } else { 1 })?;

        let mut params_map = Map::new();
        for (name, value) in parameters {
            let dynamic = to_dynamic(value).map_err(|e| ScriptError::Value {
                id: module.id.clone(),
                message: format!("parameter '{name}': {e}"),
            })?;
            params_map.insert(name.as_str().into(), dynamic);
        }
        let params = Dynamic::from_map(params_map);

        let mut scope = Scope::new();
        match object {
            Some(object) => {
                let object = to_dynamic(&object).map_err(|e| ScriptError::Value {
                    id: module.id.clone(),
                    message: format!("carried object: {e}"),
                })?;
                let result: Dynamic = self
                    .engine
                    .call_fn(&mut scope, &module.ast, function, (object, params))
                    .map_err(|e| ScriptError::Execution {
                        function: function.to_string(),
                        id: module.id.clone(),
                        message: e.to_string(),
                    })?;
                let value = from_dynamic(&result).map_err(|e| ScriptError::Value {
                    id: module.id.clone(),
                    message: format!("return value: {e}"),
                })?;
                Ok(Some(value))
            }
            None => {
                let _: Dynamic = self
                    .engine
                    .call_fn(&mut scope, &module.ast, function, (params,))
                    .map_err(|e| ScriptError::Execution {
                        function: function.to_string(),
                        id: module.id.clone(),
                        message: e.to_string(),
                    })?;
                Ok(None)
            }
        }
    }

    /// Returns the script output captured so far, in emission order.
    pub fn captured_output(&self) -> Vec<String> {
        self.output.borrow().clone()
    }
}

impl Default for ModuleLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ModuleLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleLoader")
            .field("captured_output", &self.output.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_script(dir: &Path, name: &str, body: &str) {
        std::fs::write(dir.join(name), body).expect("write script");
    }

    #[test]
    fn test_resolve_module_path_appends_extension() {
        let path = resolve_module_path(Path::new("/proj"), "scripts/hook");
        assert_eq!(path, PathBuf::from("/proj/scripts/hook.rhai"));
    }

    #[test]
    fn test_resolve_module_path_keeps_existing_extension() {
        let path = resolve_module_path(Path::new("/proj"), "scripts/hook.rhai");
        assert_eq!(path, PathBuf::from("/proj/scripts/hook.rhai"));
    }

    #[test]
    fn test_module_id_normalizes_separators_and_hyphens() {
        let id = module_id("scripts/post-build.rhai");
        assert_eq!(id, "script_plugin_scripts_post_build");
        assert!(!id.contains('/'));
        assert!(!id.contains('-'));
    }

    #[test]
    fn test_load_missing_module() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loader = ModuleLoader::new();
        let err = loader.load(dir.path(), "ghost").expect_err("must fail");
        assert!(matches!(err, ScriptError::ModuleNotFound { .. }));
    }

    #[test]
    fn test_load_compile_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_script(dir.path(), "broken.rhai", "fn main(params) {");
        let loader = ModuleLoader::new();
        let err = loader.load(dir.path(), "broken").expect_err("must fail");
        assert!(matches!(err, ScriptError::Compile { .. }));
    }

    #[test]
    fn test_resolve_function_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_script(dir.path(), "hook.rhai", "fn other(params) { }");
        let loader = ModuleLoader::new();
        let module = loader.load(dir.path(), "hook").expect("load");
        let err = loader
            .resolve_function(&module, "main", 1)
            .expect_err("must fail");
        assert!(matches!(err, ScriptError::FunctionNotFound { .. }));
    }

    #[test]
    fn test_resolve_function_arity_mismatch() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_script(dir.path(), "hook.rhai", "fn main(params) { }");
        let loader = ModuleLoader::new();
        let module = loader.load(dir.path(), "hook").expect("load");
        let err = loader
            .resolve_function(&module, "main", 2)
            .expect_err("must fail");
        assert!(
            matches!(err, ScriptError::SignatureMismatch { expected: 2, actual: 1, .. }),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_invoke_transform_returns_new_object() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_script(
            dir.path(),
            "setup.rhai",
            "fn main(cfg, params) { cfg.x = 1; cfg }",
        );
        let loader = ModuleLoader::new();
        let module = loader.load(dir.path(), "setup").expect("load");
        let result = loader
            .invoke(&module, "main", Some(json!({"name": "site"})), &BTreeMap::new())
            .expect("invoke");
        assert_eq!(result, Some(json!({"name": "site", "x": 1})));
    }

    #[test]
    fn test_invoke_side_effect_returns_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_script(dir.path(), "notify.rhai", "fn main(params) { 42 }");
        let loader = ModuleLoader::new();
        let module = loader.load(dir.path(), "notify").expect("load");
        let result = loader
            .invoke(&module, "main", None, &BTreeMap::new())
            .expect("invoke");
        assert_eq!(result, None);
    }

    #[test]
    fn test_invoke_receives_parameters() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_script(
            dir.path(),
            "echo.rhai",
            "fn main(obj, params) { params.greeting }",
        );
        let loader = ModuleLoader::new();
        let module = loader.load(dir.path(), "echo").expect("load");
        let parameters = BTreeMap::from([("greeting".to_string(), json!("hello"))]);
        let result = loader
            .invoke(&module, "main", Some(json!(null)), &parameters)
            .expect("invoke");
        assert_eq!(result, Some(json!("hello")));
    }

    #[test]
    fn test_invoke_error_propagates() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_script(
            dir.path(),
            "boom.rhai",
            "fn main(params) { throw \"script exploded\"; }",
        );
        let loader = ModuleLoader::new();
        let module = loader.load(dir.path(), "boom").expect("load");
        let err = loader
            .invoke(&module, "main", None, &BTreeMap::new())
            .expect_err("must fail");
        assert!(err.to_string().contains("script exploded"));
    }

    #[test]
    fn test_top_level_runs_on_every_invocation() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_script(
            dir.path(),
            "loud.rhai",
            "print(\"top-level\");\n\nfn main(params) { }",
        );
        let loader = ModuleLoader::new();

        for _ in 0..2 {
            let module = loader.load(dir.path(), "loud").expect("load");
            loader
                .invoke(&module, "main", None, &BTreeMap::new())
                .expect("invoke");
        }

        assert_eq!(loader.captured_output(), ["top-level", "top-level"]);
    }
}
