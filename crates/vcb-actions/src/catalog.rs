//! Explicit table of invocable handlers.
//!
//! Configuration documents reference handlers by `(module, function)`. The
//! catalog is the only place those references are turned into code: every
//! handler that can ever run is registered here up front.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use vcb_core::{ActionDefinition, ActionParams};

use crate::errors::ResolutionError;
use crate::handler::{ActionHandler, AsyncFnHandler, FnHandler, HandlerResult};

/// Registry of handlers keyed by module, then function name.
#[derive(Default)]
pub struct HandlerCatalog {
    modules: HashMap<String, HashMap<String, Arc<dyn ActionHandler>>>,
}

impl HandlerCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog pre-populated with the built-in actions.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        crate::builtin::register(&mut catalog);
        catalog
    }

    /// Register a handler. Re-registering a name replaces the previous handler.
    pub fn register(&mut self, module: &str, function: &str, handler: impl ActionHandler + 'static) {
        let _ = self
            .modules
            .entry(module.to_owned())
            .or_default()
            .insert(function.to_owned(), Arc::new(handler));
    }

    /// Register a synchronous function.
    pub fn register_fn<F>(&mut self, module: &str, function: &str, f: F)
    where
        F: Fn(ActionParams) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(module, function, FnHandler::new(f));
    }

    /// Register an async closure.
    pub fn register_async<F, Fut>(&mut self, module: &str, function: &str, f: F)
    where
        F: Fn(ActionParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register(module, function, AsyncFnHandler::new(f));
    }

    /// Resolve the handler an action definition refers to.
    pub fn resolve(&self, def: &ActionDefinition) -> Result<Arc<dyn ActionHandler>, ResolutionError> {
        let Some(functions) = self.modules.get(&def.module) else {
            return Err(ResolutionError::UnitNotFound {
                action_id: def.id.clone(),
                module: def.module.clone(),
            });
        };
        functions
            .get(&def.function)
            .cloned()
            .ok_or_else(|| ResolutionError::NotCallable {
                action_id: def.id.clone(),
                module: def.module.clone(),
                function: def.function.clone(),
            })
    }

    /// Registered module names (sorted).
    pub fn modules(&self) -> Vec<String> {
        let mut names: Vec<String> = self.modules.keys().cloned().collect();
        names.sort();
        names
    }

    /// Function names registered in a module (sorted). Empty if unknown.
    pub fn functions(&self, module: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .modules
            .get(module)
            .map(|f| f.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}

impl std::fmt::Debug for HandlerCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerCatalog")
            .field("modules", &self.modules())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    impl std::fmt::Debug for dyn crate::handler::ActionHandler {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("ActionHandler")
        }
    }

    fn def(id: &str, module: &str, function: &str) -> ActionDefinition {
        ActionDefinition {
            id: id.into(),
            module: module.into(),
            function: function.into(),
            default_params: ActionParams::new(),
        }
    }

    #[tokio::test]
    async fn resolve_registered_handler() {
        let mut catalog = HandlerCatalog::new();
        catalog.register_fn("tools", "ping", |_| Ok(json!("pong")));

        let handler = catalog.resolve(&def("p", "tools", "ping")).unwrap();
        assert_eq!(handler.call(ActionParams::new()).await.unwrap(), "pong");
    }

    #[test]
    fn missing_module_is_unit_not_found() {
        let catalog = HandlerCatalog::new();
        assert_matches!(
            catalog.resolve(&def("a", "ghost", "f")),
            Err(ResolutionError::UnitNotFound { ref module, .. }) if module == "ghost"
        );
    }

    #[test]
    fn missing_function_is_not_callable() {
        let mut catalog = HandlerCatalog::new();
        catalog.register_fn("tools", "ping", |_| Ok(json!(null)));
        assert_matches!(
            catalog.resolve(&def("a", "tools", "pong")),
            Err(ResolutionError::NotCallable { ref function, .. }) if function == "pong"
        );
    }

    #[tokio::test]
    async fn re_register_replaces() {
        let mut catalog = HandlerCatalog::new();
        catalog.register_fn("m", "f", |_| Ok(json!(1)));
        catalog.register_async("m", "f", |_| async { Ok(json!(2)) });

        let handler = catalog.resolve(&def("a", "m", "f")).unwrap();
        assert_eq!(handler.call(ActionParams::new()).await.unwrap(), json!(2));
        assert_eq!(catalog.functions("m"), vec!["f"]);
    }

    #[test]
    fn builtins_are_enumerable() {
        let catalog = HandlerCatalog::with_builtins();
        assert_eq!(catalog.modules(), vec!["builtin"]);
        assert_eq!(
            catalog.functions("builtin"),
            vec![
                "another_action",
                "example_async_action",
                "greet_user_action",
                "log_current_time_action",
            ]
        );
        assert!(catalog.functions("nope").is_empty());
    }
}
