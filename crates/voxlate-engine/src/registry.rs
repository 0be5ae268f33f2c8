use crate::engine_trait::RecognitionEngine;
use std::collections::HashMap;

/// Name → factory map of the recognition engines this host can run.
pub struct EngineRegistry {
    factories: HashMap<String, fn() -> Box<dyn RecognitionEngine>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("scripted", || {
            Box::new(crate::scripted_engine::ScriptedEngine::new())
        });
        registry.register("stdin", || Box::new(crate::stdin_engine::StdinEngine::new()));
        registry
    }

    /// A registry with no engines at all, i.e. a host without recognition.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: &str, factory: fn() -> Box<dyn RecognitionEngine>) {
        self.factories.insert(name.to_string(), factory);
    }

    /// Returns `None` when no engine is registered under `name`.
    pub fn create(&self, name: &str) -> Option<Box<dyn RecognitionEngine>> {
        self.factories.get(name).map(|f| f())
    }

    pub fn list_engines(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}
