use crate::builtins::*;
use crate::error::Result;
use crate::populator::FieldPopulator;
use std::collections::{BTreeMap, HashMap};

type Constructor = Box<dyn Fn(BTreeMap<String, serde_json::Value>) -> Result<Box<dyn FieldPopulator>>>;

/// Maps populator names to constructors, mirroring the operation registry's
/// shape. Populators additionally support a plug-in folder at the CLI layer
/// (`anki-cli`); the registry here only owns the compile-time built-ins.
pub struct PopulatorRegistry {
    constructors: HashMap<String, Constructor>,
}

impl PopulatorRegistry {
    pub fn new() -> Self {
        PopulatorRegistry {
            constructors: HashMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("copy-field", |cfg| {
            Ok(Box::new(CopyFieldPopulator::new(cfg)?) as Box<dyn FieldPopulator>)
        });
        registry.register("concat-fields", |cfg| {
            Ok(Box::new(ConcatFieldsPopulator::new(cfg)?) as Box<dyn FieldPopulator>)
        });
        registry.register("remove-text-in-parentheses", |cfg| {
            Ok(Box::new(RemoveTextInParenthesesPopulator::new(cfg)?) as Box<dyn FieldPopulator>)
        });
        registry.register("furigana", |cfg| {
            Ok(Box::new(FuriganaPopulator::new(cfg)?) as Box<dyn FieldPopulator>)
        });
        registry.register("jap-llm-sentence-analyzer", |cfg| {
            Ok(Box::new(JapLlmSentenceAnalyzerPopulator::new(cfg)?) as Box<dyn FieldPopulator>)
        });
        registry
    }

    pub fn register(
        &mut self,
        name: &str,
        constructor: impl Fn(BTreeMap<String, serde_json::Value>) -> Result<Box<dyn FieldPopulator>> + 'static,
    ) {
        self.constructors.insert(name.to_string(), Box::new(constructor));
    }

    pub fn build(
        &self,
        name: &str,
        config: BTreeMap<String, serde_json::Value>,
    ) -> Result<Box<dyn FieldPopulator>> {
        match self.constructors.get(name) {
            Some(ctor) => ctor(config),
            None => Err(crate::error::Error::UnknownPopulator(name.to_string())),
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }
}

impl Default for PopulatorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
