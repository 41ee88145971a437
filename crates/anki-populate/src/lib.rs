//! Field populator trait, registry, and built-in field-derivation strategies.

mod builtins;
mod config;
mod error;
mod populator;
mod registry;

pub use builtins::{
    ConcatFieldsPopulator, CopyFieldPopulator, FuriganaPopulator, JapLlmSentenceAnalyzerPopulator,
    RemoveTextInParenthesesPopulator,
};
pub use config::{Config, ConfigArgument};
pub use error::{Error, Result};
pub use populator::FieldPopulator;
pub use registry::PopulatorRegistry;

#[cfg(test)]
mod tests {
    use super::*;
    use anki_model::*;
    use std::collections::BTreeMap;

    fn basic_model() -> Model {
        Model::new(
            ModelId(1),
            "Basic",
            vec![Field::new("Front", 0), Field::new("Back", 1), Field::new("Combined", 2)],
            vec![],
            "",
            DeckId(1),
        )
        .unwrap()
    }

    fn note(front: &str, back: &str) -> Note {
        let model = basic_model();
        let mut fields = BTreeMap::new();
        fields.insert("Front".to_string(), front.to_string());
        fields.insert("Back".to_string(), back.to_string());
        fields.insert("Combined".to_string(), String::new());
        Note::new(NoteId(1), "abc", &model, fields).unwrap()
    }

    #[test]
    fn copy_field_copies_value() {
        let mut cfg = BTreeMap::new();
        cfg.insert("source_field".to_string(), serde_json::json!("Front"));
        cfg.insert("target_field".to_string(), serde_json::json!("Combined"));
        let populator = CopyFieldPopulator::new(cfg).unwrap();
        let result = populator.populate(&note("foo", "bar")).unwrap();
        assert_eq!(result.get("Combined").unwrap(), "foo");
    }

    #[test]
    fn concat_fields_joins_with_separator() {
        let mut cfg = BTreeMap::new();
        cfg.insert("source_fields".to_string(), serde_json::json!(["Front", "Back"]));
        cfg.insert("target_field".to_string(), serde_json::json!("Combined"));
        cfg.insert("separator".to_string(), serde_json::json!(" - "));
        let populator = ConcatFieldsPopulator::new(cfg).unwrap();
        let result = populator.populate(&note("foo", "bar")).unwrap();
        assert_eq!(result.get("Combined").unwrap(), "foo - bar");
    }

    #[test]
    fn concat_fields_validates_model() {
        let mut cfg = BTreeMap::new();
        cfg.insert("source_fields".to_string(), serde_json::json!(["Missing"]));
        cfg.insert("target_field".to_string(), serde_json::json!("Combined"));
        let populator = ConcatFieldsPopulator::new(cfg).unwrap();
        let err = populator.validate(&basic_model()).unwrap_err();
        assert!(matches!(err, Error::SourceFieldNotInModel(_)));
    }

    #[test]
    fn remove_parentheses_strips_and_collapses_spaces() {
        let mut cfg = BTreeMap::new();
        cfg.insert("field".to_string(), serde_json::json!("Front"));
        let populator = RemoveTextInParenthesesPopulator::new(cfg).unwrap();
        let mut n = note("hello (world) there", "bar");
        n.fields.insert("Front".to_string(), "hello (world) there".to_string());
        let result = populator.populate(&n).unwrap();
        assert_eq!(result.get("Front").unwrap(), "hello there");
    }

    #[test]
    fn registry_builds_known_populators() {
        let registry = PopulatorRegistry::with_builtins();
        assert!(registry.names().contains(&"copy-field"));
        assert!(registry.names().contains(&"jap-llm-sentence-analyzer"));
    }

    #[test]
    fn registry_rejects_unknown_name() {
        let registry = PopulatorRegistry::with_builtins();
        let err = registry.build("does-not-exist", BTreeMap::new()).unwrap_err();
        assert!(matches!(err, Error::UnknownPopulator(_)));
    }
}
