//! The `Operation` trait, the path DSL, the canonical read/write
//! operations, and the registry/factory that resolve and build them.

mod args;
mod error;
mod factory;
mod format;
mod loader;
mod operation;
mod ops;
mod path;
mod registry;
mod result;

pub use args::{Args, OperationArgument};
pub use error::{Error, Result};
pub use factory::OperationFactory;
pub use format::truncate_field;
pub use loader::ResourceLoader;
pub use operation::{get_model, Operation};
pub use ops::read::{BirdsEyeViewOperation, CountOperation, GetOperation, ListOperation};
pub use ops::write::{
    AddFieldOperation, AddModelOperation, DivideIntoDecksByTagsOperation, MigrateNotesOperation,
    PopulateFieldsOperation, RemoveEmptyNotesOperation, RenameFieldOperation, RenameModelOperation, TagNotesOperation,
};
pub use path::{AnkiPath, ObjectType};
pub use registry::OperationRegistry;
pub use result::OperationResult;

#[cfg(test)]
mod tests {
    use super::*;
    use anki_model::*;
    use std::collections::BTreeMap;

    fn collection_with_basic_model() -> Collection {
        let mut collection = Collection::empty();
        let deck = Deck::new(DeckId(1), "Default", DeckConfigId(1));
        collection.insert_deck(deck);
        let model = Model::new(
            ModelId(1),
            "Basic",
            vec![Field::new("Front", 0), Field::new("Back", 1)],
            vec![Template::new("Card 1", 0, "{{Front}}", "{{Back}}")],
            "",
            DeckId(1),
        )
        .unwrap();
        collection.insert_model(model).unwrap();
        collection
    }

    fn insert_note(collection: &mut Collection, id: i64, front: &str, back: &str) -> NoteId {
        let model = collection.model(ModelId(1)).unwrap().clone();
        let mut fields = BTreeMap::new();
        fields.insert("Front".to_string(), front.to_string());
        fields.insert("Back".to_string(), back.to_string());
        let note = Note::new(NoteId(id), format!("guid{id}"), &model, fields).unwrap();
        collection.insert_note(note).unwrap();
        NoteId(id)
    }

    #[test]
    fn rename_field_updates_model_and_notes() {
        let mut collection = collection_with_basic_model();
        insert_note(&mut collection, 1, "hello", "world");

        let mut args = BTreeMap::new();
        args.insert("old_field_name".to_string(), serde_json::json!("Front"));
        args.insert("new_field_name".to_string(), serde_json::json!("Question"));
        let mut op = RenameFieldOperation::new(args).unwrap();
        op.validate(&collection).unwrap();
        let result = op.execute(&mut collection).unwrap();

        assert!(result.success);
        assert!(collection.model(ModelId(1)).unwrap().field_by_name("Question").is_some());
        assert_eq!(collection.note(NoteId(1)).unwrap().fields.get("Question").unwrap(), "hello");
    }

    #[test]
    fn migrate_notes_moves_notes_to_target_model_keeping_ids() {
        let mut collection = collection_with_basic_model();
        let target = Model::new(
            ModelId(2),
            "Extended",
            vec![Field::new("Question", 0), Field::new("Answer", 1), Field::new("Extra", 2)],
            vec![Template::new("Card 1", 0, "{{Question}}", "{{Answer}}")],
            "",
            DeckId(1),
        )
        .unwrap();
        collection.insert_model(target).unwrap();
        insert_note(&mut collection, 1, "hello", "world");

        let mut args = BTreeMap::new();
        args.insert("source_model".to_string(), serde_json::json!("Basic"));
        args.insert("target_model".to_string(), serde_json::json!("Extended"));
        args.insert(
            "field_mapping".to_string(),
            serde_json::json!({ "Front": "Question", "Back": "Answer" }),
        );
        let mut op = MigrateNotesOperation::new(args).unwrap();
        op.validate(&collection).unwrap();
        let result = op.execute(&mut collection).unwrap();

        assert_eq!(result.changes.len(), 1);
        let note = collection.note(NoteId(1)).unwrap();
        assert_eq!(note.model_id, ModelId(2));
        assert_eq!(note.fields.get("Question").unwrap(), "hello");
        assert_eq!(note.fields.get("Extra").unwrap(), "");
    }

    #[test]
    fn migrate_notes_rejects_non_injective_mapping() {
        let mut collection = collection_with_basic_model();
        let target = Model::new(
            ModelId(2),
            "Extended",
            vec![Field::new("Question", 0)],
            vec![Template::new("Card 1", 0, "{{Question}}", "{{Question}}")],
            "",
            DeckId(1),
        )
        .unwrap();
        collection.insert_model(target).unwrap();

        let mut args = BTreeMap::new();
        args.insert("source_model".to_string(), serde_json::json!("Basic"));
        args.insert("target_model".to_string(), serde_json::json!("Extended"));
        args.insert(
            "field_mapping".to_string(),
            serde_json::json!({ "Front": "Question", "Back": "Question" }),
        );
        let mut op = MigrateNotesOperation::new(args).unwrap();
        let err = op.validate(&collection).unwrap_err();
        assert!(matches!(err, Error::NonInjectiveMapping(_)));
    }

    #[test]
    fn tag_notes_tags_matching_notes_only_once() {
        let mut collection = collection_with_basic_model();
        insert_note(&mut collection, 1, "episode 12", "world");
        insert_note(&mut collection, 2, "no match here", "world");

        let mut args = BTreeMap::new();
        args.insert("source_field".to_string(), serde_json::json!("Front"));
        args.insert("pattern".to_string(), serde_json::json!(r"episode (\d+)"));
        args.insert("tag_prefix".to_string(), serde_json::json!("ep::"));
        let mut op = TagNotesOperation::new(args).unwrap();
        op.validate(&collection).unwrap();
        let result = op.execute(&mut collection).unwrap();

        assert_eq!(result.changes.len(), 1);
        assert!(collection.note(NoteId(1)).unwrap().tags.contains(&"ep::12".to_string()));
        assert!(collection.note(NoteId(2)).unwrap().tags.is_empty());
    }

    #[test]
    fn divide_into_decks_by_tags_creates_sub_decks() {
        let mut collection = collection_with_basic_model();
        let source_deck = Deck::new(DeckId(2), "Show", DeckConfigId(1));
        collection.insert_deck(source_deck);
        let note_id = insert_note(&mut collection, 1, "hello", "world");
        collection.note_mut(note_id).unwrap().add_tag("Episode_5");
        let card = Card::new(CardId(1), note_id, DeckId(2), 0);
        collection.insert_card(card).unwrap();

        let mut args = BTreeMap::new();
        args.insert("source_deck".to_string(), serde_json::json!("Show"));
        args.insert("tag_prefix".to_string(), serde_json::json!("Episode"));
        args.insert("tag_pattern".to_string(), serde_json::json!(r"Episode_(\d+)"));
        args.insert("episodes_per_deck".to_string(), serde_json::json!(10));
        args.insert("target_deck_prefix".to_string(), serde_json::json!("Show"));
        let mut op = DivideIntoDecksByTagsOperation::new(args).unwrap();
        op.validate(&collection).unwrap();
        let result = op.execute(&mut collection).unwrap();

        assert!(result.success);
        assert!(collection.deck_by_name("Show 1-10").is_some());
        assert_eq!(collection.cards.get(&CardId(1)).unwrap().deck_id, collection.deck_by_name("Show 1-10").unwrap().id);
    }

    #[test]
    fn remove_empty_notes_deletes_notes_and_their_cards() {
        let mut collection = collection_with_basic_model();
        let note_id = insert_note(&mut collection, 1, "", "world");
        let card = Card::new(CardId(1), note_id, DeckId(1), 0);
        collection.insert_card(card).unwrap();
        insert_note(&mut collection, 2, "not empty", "world");

        let mut args = BTreeMap::new();
        args.insert("field".to_string(), serde_json::json!("Front"));
        let mut op = RemoveEmptyNotesOperation::new(args).unwrap();
        op.validate(&collection).unwrap();
        let result = op.execute(&mut collection).unwrap();

        assert!(result.success);
        assert!(collection.note(NoteId(1)).is_err());
        assert!(collection.cards.get(&CardId(1)).is_none());
        assert!(collection.note(NoteId(2)).is_ok());
    }

    #[test]
    fn populate_fields_runs_copy_field_populator() {
        let mut collection = collection_with_basic_model();
        collection.model_mut(ModelId(1)).unwrap().add_field("Copy").unwrap();
        let mut fields = BTreeMap::new();
        fields.insert("Front".to_string(), "hello".to_string());
        fields.insert("Back".to_string(), "world".to_string());
        fields.insert("Copy".to_string(), String::new());
        let note = Note::new(NoteId(1), "guid1", collection.model(ModelId(1)).unwrap(), fields).unwrap();
        collection.insert_note(note).unwrap();

        let mut args = BTreeMap::new();
        args.insert("populator".to_string(), serde_json::json!("copy-field"));
        args.insert(
            "populator_config".to_string(),
            serde_json::json!({ "source_field": "Front", "target_field": "Copy" }),
        );
        let mut op = PopulateFieldsOperation::new(args).unwrap();
        op.validate(&collection).unwrap();
        let result = op.execute(&mut collection).unwrap();

        assert!(result.success);
        assert_eq!(collection.note(NoteId(1)).unwrap().fields.get("Copy").unwrap(), "hello");
    }

    #[test]
    fn get_model_disambiguates_sole_model() {
        let collection = collection_with_basic_model();
        let model = get_model(&collection, None).unwrap();
        assert_eq!(model.name, "Basic");
    }

    #[test]
    fn get_model_reports_ambiguity_with_multiple_models() {
        let mut collection = collection_with_basic_model();
        let second = Model::new(ModelId(2), "Cloze", vec![Field::new("Text", 0)], vec![], "", DeckId(1)).unwrap();
        collection.insert_model(second).unwrap();
        let err = get_model(&collection, None).unwrap_err();
        assert!(matches!(err, Error::AmbiguousModel(_)));
    }
}
