//! Typed collection data model: the in-memory representation every loader,
//! operation, and writer in this workspace shares.

mod card;
mod collection;
mod deck;
mod error;
mod ids;
mod model;
mod note;

pub use card::{Card, CardQueue};
pub use collection::Collection;
pub use deck::{Deck, DeckConfig, DayCount, LapseCardsConfig, NewCardsConfig, ReviewCardsConfig};
pub use error::{Error, Result};
pub use ids::{CardId, DeckConfigId, DeckId, ModelId, NoteId, Usn};
pub use model::{Field, Model, ModelKind, Template, FIELD_SEPARATOR};
pub use note::Note;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn basic_model() -> Model {
        Model::new(
            ModelId(1),
            "Basic",
            vec![Field::new("Front", 0), Field::new("Back", 1)],
            vec![Template::new("Card 1", 0, "{{Front}}", "{{Back}}")],
            "",
            DeckId(1),
        )
        .unwrap()
    }

    #[test]
    fn duplicate_field_names_rejected() {
        let err = Model::new(
            ModelId(1),
            "Basic",
            vec![Field::new("Front", 0), Field::new("Front", 1)],
            vec![],
            "",
            DeckId(1),
        )
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateFieldName { .. }));
    }

    #[test]
    fn note_field_keys_must_match_model() {
        let model = basic_model();
        let mut fields = BTreeMap::new();
        fields.insert("Front".to_string(), "hi".to_string());
        let err = Note::new(NoteId(1), "abc", &model, fields).unwrap_err();
        assert!(matches!(err, Error::FieldKeyMismatch { .. }));
    }

    #[test]
    fn pack_and_unpack_round_trip() {
        let model = basic_model();
        let mut fields = BTreeMap::new();
        fields.insert("Front".to_string(), "hi".to_string());
        fields.insert("Back".to_string(), "bye".to_string());
        let note = Note::new(NoteId(1), "abc", &model, fields.clone()).unwrap();
        let packed = note.packed_fields(&model);
        assert_eq!(packed, "hi\u{1f}bye");
        let unpacked = Note::unpack_fields(&packed, &model);
        assert_eq!(unpacked, fields);
    }

    #[test]
    fn rename_field_updates_model() {
        let mut model = basic_model();
        model.rename_field("Front", "Question").unwrap();
        assert_eq!(model.field_names(), vec!["Question", "Back"]);
    }

    #[test]
    fn collection_rejects_duplicate_model_names() {
        let mut collection = Collection::empty();
        collection.insert_model(basic_model()).unwrap();
        let err = collection.insert_model(basic_model()).unwrap_err();
        assert!(matches!(err, Error::DuplicateModelName(_)));
    }
}
