use crate::args::{Args, OperationArgument};
use crate::error::Result;
use crate::format::truncate_field;
use crate::operation::Operation;
use crate::result::OperationResult;
use anki_model::Collection;
use serde_json::json;
use std::collections::BTreeMap;

/// A summary view of the collection: models with note counts, decks with
/// card counts, and up to `example_count` sample notes per model.
pub struct BirdsEyeViewOperation {
    args: Args,
    schema: Vec<OperationArgument>,
}

impl BirdsEyeViewOperation {
    pub fn schema() -> Vec<OperationArgument> {
        vec![
            OperationArgument::optional("show_empty_models", "Whether to show models with no notes", json!(false)),
            OperationArgument::optional("show_empty_decks", "Whether to show decks with no cards", json!(false)),
            OperationArgument::optional("example_count", "Number of example notes to show per model", json!(3)),
        ]
    }

    pub fn new(supplied: BTreeMap<String, serde_json::Value>) -> Result<Self> {
        let schema = Self::schema();
        Ok(BirdsEyeViewOperation {
            args: Args::build(&schema, supplied)?,
            schema,
        })
    }
}

impl Operation for BirdsEyeViewOperation {
    fn name(&self) -> &'static str {
        "birds-eye-view"
    }

    fn description(&self) -> &'static str {
        "Provide a birds-eye view of the Anki collection"
    }

    fn readonly(&self) -> bool {
        true
    }

    fn arguments(&self) -> &[OperationArgument] {
        &self.schema
    }

    fn validate(&mut self, _collection: &Collection) -> Result<()> {
        Ok(())
    }

    fn execute(&mut self, collection: &mut Collection) -> Result<OperationResult> {
        let show_empty_models = self.args.bool("show_empty_models");
        let show_empty_decks = self.args.bool("show_empty_decks");
        let example_count = self.args.i64("example_count").unwrap_or(3).max(0) as usize;

        let mut models_data = serde_json::Map::new();
        for model in collection.models.values() {
            let note_count = collection.notes_for_model(model.id).count();
            if note_count == 0 && !show_empty_models {
                continue;
            }
            models_data.insert(
                model.name.clone(),
                json!({
                    "id": model.id.0,
                    "note_count": note_count,
                    "fields": model.fields.iter().map(|f| f.name.clone()).collect::<Vec<_>>(),
                    "templates": model.templates.iter().map(|t| t.name.clone()).collect::<Vec<_>>(),
                }),
            );
        }

        let mut decks_data = serde_json::Map::new();
        for deck in collection.decks.values() {
            let card_count = collection.cards.values().filter(|c| c.deck_id == deck.id).count();
            if card_count == 0 && !show_empty_decks {
                continue;
            }
            decks_data.insert(deck.name.clone(), json!({ "id": deck.id.0, "card_count": card_count }));
        }

        let mut examples_data = serde_json::Map::new();
        for model in collection.models.values() {
            let mut notes: Vec<_> = collection.notes_for_model(model.id).collect();
            notes.sort_by_key(|n| n.id.0);
            if notes.is_empty() {
                continue;
            }
            let examples: Vec<_> = notes
                .into_iter()
                .take(example_count)
                .map(|note| {
                    let fields: BTreeMap<String, String> =
                        note.fields.iter().map(|(k, v)| (k.clone(), truncate_field(v))).collect();
                    json!({ "id": note.id.0, "fields": fields, "tags": note.tags })
                })
                .collect();
            examples_data.insert(model.name.clone(), json!(examples));
        }

        let data = json!({ "models": models_data, "decks": decks_data, "examples": examples_data });
        Ok(OperationResult::ok("Birds-eye view of the collection").with_data(data))
    }
}
