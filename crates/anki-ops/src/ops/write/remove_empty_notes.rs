use crate::args::{Args, OperationArgument};
use crate::error::{Error, Result};
use crate::operation::{get_model, Operation};
use crate::result::OperationResult;
use anki_model::{Collection, ModelId};
use anki_persistence::Change;
use std::collections::BTreeMap;

/// Deletes every note of a model whose given field is empty, along with its
/// cards. Cards are deleted before their owning note, matching the source's
/// deletion order.
pub struct RemoveEmptyNotesOperation {
    args: Args,
    schema: Vec<OperationArgument>,
    model_id: Option<ModelId>,
}

impl RemoveEmptyNotesOperation {
    pub fn schema() -> Vec<OperationArgument> {
        vec![
            OperationArgument::required("field", "Field checked for emptiness"),
            OperationArgument::optional_no_default("model", "Name of the model whose notes are checked"),
        ]
    }

    pub fn new(supplied: BTreeMap<String, serde_json::Value>) -> Result<Self> {
        let schema = Self::schema();
        Ok(RemoveEmptyNotesOperation {
            args: Args::build(&schema, supplied)?,
            schema,
            model_id: None,
        })
    }
}

impl Operation for RemoveEmptyNotesOperation {
    fn name(&self) -> &'static str {
        "remove-empty-notes"
    }

    fn description(&self) -> &'static str {
        "Remove notes whose given field is empty"
    }

    fn readonly(&self) -> bool {
        false
    }

    fn arguments(&self) -> &[OperationArgument] {
        &self.schema
    }

    fn validate(&mut self, collection: &Collection) -> Result<()> {
        let model = get_model(collection, self.args.str("model"))?;
        let field = self.args.string("field");
        if model.field_by_name(&field).is_none() {
            return Err(Error::FieldNotFound {
                model: model.name.clone(),
                field,
            });
        }
        self.model_id = Some(model.id);
        Ok(())
    }

    fn execute(&mut self, collection: &mut Collection) -> Result<OperationResult> {
        let model_id = self.model_id.expect("validate called before execute");
        let field = self.args.string("field");

        let empty_note_ids: Vec<_> = collection
            .notes_for_model(model_id)
            .filter(|n| n.fields.get(&field).map(|v| v.trim().is_empty()).unwrap_or(true))
            .map(|n| n.id)
            .collect();

        let mut changes = Vec::new();
        for note_id in &empty_note_ids {
            let card_ids: Vec<_> = collection.cards_for_note(*note_id).map(|c| c.id).collect();
            for card_id in card_ids {
                collection.remove_card(card_id);
                changes.push(Change::CardDeleted { card_id });
            }
        }
        for note_id in &empty_note_ids {
            collection.remove_note(*note_id);
            changes.push(Change::NoteDeleted { note_id: *note_id });
        }
        collection.recompute_tags();

        let count = empty_note_ids.len();
        Ok(OperationResult::ok(format!("Removed {count} empty notes")).with_changes(changes))
    }
}
