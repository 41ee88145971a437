use crate::args::{Args, OperationArgument};
use crate::error::Result;
use crate::operation::{get_model, Operation};
use crate::result::OperationResult;
use anki_model::{Collection, ModelId};
use anki_persistence::Change;
use std::collections::BTreeMap;

/// Appends a new, empty-valued field to a model and every existing note of
/// that model.
pub struct AddFieldOperation {
    args: Args,
    schema: Vec<OperationArgument>,
    model_id: Option<ModelId>,
}

impl AddFieldOperation {
    pub fn schema() -> Vec<OperationArgument> {
        vec![
            OperationArgument::required("field_name", "Name of the field to add"),
            OperationArgument::optional_no_default("model", "Name of the model to add the field to"),
        ]
    }

    pub fn new(supplied: BTreeMap<String, serde_json::Value>) -> Result<Self> {
        let schema = Self::schema();
        Ok(AddFieldOperation {
            args: Args::build(&schema, supplied)?,
            schema,
            model_id: None,
        })
    }
}

impl Operation for AddFieldOperation {
    fn name(&self) -> &'static str {
        "add-field"
    }

    fn description(&self) -> &'static str {
        "Add a new field to a model and all of its notes"
    }

    fn readonly(&self) -> bool {
        false
    }

    fn arguments(&self) -> &[OperationArgument] {
        &self.schema
    }

    fn validate(&mut self, collection: &Collection) -> Result<()> {
        let model = get_model(collection, self.args.str("model"))?;
        let field_name = self.args.string("field_name");
        if model.field_by_name(&field_name).is_some() {
            return Err(anki_model::Error::DuplicateFieldName {
                model: model.name.clone(),
                field: field_name,
            }
            .into());
        }
        self.model_id = Some(model.id);
        Ok(())
    }

    fn execute(&mut self, collection: &mut Collection) -> Result<OperationResult> {
        let model_id = self.model_id.expect("validate called before execute");
        let field_name = self.args.string("field_name");

        collection.model_mut(model_id)?.add_field(&field_name)?;

        let note_ids: Vec<_> = collection.notes_for_model(model_id).map(|n| n.id).collect();
        let mut changes = vec![Change::ModelUpdated { models: collection.models.clone() }];
        for note_id in note_ids {
            let note = collection.note_mut(note_id).expect("note id collected from notes_for_model");
            note.fields.insert(field_name.clone(), String::new());
            changes.push(Change::note_fields_updated(note));
        }

        let model_name = collection.model(model_id)?.name.clone();
        Ok(OperationResult::ok(format!("Added field '{field_name}' to model '{model_name}'")).with_changes(changes))
    }
}
