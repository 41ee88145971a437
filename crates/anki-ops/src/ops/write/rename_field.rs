use crate::args::{Args, OperationArgument};
use crate::error::{Error, Result};
use crate::operation::{get_model, Operation};
use crate::result::OperationResult;
use anki_model::{Collection, ModelId};
use anki_persistence::Change;
use std::collections::BTreeMap;

/// Renames a field on a model and moves the corresponding value in every
/// note of that model to the new key.
pub struct RenameFieldOperation {
    args: Args,
    schema: Vec<OperationArgument>,
    model_id: Option<ModelId>,
}

impl RenameFieldOperation {
    pub fn schema() -> Vec<OperationArgument> {
        vec![
            OperationArgument::required("old_field_name", "Current name of the field"),
            OperationArgument::required("new_field_name", "New name for the field"),
            OperationArgument::optional_no_default("model", "Name of the model the field belongs to"),
        ]
    }

    pub fn new(supplied: BTreeMap<String, serde_json::Value>) -> Result<Self> {
        let schema = Self::schema();
        Ok(RenameFieldOperation {
            args: Args::build(&schema, supplied)?,
            schema,
            model_id: None,
        })
    }
}

impl Operation for RenameFieldOperation {
    fn name(&self) -> &'static str {
        "rename-field"
    }

    fn description(&self) -> &'static str {
        "Rename a field on a model and all of its notes"
    }

    fn readonly(&self) -> bool {
        false
    }

    fn arguments(&self) -> &[OperationArgument] {
        &self.schema
    }

    fn validate(&mut self, collection: &Collection) -> Result<()> {
        let model = get_model(collection, self.args.str("model"))?;
        let old_name = self.args.string("old_field_name");
        let new_name = self.args.string("new_field_name");
        if model.field_by_name(&old_name).is_none() {
            return Err(Error::FieldNotFound {
                model: model.name.clone(),
                field: old_name,
            });
        }
        if model.field_by_name(&new_name).is_some() {
            return Err(anki_model::Error::DuplicateFieldName {
                model: model.name.clone(),
                field: new_name,
            }
            .into());
        }
        self.model_id = Some(model.id);
        Ok(())
    }

    fn execute(&mut self, collection: &mut Collection) -> Result<OperationResult> {
        let model_id = self.model_id.expect("validate called before execute");
        let old_name = self.args.string("old_field_name");
        let new_name = self.args.string("new_field_name");

        collection.model_mut(model_id)?.rename_field(&old_name, &new_name)?;

        let note_ids: Vec<_> = collection.notes_for_model(model_id).map(|n| n.id).collect();
        let mut changes = vec![Change::ModelUpdated { models: collection.models.clone() }];
        for note_id in note_ids {
            let note = collection.note_mut(note_id).expect("note id collected from notes_for_model");
            if let Some(value) = note.fields.remove(&old_name) {
                note.fields.insert(new_name.clone(), value);
            }
            changes.push(Change::note_fields_updated(note));
        }

        let model_name = collection.model(model_id)?.name.clone();
        Ok(OperationResult::ok(format!("Renamed field '{old_name}' to '{new_name}' in model '{model_name}'")).with_changes(changes))
    }
}
