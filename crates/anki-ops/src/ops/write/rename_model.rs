use crate::args::{Args, OperationArgument};
use crate::error::Result;
use crate::operation::Operation;
use crate::result::OperationResult;
use anki_model::{Collection, ModelId};
use anki_persistence::Change;
use std::collections::BTreeMap;

/// Renames a model. Emits a `NoteFieldsUpdated` for every note of the model
/// alongside `ModelUpdated`, matching the source's provenance behavior even
/// though no field value actually changes — the resulting UPDATE is a
/// harmless no-op at the database layer.
pub struct RenameModelOperation {
    args: Args,
    schema: Vec<OperationArgument>,
    model_id: Option<ModelId>,
}

impl RenameModelOperation {
    pub fn schema() -> Vec<OperationArgument> {
        vec![
            OperationArgument::required("old_model_name", "Current name of the model"),
            OperationArgument::required("new_model_name", "New name for the model"),
        ]
    }

    pub fn new(supplied: BTreeMap<String, serde_json::Value>) -> Result<Self> {
        let schema = Self::schema();
        Ok(RenameModelOperation {
            args: Args::build(&schema, supplied)?,
            schema,
            model_id: None,
        })
    }
}

impl Operation for RenameModelOperation {
    fn name(&self) -> &'static str {
        "rename-model"
    }

    fn description(&self) -> &'static str {
        "Rename a model"
    }

    fn readonly(&self) -> bool {
        false
    }

    fn arguments(&self) -> &[OperationArgument] {
        &self.schema
    }

    fn validate(&mut self, collection: &Collection) -> Result<()> {
        let old_name = self.args.string("old_model_name");
        let new_name = self.args.string("new_model_name");
        let model = collection
            .model_by_name(&old_name)
            .ok_or_else(|| crate::error::Error::ModelNotFound(old_name.clone()))?;
        if collection.model_by_name(&new_name).is_some() {
            return Err(anki_model::Error::DuplicateModelName(new_name).into());
        }
        self.model_id = Some(model.id);
        Ok(())
    }

    fn execute(&mut self, collection: &mut Collection) -> Result<OperationResult> {
        let model_id = self.model_id.expect("validate called before execute");
        let new_name = self.args.string("new_model_name");
        let old_name = self.args.string("old_model_name");

        collection.model_mut(model_id)?.name = new_name.clone();

        let note_ids: Vec<_> = collection.notes_for_model(model_id).map(|n| n.id).collect();
        let mut changes = vec![Change::ModelUpdated { models: collection.models.clone() }];
        for note_id in note_ids {
            let note = collection.note(note_id)?;
            changes.push(Change::note_fields_updated(note));
        }

        Ok(OperationResult::ok(format!("Renamed model '{old_name}' to '{new_name}'")).with_changes(changes))
    }
}
