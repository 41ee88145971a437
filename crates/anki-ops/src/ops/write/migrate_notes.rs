use crate::args::{Args, OperationArgument};
use crate::error::{Error, Result};
use crate::operation::{get_model, Operation};
use crate::result::OperationResult;
use anki_model::{Collection, ModelId, Usn};
use anki_persistence::Change;
use std::collections::{BTreeMap, BTreeSet};

/// Moves every note of a source model to a target model, remapping fields
/// according to a caller-supplied field mapping. Migrated in place so each
/// note keeps its id; emits exactly one `NoteMigrated` change per note.
pub struct MigrateNotesOperation {
    args: Args,
    schema: Vec<OperationArgument>,
    source_model_id: Option<ModelId>,
    target_model_id: Option<ModelId>,
}

impl MigrateNotesOperation {
    pub fn schema() -> Vec<OperationArgument> {
        vec![
            OperationArgument::required("source_model", "Name of the model notes are migrated from"),
            OperationArgument::required("target_model", "Name of the model notes are migrated to"),
            OperationArgument::required("field_mapping", "Mapping of source field names to target field names"),
        ]
    }

    pub fn new(supplied: BTreeMap<String, serde_json::Value>) -> Result<Self> {
        let schema = Self::schema();
        Ok(MigrateNotesOperation {
            args: Args::build(&schema, supplied)?,
            schema,
            source_model_id: None,
            target_model_id: None,
        })
    }
}

impl Operation for MigrateNotesOperation {
    fn name(&self) -> &'static str {
        "migrate-notes"
    }

    fn description(&self) -> &'static str {
        "Migrate notes from one model to another, remapping fields"
    }

    fn readonly(&self) -> bool {
        false
    }

    fn arguments(&self) -> &[OperationArgument] {
        &self.schema
    }

    fn validate(&mut self, collection: &Collection) -> Result<()> {
        let source = get_model(collection, Some(&self.args.string("source_model")))?;
        let target = get_model(collection, Some(&self.args.string("target_model")))?;

        let mapping = self.args.str_map("field_mapping");
        for (source_field, target_field) in &mapping {
            if source.field_by_name(source_field).is_none() {
                return Err(Error::FieldNotFound {
                    model: source.name.clone(),
                    field: source_field.clone(),
                });
            }
            if target.field_by_name(target_field).is_none() {
                return Err(Error::FieldNotFound {
                    model: target.name.clone(),
                    field: target_field.clone(),
                });
            }
        }
        let targets: BTreeSet<&String> = mapping.values().collect();
        if targets.len() != mapping.len() {
            return Err(Error::NonInjectiveMapping(
                "field_mapping must not map two source fields to the same target field".to_string(),
            ));
        }

        self.source_model_id = Some(source.id);
        self.target_model_id = Some(target.id);
        Ok(())
    }

    fn execute(&mut self, collection: &mut Collection) -> Result<OperationResult> {
        let source_id = self.source_model_id.expect("validate called before execute");
        let target_id = self.target_model_id.expect("validate called before execute");
        let mapping = self.args.str_map("field_mapping");

        let target_field_names: Vec<String> = collection
            .model(target_id)
            .expect("target model resolved during validate")
            .fields
            .iter()
            .map(|f| f.name.clone())
            .collect();

        let note_ids: Vec<_> = collection.notes_for_model(source_id).map(|n| n.id).collect();
        let mut changes = Vec::new();
        for note_id in &note_ids {
            let note = collection.note_mut(*note_id).expect("note id collected from notes_for_model");
            let old_fields = std::mem::take(&mut note.fields);

            let mut new_fields = BTreeMap::new();
            for field_name in &target_field_names {
                new_fields.insert(field_name.clone(), String::new());
            }
            for (source_field, target_field) in &mapping {
                if let Some(value) = old_fields.get(source_field) {
                    new_fields.insert(target_field.clone(), value.clone());
                }
            }

            note.model_id = target_id;
            note.fields = new_fields;
            note.usn = Usn(-1);
            changes.push(Change::NoteMigrated {
                note_id: *note_id,
                source_model_id: source_id,
                target_model_id: target_id,
                fields: note.fields.clone(),
            });
        }

        let count = note_ids.len();
        Ok(OperationResult::ok(format!("Migrated {count} notes from '{}' to '{}'", self.args.string("source_model"), self.args.string("target_model")))
            .with_changes(changes))
    }
}
