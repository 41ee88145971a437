use crate::args::{Args, OperationArgument};
use crate::error::{Error, Result};
use crate::operation::{get_model, Operation};
use crate::result::OperationResult;
use anki_model::{Collection, ModelId};
use anki_persistence::Change;
use anki_populate::PopulatorRegistry;
use serde_json::json;
use std::collections::BTreeMap;

/// Populates fields of every note of a model using a named field populator.
/// Notes (or batches) that fail are skipped rather than aborting the whole
/// run, matching the source's per-note/per-batch error isolation.
pub struct PopulateFieldsOperation {
    args: Args,
    schema: Vec<OperationArgument>,
    model_id: Option<ModelId>,
}

impl PopulateFieldsOperation {
    pub fn schema() -> Vec<OperationArgument> {
        vec![
            OperationArgument::required("populator", "Name of the field populator to use"),
            OperationArgument::required("populator_config", "Configuration object passed to the populator"),
            OperationArgument::optional("batch_size", "Notes processed per batch (1 disables batching)", json!(1)),
            OperationArgument::optional_no_default("model", "Name of the model to populate fields in"),
        ]
    }

    pub fn new(supplied: BTreeMap<String, serde_json::Value>) -> Result<Self> {
        let schema = Self::schema();
        Ok(PopulateFieldsOperation {
            args: Args::build(&schema, supplied)?,
            schema,
            model_id: None,
        })
    }
}

impl Operation for PopulateFieldsOperation {
    fn name(&self) -> &'static str {
        "populate-fields"
    }

    fn description(&self) -> &'static str {
        "Populate fields in notes using a field populator"
    }

    fn readonly(&self) -> bool {
        false
    }

    fn arguments(&self) -> &[OperationArgument] {
        &self.schema
    }

    fn validate(&mut self, collection: &Collection) -> Result<()> {
        let model = get_model(collection, self.args.str("model"))?;

        let registry = PopulatorRegistry::with_builtins();
        let populator_name = self.args.string("populator");
        let populator = registry
            .build(&populator_name, self.args.raw_map("populator_config"))
            .map_err(Error::Populate)?;
        populator.validate(model).map_err(Error::Populate)?;

        let batch_size = self.args.i64("batch_size").unwrap_or(1);
        if batch_size > 1 && !populator.supports_batching() {
            return Err(Error::InvalidArgument {
                name: "batch_size".to_string(),
                reason: format!("populator '{populator_name}' does not support batching"),
            });
        }

        if collection.notes_for_model(model.id).next().is_none() {
            return Err(Error::NoMatchingNotes(model.name.clone()));
        }

        self.model_id = Some(model.id);
        Ok(())
    }

    fn execute(&mut self, collection: &mut Collection) -> Result<OperationResult> {
        let model_id = self.model_id.expect("validate called before execute");
        let registry = PopulatorRegistry::with_builtins();
        let populator = registry
            .build(&self.args.string("populator"), self.args.raw_map("populator_config"))
            .map_err(Error::Populate)?;
        let batch_size = self.args.i64("batch_size").unwrap_or(1).max(1) as usize;

        let note_ids: Vec<_> = collection.notes_for_model(model_id).map(|n| n.id).collect();
        let mut changes = Vec::new();
        let mut updated = 0usize;
        let mut skipped = 0usize;

        if batch_size > 1 && populator.supports_batching() {
            for chunk in note_ids.chunks(batch_size) {
                let notes: Vec<_> = chunk.iter().map(|id| collection.note(*id)).collect::<std::result::Result<_, _>>()?;
                match populator.populate_batch(&notes) {
                    Ok(batch_updates) => {
                        for (note_id, field_updates) in batch_updates {
                            let note = collection.note_mut(note_id).expect("note id returned from populator's own batch input");
                            for (field_name, value) in field_updates {
                                note.fields.insert(field_name, value);
                            }
                            changes.push(Change::note_fields_updated(note));
                            updated += 1;
                        }
                    }
                    Err(_) => skipped += chunk.len(),
                }
            }
        } else {
            for note_id in note_ids {
                let note = collection.note(note_id)?;
                match populator.populate(note) {
                    Ok(field_updates) => {
                        let note = collection.note_mut(note_id).expect("note id collected from notes_for_model");
                        for (field_name, value) in field_updates {
                            note.fields.insert(field_name, value);
                        }
                        changes.push(Change::note_fields_updated(note));
                        updated += 1;
                    }
                    Err(_) => skipped += 1,
                }
            }
        }

        Ok(OperationResult::ok(format!("Updated {updated} notes, skipped {skipped} notes")).with_changes(changes))
    }
}
