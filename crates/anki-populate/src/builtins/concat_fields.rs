use crate::config::{Config, ConfigArgument};
use crate::error::{Error, Result};
use crate::populator::FieldPopulator;
use anki_model::{Model, Note, NoteId};
use std::collections::{BTreeMap, BTreeSet};

/// Concatenates several source fields into a target field, separated by a
/// configurable string. Grounded on `ConcatFieldsPopulator`
/// (`anki_terminal/populators/concat_fields.py`) — the reference batching
/// implementation: missing-field notes are skipped rather than aborting the
/// whole batch.
pub struct ConcatFieldsPopulator {
    config: Config,
    args: Vec<ConfigArgument>,
}

impl ConcatFieldsPopulator {
    pub fn new(supplied: BTreeMap<String, serde_json::Value>) -> Result<Self> {
        let args = vec![
            ConfigArgument::required("source_fields", "Fields to concatenate"),
            ConfigArgument::required("target_field", "Field to store the result"),
            ConfigArgument::optional("separator", "Separator between fields", serde_json::json!(" ")),
        ];
        let config = Config::build(&args, supplied)?;
        Ok(ConcatFieldsPopulator { config, args })
    }

    fn source_fields(&self) -> Vec<String> {
        self.config.str_list("source_fields")
    }

    fn target_field(&self) -> String {
        self.config.str("target_field").unwrap_or_default().to_string()
    }

    fn separator(&self) -> String {
        self.config.str("separator").unwrap_or(" ").to_string()
    }
}

impl FieldPopulator for ConcatFieldsPopulator {
    fn name(&self) -> &str {
        "concat-fields"
    }

    fn description(&self) -> &str {
        "Concatenate multiple fields into a target field"
    }

    fn config_arguments(&self) -> &[ConfigArgument] {
        &self.args
    }

    fn target_fields(&self) -> Vec<String> {
        vec![self.target_field()]
    }

    fn supports_batching(&self) -> bool {
        true
    }

    fn validate(&self, model: &Model) -> Result<()> {
        for field in self.source_fields() {
            if model.field_by_name(&field).is_none() {
                return Err(Error::SourceFieldNotInModel(field));
            }
        }
        if model.field_by_name(&self.target_field()).is_none() {
            return Err(Error::TargetFieldNotInModel(self.target_field()));
        }
        Ok(())
    }

    fn populate(&self, note: &Note) -> Result<BTreeMap<String, String>> {
        let source_fields = self.source_fields();
        let mut values = Vec::with_capacity(source_fields.len());
        for field in &source_fields {
            let value = note
                .fields
                .get(field)
                .ok_or_else(|| Error::SourceFieldNotInNote(field.clone()))?;
            values.push(value.clone());
        }
        let mut out = BTreeMap::new();
        out.insert(self.target_field(), values.join(&self.separator()));
        Ok(out)
    }

    fn populate_batch(&self, notes: &[&Note]) -> Result<BTreeMap<NoteId, BTreeMap<String, String>>> {
        let source_fields = self.source_fields();
        let all_fields: BTreeSet<&str> = notes
            .iter()
            .flat_map(|n| n.fields.keys().map(String::as_str))
            .collect();
        for field in &source_fields {
            if !all_fields.contains(field.as_str()) {
                return Err(Error::SourceFieldNotInNote(field.clone()));
            }
        }
        let mut updates = BTreeMap::new();
        for note in notes {
            if source_fields.iter().all(|f| note.fields.contains_key(f)) {
                let values: Vec<String> = source_fields
                    .iter()
                    .map(|f| note.fields[f].clone())
                    .collect();
                let mut fields = BTreeMap::new();
                fields.insert(self.target_field(), values.join(&self.separator()));
                updates.insert(note.id, fields);
            }
        }
        Ok(updates)
    }
}
