use crate::args::{Args, OperationArgument};
use crate::error::{Error, Result};
use crate::operation::{get_model, Operation};
use crate::result::OperationResult;
use anki_model::{Collection, ModelId};
use anki_persistence::Change;
use regex::Regex;
use serde_json::json;
use std::collections::BTreeMap;

/// Tags notes whose source field matches a regex, deriving the tag from the
/// pattern's first capture group.
pub struct TagNotesOperation {
    args: Args,
    schema: Vec<OperationArgument>,
    model_id: Option<ModelId>,
    pattern: Option<Regex>,
}

impl TagNotesOperation {
    pub fn schema() -> Vec<OperationArgument> {
        vec![
            OperationArgument::required("source_field", "Field to match the pattern against"),
            OperationArgument::required("pattern", "Regex with a capture group deriving the tag"),
            OperationArgument::optional("tag_prefix", "Prefix prepended to the derived tag", json!("")),
            OperationArgument::optional_no_default("model", "Name of the model whose notes are tagged"),
        ]
    }

    pub fn new(supplied: BTreeMap<String, serde_json::Value>) -> Result<Self> {
        let schema = Self::schema();
        Ok(TagNotesOperation {
            args: Args::build(&schema, supplied)?,
            schema,
            model_id: None,
            pattern: None,
        })
    }
}

impl Operation for TagNotesOperation {
    fn name(&self) -> &'static str {
        "tag-notes"
    }

    fn description(&self) -> &'static str {
        "Tag notes whose source field matches a pattern"
    }

    fn readonly(&self) -> bool {
        false
    }

    fn arguments(&self) -> &[OperationArgument] {
        &self.schema
    }

    fn validate(&mut self, collection: &Collection) -> Result<()> {
        let model = get_model(collection, self.args.str("model"))?;
        let field = self.args.string("source_field");
        if model.field_by_name(&field).is_none() {
            return Err(Error::FieldNotFound {
                model: model.name.clone(),
                field,
            });
        }

        let pattern_str = self.args.string("pattern");
        let regex = Regex::new(&pattern_str).map_err(|_| Error::InvalidRegex(pattern_str.clone()))?;
        if regex.captures_len() < 2 {
            return Err(Error::PatternMissingCaptureGroup);
        }

        self.model_id = Some(model.id);
        self.pattern = Some(regex);
        Ok(())
    }

    fn execute(&mut self, collection: &mut Collection) -> Result<OperationResult> {
        let model_id = self.model_id.expect("validate called before execute");
        let field = self.args.string("source_field");
        let prefix = self.args.string("tag_prefix");
        let pattern = self.pattern.take().expect("validate called before execute");

        let note_ids: Vec<_> = collection.notes_for_model(model_id).map(|n| n.id).collect();
        let mut changes = Vec::new();
        let mut tagged = 0usize;
        for note_id in note_ids {
            let note = collection.note_mut(note_id).expect("note id collected from notes_for_model");
            let value = note.fields.get(&field).cloned().unwrap_or_default();
            let Some(captures) = pattern.captures(&value) else {
                continue;
            };
            let Some(group) = captures.get(1) else {
                continue;
            };
            let tag = format!("{prefix}{}", group.as_str());
            if note.add_tag(tag) {
                tagged += 1;
                changes.push(Change::note_tags_updated(note));
            }
        }
        collection.recompute_tags();

        Ok(OperationResult::ok(format!("Tagged {tagged} notes")).with_changes(changes))
    }
}
