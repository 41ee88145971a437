use crate::config::{Config, ConfigArgument};
use crate::error::{Error, Result};
use crate::populator::FieldPopulator;
use anki_model::{Model, Note, NoteId};
use regex::Regex;
use std::collections::BTreeMap;

/// Strips parenthesized spans (ASCII and full-width brackets) from a field,
/// collapsing the double space left behind. Used as the first target of the
/// `remove-brackets-and-empty-notes` composite recipe.
pub struct RemoveTextInParenthesesPopulator {
    config: Config,
    args: Vec<ConfigArgument>,
    ascii_paren: Regex,
    fullwidth_paren: Regex,
    double_space: Regex,
}

impl RemoveTextInParenthesesPopulator {
    pub fn new(supplied: BTreeMap<String, serde_json::Value>) -> Result<Self> {
        let args = vec![ConfigArgument::required("field", "Field to strip parentheses from")];
        let config = Config::build(&args, supplied)?;
        Ok(RemoveTextInParenthesesPopulator {
            config,
            args,
            ascii_paren: Regex::new(r"\([^)]*\)").unwrap(),
            fullwidth_paren: Regex::new(r"（[^）]*）").unwrap(),
            double_space: Regex::new(r" {2,}").unwrap(),
        })
    }

    fn field(&self) -> String {
        self.config.str("field").unwrap_or_default().to_string()
    }

    fn strip(&self, value: &str) -> String {
        let stripped = self.ascii_paren.replace_all(value, "");
        let stripped = self.fullwidth_paren.replace_all(&stripped, "");
        self.double_space.replace_all(&stripped, " ").trim().to_string()
    }
}

impl FieldPopulator for RemoveTextInParenthesesPopulator {
    fn name(&self) -> &str {
        "remove-text-in-parentheses"
    }

    fn description(&self) -> &str {
        "Remove parenthesized text from a field"
    }

    fn config_arguments(&self) -> &[ConfigArgument] {
        &self.args
    }

    fn target_fields(&self) -> Vec<String> {
        vec![self.field()]
    }

    fn supports_batching(&self) -> bool {
        true
    }

    fn validate(&self, model: &Model) -> Result<()> {
        if model.field_by_name(&self.field()).is_none() {
            return Err(Error::TargetFieldNotInModel(self.field()));
        }
        Ok(())
    }

    fn populate(&self, note: &Note) -> Result<BTreeMap<String, String>> {
        let field = self.field();
        let value = note
            .fields
            .get(&field)
            .ok_or_else(|| Error::SourceFieldNotInNote(field.clone()))?;
        let mut out = BTreeMap::new();
        out.insert(field, self.strip(value));
        Ok(out)
    }

    fn populate_batch(&self, notes: &[&Note]) -> Result<BTreeMap<NoteId, BTreeMap<String, String>>> {
        let field = self.field();
        let mut updates = BTreeMap::new();
        for note in notes {
            if let Some(value) = note.fields.get(&field) {
                let mut fields = BTreeMap::new();
                fields.insert(field.clone(), self.strip(value));
                updates.insert(note.id, fields);
            }
        }
        Ok(updates)
    }
}
