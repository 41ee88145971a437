use crate::args::{Args, OperationArgument};
use crate::error::{Error, Result};
use crate::operation::Operation;
use crate::result::OperationResult;
use anki_model::{Collection, DeckId, Field, Model, Template};
use anki_persistence::Change;
use std::collections::{BTreeMap, BTreeSet};

/// Creates a new model with the given field names and a single template.
pub struct AddModelOperation {
    args: Args,
    schema: Vec<OperationArgument>,
}

impl AddModelOperation {
    pub fn schema() -> Vec<OperationArgument> {
        vec![
            OperationArgument::required("model", "Name of the model to create"),
            OperationArgument::required("fields", "List of field names for the model"),
            OperationArgument::required("template_name", "Name of the template"),
            OperationArgument::required("question_format", "Format string for the question side"),
            OperationArgument::required("answer_format", "Format string for the answer side"),
            OperationArgument::required("css", "CSS styling for the cards"),
        ]
    }

    pub fn new(supplied: BTreeMap<String, serde_json::Value>) -> Result<Self> {
        let schema = Self::schema();
        Ok(AddModelOperation {
            args: Args::build(&schema, supplied)?,
            schema,
        })
    }
}

impl Operation for AddModelOperation {
    fn name(&self) -> &'static str {
        "add-model"
    }

    fn description(&self) -> &'static str {
        "Add a new model with the given fields and template"
    }

    fn readonly(&self) -> bool {
        false
    }

    fn arguments(&self) -> &[OperationArgument] {
        &self.schema
    }

    fn validate(&mut self, collection: &Collection) -> Result<()> {
        let name = self.args.string("model");
        if collection.model_by_name(&name).is_some() {
            return Err(anki_model::Error::DuplicateModelName(name).into());
        }
        let fields = self.args.str_list("fields");
        if fields.is_empty() {
            return Err(Error::InvalidArgument {
                name: "fields".to_string(),
                reason: "at least one field is required".to_string(),
            });
        }
        let unique: BTreeSet<&String> = fields.iter().collect();
        if unique.len() != fields.len() {
            return Err(Error::InvalidArgument {
                name: "fields".to_string(),
                reason: "field names must be unique".to_string(),
            });
        }
        Ok(())
    }

    fn execute(&mut self, collection: &mut Collection) -> Result<OperationResult> {
        let model_id = collection.next_model_id();
        let field_names = self.args.str_list("fields");
        let field_count = field_names.len();
        let fields: Vec<Field> = field_names
            .iter()
            .enumerate()
            .map(|(i, name)| Field::new(name.clone(), i as u16))
            .collect();
        let template = Template::new(
            self.args.string("template_name"),
            0,
            self.args.string("question_format"),
            self.args.string("answer_format"),
        );
        let default_deck_id = collection.decks.keys().next().copied().unwrap_or(DeckId(1));
        let model = Model::new(model_id, self.args.string("model"), fields, vec![template], self.args.string("css"), default_deck_id)?;
        let model_name = model.name.clone();
        collection.insert_model(model)?;

        let change = Change::ModelUpdated { models: collection.models.clone() };
        Ok(OperationResult::ok(format!("Added model '{model_name}' with {field_count} fields and 1 template")).with_changes(vec![change]))
    }
}
