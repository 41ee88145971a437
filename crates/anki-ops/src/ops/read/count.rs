use crate::args::{Args, OperationArgument};
use crate::error::{Error, Result};
use crate::operation::{get_model, Operation};
use crate::path::{AnkiPath, ObjectType};
use crate::result::OperationResult;
use anki_model::Collection;
use serde_json::json;
use std::collections::BTreeMap;

/// Counts Anki objects at a path, with a per-model breakdown for `/notes`.
pub struct CountOperation {
    args: Args,
    schema: Vec<OperationArgument>,
    path: Option<AnkiPath>,
}

impl CountOperation {
    pub fn schema() -> Vec<OperationArgument> {
        vec![OperationArgument::required("path", "Path to the Anki object(s)")]
    }

    pub fn new(supplied: BTreeMap<String, serde_json::Value>) -> Result<Self> {
        let schema = Self::schema();
        Ok(CountOperation {
            args: Args::build(&schema, supplied)?,
            schema,
            path: None,
        })
    }
}

impl Operation for CountOperation {
    fn name(&self) -> &'static str {
        "count"
    }

    fn description(&self) -> &'static str {
        "Count Anki objects at the specified path"
    }

    fn readonly(&self) -> bool {
        true
    }

    fn arguments(&self) -> &[OperationArgument] {
        &self.schema
    }

    fn validate(&mut self, collection: &Collection) -> Result<()> {
        let path = AnkiPath::parse(&self.args.string("path"))?;
        if !path.is_collection() {
            return Err(Error::InvalidPath(format!("path must refer to a collection of objects: {}", self.args.string("path"))));
        }
        if let Some(model_name) = &path.model_name {
            get_model(collection, Some(model_name))?;
        }
        self.path = Some(path);
        Ok(())
    }

    fn execute(&mut self, collection: &mut Collection) -> Result<OperationResult> {
        let path = self.path.as_ref().expect("validate called before execute");
        match path.object_type {
            ObjectType::Models => {
                let count = collection.models.len();
                Ok(OperationResult::ok(format!("Counted {count} models")).with_data(json!({ "count": count })))
            }
            ObjectType::Fields => {
                let model = get_model(collection, path.model_name.as_deref())?;
                let count = model.fields.len();
                Ok(OperationResult::ok(format!("Counted {count} fields in model '{}'", model.name))
                    .with_data(json!({ "count": count })))
            }
            ObjectType::Templates => {
                let model = get_model(collection, path.model_name.as_deref())?;
                let count = model.templates.len();
                Ok(OperationResult::ok(format!("Counted {count} templates in model '{}'", model.name))
                    .with_data(json!({ "count": count })))
            }
            ObjectType::Cards => {
                let model_filter = match &path.model_name {
                    Some(name) => Some(get_model(collection, Some(name))?.id),
                    None => None,
                };
                let count = collection
                    .cards
                    .values()
                    .filter(|c| match model_filter {
                        Some(model_id) => collection.notes.get(&c.note_id).map(|n| n.model_id) == Some(model_id),
                        None => true,
                    })
                    .count();
                Ok(OperationResult::ok(format!("Counted {count} cards")).with_data(json!({ "count": count })))
            }
            ObjectType::Notes => {
                if let Some(name) = &path.model_name {
                    let model = get_model(collection, Some(name))?;
                    let count = collection.notes_for_model(model.id).count();
                    Ok(OperationResult::ok(format!("Counted {count} notes for model '{}'", model.name))
                        .with_data(json!({ "count": count })))
                } else {
                    let counts: BTreeMap<String, usize> = collection
                        .models
                        .values()
                        .map(|m| (m.name.clone(), collection.notes_for_model(m.id).count()))
                        .collect();
                    let total: usize = counts.values().sum();
                    let model_count = counts.len();
                    Ok(OperationResult::ok(format!("Counted {total} notes across {model_count} models"))
                        .with_data(json!({ "total": total, "by_model": counts })))
                }
            }
            _ => unreachable!("is_collection() excludes item object types"),
        }
    }
}
