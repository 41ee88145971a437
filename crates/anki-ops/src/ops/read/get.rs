use crate::args::{Args, OperationArgument};
use crate::error::{Error, Result};
use crate::format::truncate_field;
use crate::operation::{get_model, Operation};
use crate::path::{AnkiPath, ObjectType};
use crate::result::OperationResult;
use anki_model::Collection;
use serde_json::json;
use std::collections::BTreeMap;

/// Gets a single item or a scalar property: `/models/<M>`,
/// `/models/<M>/fields/<F>`, `/models/<M>/templates/<T>`,
/// `/models/<M>/css`, `/models/<M>/example`.
pub struct GetOperation {
    args: Args,
    schema: Vec<OperationArgument>,
    path: Option<AnkiPath>,
}

impl GetOperation {
    pub fn schema() -> Vec<OperationArgument> {
        vec![OperationArgument::required("path", "Path to the Anki object(s)")]
    }

    pub fn new(supplied: BTreeMap<String, serde_json::Value>) -> Result<Self> {
        let schema = Self::schema();
        Ok(GetOperation {
            args: Args::build(&schema, supplied)?,
            schema,
            path: None,
        })
    }
}

impl Operation for GetOperation {
    fn name(&self) -> &'static str {
        "get"
    }

    fn description(&self) -> &'static str {
        "Get specific Anki objects or their properties"
    }

    fn readonly(&self) -> bool {
        true
    }

    fn arguments(&self) -> &[OperationArgument] {
        &self.schema
    }

    fn validate(&mut self, collection: &Collection) -> Result<()> {
        let path = AnkiPath::parse(&self.args.string("path"))?;
        if !path.is_item()
            && !matches!(path.object_type, ObjectType::Model | ObjectType::Fields | ObjectType::Templates | ObjectType::Css | ObjectType::Example)
        {
            return Err(Error::InvalidPath(format!("path must refer to a specific item: {}", self.args.string("path"))));
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
            ObjectType::Model => get_model_info(collection, path),
            ObjectType::Fields if path.item_name.is_some() => get_field_info(collection, path),
            ObjectType::Templates if path.item_name.is_some() => get_template_info(collection, path),
            ObjectType::Css => get_css(collection, path),
            ObjectType::Example => get_example(collection, path),
            _ => Err(Error::InvalidPath(format!("cannot get information for path with object type {:?}", path.object_type))),
        }
    }
}

fn get_model_info(collection: &Collection, path: &AnkiPath) -> Result<OperationResult> {
    let model = get_model(collection, path.model_name.as_deref())?;
    let info = json!({
        "name": model.name,
        "id": model.id.0,
        "type": if model.kind == anki_model::ModelKind::Standard { "Standard" } else { "Cloze" },
        "field_count": model.fields.len(),
        "template_count": model.templates.len(),
    });
    Ok(OperationResult::ok(format!("Retrieved information for model '{}'", model.name)).with_data(json!({ "model": info })))
}

fn get_field_info(collection: &Collection, path: &AnkiPath) -> Result<OperationResult> {
    let model = get_model(collection, path.model_name.as_deref())?;
    let name = path.item_name.as_deref().unwrap();
    let field = model.field_by_name(name).ok_or_else(|| Error::FieldNotFound {
        model: model.name.clone(),
        field: name.to_string(),
    })?;
    let info = json!({ "name": field.name, "type": "text", "ordinal": field.ord });
    Ok(OperationResult::ok(format!("Retrieved information for field '{}' in model '{}'", field.name, model.name))
        .with_data(json!({ "field": info })))
}

fn get_template_info(collection: &Collection, path: &AnkiPath) -> Result<OperationResult> {
    let model = get_model(collection, path.model_name.as_deref())?;
    let name = path.item_name.as_deref().unwrap();
    let template = model
        .templates
        .iter()
        .find(|t| t.name == name)
        .ok_or_else(|| Error::TemplateNotFound {
            model: model.name.clone(),
            template: name.to_string(),
        })?;
    let info = json!({
        "name": template.name,
        "ordinal": template.ord,
        "question_format": template.question_format,
        "answer_format": template.answer_format,
    });
    Ok(OperationResult::ok(format!("Retrieved information for template '{}' in model '{}'", template.name, model.name))
        .with_data(json!({ "template": info })))
}

fn get_css(collection: &Collection, path: &AnkiPath) -> Result<OperationResult> {
    let model = get_model(collection, path.model_name.as_deref())?;
    Ok(OperationResult::ok(format!("Retrieved CSS for model '{}'", model.name)).with_data(json!({ "css": model.css })))
}

fn get_example(collection: &Collection, path: &AnkiPath) -> Result<OperationResult> {
    let model = get_model(collection, path.model_name.as_deref())?;
    let example = collection.notes_for_model(model.id).next();

    let (fields, message): (BTreeMap<String, String>, String) = match example {
        None => (
            model.fields.iter().map(|f| (f.name.clone(), String::new())).collect(),
            format!("No notes found for model '{}', returning empty fields", model.name),
        ),
        Some(note) => (
            model
                .fields
                .iter()
                .map(|f| {
                    let value = note.fields.get(&f.name).map(String::as_str).unwrap_or("");
                    (f.name.clone(), truncate_field(value))
                })
                .collect(),
            format!("Retrieved example note for model '{}'", model.name),
        ),
    };

    Ok(OperationResult::ok(message).with_data(json!({ "example": fields })))
}
