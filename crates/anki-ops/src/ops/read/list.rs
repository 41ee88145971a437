use crate::args::{Args, OperationArgument};
use crate::error::{Error, Result};
use crate::format::truncate_field;
use crate::operation::{get_model, Operation};
use crate::path::{AnkiPath, ObjectType};
use crate::result::OperationResult;
use anki_model::Collection;
use serde_json::json;
use std::collections::BTreeMap;

/// Lists Anki objects at a path: `/models`, `/models/<M>/fields`,
/// `/models/<M>/templates`, `/cards[/<M>]`, `/notes[/<M>]`.
pub struct ListOperation {
    args: Args,
    schema: Vec<OperationArgument>,
    path: Option<AnkiPath>,
}

impl ListOperation {
    pub fn schema() -> Vec<OperationArgument> {
        vec![
            OperationArgument::required("path", "Path to the Anki object(s)"),
            OperationArgument::optional("limit", "Maximum number of items to return (0 for all)", json!(0)),
        ]
    }

    pub fn new(supplied: BTreeMap<String, serde_json::Value>) -> Result<Self> {
        let schema = Self::schema();
        Ok(ListOperation {
            args: Args::build(&schema, supplied)?,
            schema,
            path: None,
        })
    }
}

impl Operation for ListOperation {
    fn name(&self) -> &'static str {
        "list"
    }

    fn description(&self) -> &'static str {
        "List Anki objects at the specified path"
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
            ObjectType::Models => list_models(collection),
            ObjectType::Fields => list_fields(collection, path),
            ObjectType::Templates => list_templates(collection, path),
            ObjectType::Cards => list_cards(collection, path),
            ObjectType::Notes => list_notes(collection, path, self.args.i64("limit").unwrap_or(0)),
            _ => unreachable!("is_collection() excludes item object types"),
        }
    }
}

fn list_models(collection: &Collection) -> Result<OperationResult> {
    let models: Vec<_> = collection
        .models
        .values()
        .map(|m| {
            json!({
                "name": m.name,
                "id": m.id.0,
                "type": if m.kind == anki_model::ModelKind::Standard { "Standard" } else { "Cloze" },
            })
        })
        .collect();
    let count = models.len();
    Ok(OperationResult::ok(format!("Listed {count} models")).with_data(json!({ "models": models })))
}

fn list_fields(collection: &Collection, path: &AnkiPath) -> Result<OperationResult> {
    let model = get_model(collection, path.model_name.as_deref())?;
    let fields: Vec<_> = model
        .fields
        .iter()
        .map(|f| json!({ "name": f.name, "type": "text" }))
        .collect();
    let count = fields.len();
    Ok(OperationResult::ok(format!("Listed {count} fields from model '{}'", model.name)).with_data(json!({ "fields": fields })))
}

fn list_templates(collection: &Collection, path: &AnkiPath) -> Result<OperationResult> {
    let model = get_model(collection, path.model_name.as_deref())?;
    let templates: Vec<_> = model
        .templates
        .iter()
        .map(|t| json!({ "name": t.name, "ordinal": t.ord }))
        .collect();
    let count = templates.len();
    Ok(OperationResult::ok(format!("Listed {count} templates from model '{}'", model.name))
        .with_data(json!({ "templates": templates })))
}

fn list_cards(collection: &Collection, path: &AnkiPath) -> Result<OperationResult> {
    let model_filter = match &path.model_name {
        Some(name) => Some(get_model(collection, Some(name))?.id),
        None => None,
    };
    let cards: Vec<_> = collection
        .cards
        .values()
        .filter(|c| match model_filter {
            Some(model_id) => collection.notes.get(&c.note_id).map(|n| n.model_id) == Some(model_id),
            None => true,
        })
        .map(|c| json!({ "id": c.id.0, "note_id": c.note_id.0 }))
        .collect();
    let count = cards.len();
    Ok(OperationResult::ok(format!("Listed {count} cards")).with_data(json!({ "cards": cards })))
}

fn list_notes(collection: &Collection, path: &AnkiPath, limit: i64) -> Result<OperationResult> {
    let model_filter = match &path.model_name {
        Some(name) => Some(get_model(collection, Some(name))?.id),
        None => None,
    };
    let mut raw: Vec<_> = collection
        .notes
        .values()
        .filter(|n| model_filter.map(|id| n.model_id == id).unwrap_or(true))
        .collect();
    raw.sort_by_key(|n| n.id.0);
    if limit > 0 {
        raw.truncate(limit as usize);
    }

    let mut notes = Vec::new();
    for note in raw {
        let model = collection.models.get(&note.model_id);
        let Some(model) = model else { continue };
        let fields: BTreeMap<String, String> = model
            .fields
            .iter()
            .map(|f| {
                let value = note.fields.get(&f.name).map(String::as_str).unwrap_or("");
                (f.name.clone(), truncate_field(value))
            })
            .collect();
        notes.push(json!({ "id": note.id.0, "model": model.name, "fields": fields }));
    }

    let count = notes.len();
    let suffix = if limit > 0 { format!(" (limited to {limit})") } else { String::new() };
    Ok(OperationResult::ok(format!("Listed {count} notes{suffix}")).with_data(json!({ "notes": notes })))
}
