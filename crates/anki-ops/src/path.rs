use crate::error::{Error, Result};

/// The kind of collection (or item) a path resolves to, mirroring
/// `anki_terminal.ops.anki_path.AnkiPath`'s `object_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Models,
    Model,
    Fields,
    Templates,
    Css,
    Example,
    Cards,
    Notes,
}

/// A parsed path of the form
/// `/ (models (/<M> (/ (fields|templates) (/<I>)? | /css | /example)?)? | cards (/<M>)? | notes (/<M>)?)`.
#[derive(Debug, Clone)]
pub struct AnkiPath {
    pub object_type: ObjectType,
    pub model_name: Option<String>,
    pub item_name: Option<String>,
}

impl AnkiPath {
    pub fn parse(path: &str) -> Result<Self> {
        let segments: Vec<&str> = path.split('/').collect();
        // path must start with '/', so segments[0] == ""
        if segments.first() != Some(&"") || segments.len() < 2 {
            return Err(Error::InvalidPath(path.to_string()));
        }
        let segments = &segments[1..];

        match segments[0] {
            "models" => Self::parse_models(path, &segments[1..]),
            "cards" => Self::parse_filtered(path, &segments[1..], ObjectType::Cards),
            "notes" => Self::parse_filtered(path, &segments[1..], ObjectType::Notes),
            _ => Err(Error::InvalidPath(path.to_string())),
        }
    }

    fn parse_filtered(path: &str, rest: &[&str], object_type: ObjectType) -> Result<Self> {
        match rest {
            [] => Ok(AnkiPath {
                object_type,
                model_name: None,
                item_name: None,
            }),
            [model] if !model.is_empty() => Ok(AnkiPath {
                object_type,
                model_name: Some(model.to_string()),
                item_name: None,
            }),
            _ => Err(Error::InvalidPath(path.to_string())),
        }
    }

    fn parse_models(path: &str, rest: &[&str]) -> Result<Self> {
        match rest {
            [] => Ok(AnkiPath {
                object_type: ObjectType::Models,
                model_name: None,
                item_name: None,
            }),
            [model] if !model.is_empty() => Ok(AnkiPath {
                object_type: ObjectType::Model,
                model_name: Some(model.to_string()),
                item_name: None,
            }),
            [model, "fields"] => Ok(AnkiPath {
                object_type: ObjectType::Fields,
                model_name: Some(model.to_string()),
                item_name: None,
            }),
            [model, "fields", item] => Ok(AnkiPath {
                object_type: ObjectType::Fields,
                model_name: Some(model.to_string()),
                item_name: Some(item.to_string()),
            }),
            [model, "templates"] => Ok(AnkiPath {
                object_type: ObjectType::Templates,
                model_name: Some(model.to_string()),
                item_name: None,
            }),
            [model, "templates", item] => Ok(AnkiPath {
                object_type: ObjectType::Templates,
                model_name: Some(model.to_string()),
                item_name: Some(item.to_string()),
            }),
            [model, "css"] => Ok(AnkiPath {
                object_type: ObjectType::Css,
                model_name: Some(model.to_string()),
                item_name: None,
            }),
            [model, "example"] => Ok(AnkiPath {
                object_type: ObjectType::Example,
                model_name: Some(model.to_string()),
                item_name: None,
            }),
            _ => Err(Error::InvalidPath(path.to_string())),
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(
            self.object_type,
            ObjectType::Models | ObjectType::Fields | ObjectType::Templates | ObjectType::Cards | ObjectType::Notes
        ) && self.item_name.is_none()
    }

    pub fn is_item(&self) -> bool {
        self.item_name.is_some() || matches!(self.object_type, ObjectType::Model | ObjectType::Css | ObjectType::Example)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_models_collection() {
        let p = AnkiPath::parse("/models").unwrap();
        assert_eq!(p.object_type, ObjectType::Models);
        assert!(p.is_collection());
    }

    #[test]
    fn parses_field_item() {
        let p = AnkiPath::parse("/models/Basic/fields/Front").unwrap();
        assert_eq!(p.object_type, ObjectType::Fields);
        assert_eq!(p.model_name.as_deref(), Some("Basic"));
        assert_eq!(p.item_name.as_deref(), Some("Front"));
        assert!(p.is_item());
    }

    #[test]
    fn parses_notes_filtered_by_model() {
        let p = AnkiPath::parse("/notes/Basic").unwrap();
        assert_eq!(p.object_type, ObjectType::Notes);
        assert_eq!(p.model_name.as_deref(), Some("Basic"));
        assert!(p.is_collection());
    }

    #[test]
    fn rejects_malformed_path() {
        assert!(AnkiPath::parse("models").is_err());
        assert!(AnkiPath::parse("/models/Basic/bogus").is_err());
    }
}
