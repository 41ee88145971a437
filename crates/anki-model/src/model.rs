use crate::error::{Error, Result};
use crate::ids::{DeckId, ModelId, Usn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Separator that joins a note's field values in the `notes.flds` column.
/// The sole canonical separator for both v2 and v21 schemas; tab-separated
/// encodings seen in places in the original source are legacy leftovers and
/// are never produced by this crate.
pub const FIELD_SEPARATOR: char = '\u{1f}';

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub ord: u16,
    pub font: String,
    #[serde(rename = "size")]
    pub font_size: u32,
    pub rtl: bool,
    pub sticky: bool,
    #[serde(rename = "plainText")]
    pub plain_text: bool,
    pub description: String,
    pub collapsed: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, ord: u16) -> Self {
        Field {
            name: name.into(),
            ord,
            font: "Arial".to_string(),
            font_size: 20,
            rtl: false,
            sticky: false,
            plain_text: false,
            description: String::new(),
            collapsed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub ord: u16,
    #[serde(rename = "qfmt")]
    pub question_format: String,
    #[serde(rename = "afmt")]
    pub answer_format: String,
    #[serde(rename = "bfont")]
    pub browser_font_name: Option<String>,
    #[serde(rename = "bsize")]
    pub browser_font_size: Option<u32>,
}

impl Template {
    pub fn new(name: impl Into<String>, ord: u16, qfmt: impl Into<String>, afmt: impl Into<String>) -> Self {
        Template {
            name: name.into(),
            ord,
            question_format: qfmt.into(),
            answer_format: afmt.into(),
            browser_font_name: None,
            browser_font_size: None,
        }
    }
}

/// Standard (0) vs. cloze (1) note type, matching the `col.models[*].type`
/// integer the persistence loaders read directly. Serializes as that bare
/// integer rather than serde's default variant-name string, so a model
/// lowered back through `db_operations::lower` round-trips through the same
/// `"type"` key the loaders read it from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i64)]
pub enum ModelKind {
    Standard = 0,
    Cloze = 1,
}

impl Serialize for ModelKind {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i64(*self as i64)
    }
}

impl<'de> Deserialize<'de> for ModelKind {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = i64::deserialize(deserializer)?;
        Ok(if value == 1 { ModelKind::Cloze } else { ModelKind::Standard })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: ModelId,
    pub name: String,
    #[serde(rename = "flds")]
    pub fields: Vec<Field>,
    #[serde(rename = "tmpls")]
    pub templates: Vec<Template>,
    pub css: String,
    #[serde(rename = "did")]
    pub default_deck_id: DeckId,
    #[serde(rename = "mod")]
    pub mod_time_secs: i64,
    #[serde(rename = "type")]
    pub kind: ModelKind,
    pub usn: Usn,
    #[serde(rename = "vers")]
    pub version: u32,
    #[serde(rename = "latexPre")]
    pub latex_pre: Option<String>,
    #[serde(rename = "latexPost")]
    pub latex_post: Option<String>,
    #[serde(rename = "latexsvg")]
    pub latex_svg: bool,
    pub tags: Option<Vec<String>>,
}

impl Model {
    /// Builds a fresh model, validating field/template name uniqueness and
    /// contiguous field ordinals (invariants 3 and 6).
    pub fn new(
        id: ModelId,
        name: impl Into<String>,
        fields: Vec<Field>,
        templates: Vec<Template>,
        css: impl Into<String>,
        default_deck_id: DeckId,
    ) -> Result<Self> {
        let model = Model {
            id,
            name: name.into(),
            fields,
            templates,
            css: css.into(),
            default_deck_id,
            mod_time_secs: 0,
            kind: ModelKind::Standard,
            usn: Usn(-1),
            version: 0,
            latex_pre: None,
            latex_post: None,
            latex_svg: false,
            tags: None,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(Error::EmptyFieldList);
        }
        let mut seen = HashSet::new();
        for f in &self.fields {
            if !seen.insert(f.name.as_str()) {
                return Err(Error::DuplicateFieldName {
                    model: self.name.clone(),
                    field: f.name.clone(),
                });
            }
        }
        let mut ords: Vec<u16> = self.fields.iter().map(|f| f.ord).collect();
        ords.sort_unstable();
        for (expected, got) in (0u16..).zip(ords) {
            if expected != got {
                return Err(Error::NonContiguousFieldOrdinals(self.name.clone()));
            }
        }
        let mut seen_t = HashSet::new();
        for t in &self.templates {
            if !seen_t.insert(t.name.as_str()) {
                return Err(Error::DuplicateTemplateName {
                    model: self.name.clone(),
                    template: t.name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Appends a field at the next contiguous ordinal. Used by `add-field`.
    pub fn add_field(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.fields.iter().any(|f| f.name == name) {
            return Err(Error::DuplicateFieldName {
                model: self.name.clone(),
                field: name,
            });
        }
        let ord = self.fields.len() as u16;
        self.fields.push(Field::new(name, ord));
        Ok(())
    }

    pub fn rename_field(&mut self, old: &str, new: &str) -> Result<()> {
        if old == new {
            return Ok(());
        }
        if self.fields.iter().any(|f| f.name == new) {
            return Err(Error::DuplicateFieldName {
                model: self.name.clone(),
                field: new.to_string(),
            });
        }
        let field = self
            .fields
            .iter_mut()
            .find(|f| f.name == old)
            .ok_or_else(|| Error::DuplicateFieldName {
                model: self.name.clone(),
                field: old.to_string(),
            })?;
        field.name = new.to_string();
        Ok(())
    }
}
