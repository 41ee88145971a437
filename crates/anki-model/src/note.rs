use crate::error::{Error, Result};
use crate::ids::{ModelId, NoteId, Usn};
use crate::model::{Model, FIELD_SEPARATOR};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub guid: String,
    pub model_id: ModelId,
    pub mod_time_secs: i64,
    pub usn: Usn,
    pub tags: Vec<String>,
    /// Field name -> value. Keys must exactly equal the owning model's field
    /// name set (invariant 1); enforced by `Note::new` and `set_fields`.
    pub fields: BTreeMap<String, String>,
    pub sort_field_index: u16,
    pub checksum: i64,
    pub flags: u32,
    pub data: String,
}

impl Note {
    pub fn new(
        id: NoteId,
        guid: impl Into<String>,
        model: &Model,
        fields: BTreeMap<String, String>,
    ) -> Result<Self> {
        let note = Note {
            id,
            guid: guid.into(),
            model_id: model.id,
            mod_time_secs: 0,
            usn: Usn(-1),
            tags: Vec::new(),
            fields,
            sort_field_index: 0,
            checksum: 0,
            flags: 0,
            data: String::new(),
        };
        note.validate_against(model)?;
        Ok(note)
    }

    pub fn validate_against(&self, model: &Model) -> Result<()> {
        let expected: Vec<String> = model.field_names().into_iter().map(String::from).collect();
        let mut got: Vec<String> = self.fields.keys().cloned().collect();
        got.sort();
        let mut expected_sorted = expected.clone();
        expected_sorted.sort();
        if got != expected_sorted {
            return Err(Error::FieldKeyMismatch {
                model: model.name.clone(),
                expected,
                got,
            });
        }
        for value in self.fields.values() {
            if value.contains(FIELD_SEPARATOR) {
                return Err(Error::ValueContainsSeparator);
            }
        }
        Ok(())
    }

    /// Values joined in model field order, ready for `notes.flds`.
    pub fn packed_fields(&self, model: &Model) -> String {
        model
            .fields
            .iter()
            .map(|f| self.fields.get(&f.name).map(String::as_str).unwrap_or(""))
            .collect::<Vec<_>>()
            .join(&FIELD_SEPARATOR.to_string())
    }

    /// Splits a packed `notes.flds` value positionally against a model's
    /// field list (v2 semantics) or by explicit ordinal (v21, handled by the
    /// caller re-sorting `model.fields` by `ord` first — this function is
    /// version-agnostic once fields are already ordinal-sorted).
    pub fn unpack_fields(packed: &str, model: &Model) -> BTreeMap<String, String> {
        let values: Vec<&str> = packed.split(FIELD_SEPARATOR).collect();
        let mut out = BTreeMap::new();
        for (i, field) in model.fields.iter().enumerate() {
            out.insert(field.name.clone(), values.get(i).copied().unwrap_or("").to_string());
        }
        out
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.tags.iter().any(|t| t == &tag) {
            false
        } else {
            self.tags.push(tag);
            true
        }
    }
}
