use crate::config::ConfigArgument;
use crate::error::Result;
use anki_model::{Model, Note, NoteId};
use std::collections::BTreeMap;

/// A pluggable strategy that derives new field values for notes of a given
/// model. Grounded on `FieldPopulator` (`anki_terminal/populators/base.py`).
pub trait FieldPopulator {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn config_arguments(&self) -> &[ConfigArgument];
    fn target_fields(&self) -> Vec<String>;
    fn supports_batching(&self) -> bool {
        false
    }

    /// Checks config completeness and that every target field exists in
    /// `model`, then runs implementation-specific checks.
    fn validate(&self, model: &Model) -> Result<()>;

    /// Returns only the fields that should change; unchanged fields are
    /// omitted rather than echoed back.
    fn populate(&self, note: &Note) -> Result<BTreeMap<String, String>>;

    /// Only callable when `supports_batching()`. Implementations must skip
    /// (not abort on) notes missing required source fields.
    fn populate_batch(&self, notes: &[&Note]) -> Result<BTreeMap<NoteId, BTreeMap<String, String>>> {
        let _ = notes;
        Err(crate::error::Error::BatchingUnsupported(self.name().to_string()))
    }
}
