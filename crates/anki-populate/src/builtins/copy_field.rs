use crate::config::{Config, ConfigArgument};
use crate::error::{Error, Result};
use crate::populator::FieldPopulator;
use anki_model::{Model, Note};
use std::collections::BTreeMap;

/// Copies one field's value verbatim into another. The simplest populator in
/// the original source (`copy_field.py`); grounds the default,
/// non-batching path of the trait.
pub struct CopyFieldPopulator {
    config: Config,
    args: Vec<ConfigArgument>,
}

impl CopyFieldPopulator {
    pub fn new(supplied: BTreeMap<String, serde_json::Value>) -> Result<Self> {
        let args = vec![
            ConfigArgument::required("source_field", "Field to copy from"),
            ConfigArgument::required("target_field", "Field to copy into"),
        ];
        let config = Config::build(&args, supplied)?;
        Ok(CopyFieldPopulator { config, args })
    }
}

impl FieldPopulator for CopyFieldPopulator {
    fn name(&self) -> &str {
        "copy-field"
    }

    fn description(&self) -> &str {
        "Copy one field's value into another"
    }

    fn config_arguments(&self) -> &[ConfigArgument] {
        &self.args
    }

    fn target_fields(&self) -> Vec<String> {
        vec![self.config.str("target_field").unwrap_or_default().to_string()]
    }

    fn validate(&self, model: &Model) -> Result<()> {
        let source = self.config.str("source_field").unwrap_or_default();
        if model.field_by_name(source).is_none() {
            return Err(Error::SourceFieldNotInModel(source.to_string()));
        }
        let target = self.config.str("target_field").unwrap_or_default();
        if model.field_by_name(target).is_none() {
            return Err(Error::TargetFieldNotInModel(target.to_string()));
        }
        Ok(())
    }

    fn populate(&self, note: &Note) -> Result<BTreeMap<String, String>> {
        let source = self.config.str("source_field").unwrap_or_default();
        let target = self.config.str("target_field").unwrap_or_default();
        let value = note
            .fields
            .get(source)
            .ok_or_else(|| Error::SourceFieldNotInNote(source.to_string()))?;
        let mut out = BTreeMap::new();
        out.insert(target.to_string(), value.clone());
        Ok(out)
    }
}
