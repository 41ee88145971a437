use crate::config::{Config, ConfigArgument};
use crate::error::{Error, Result};
use crate::populator::FieldPopulator;
use anki_model::{Model, Note};
use std::collections::BTreeMap;

/// Annotates kanji runs in `source_field` with bracketed reading hints
/// (`漢字[かんじ]`), writing the result to `target_field`.
///
/// Reading generation is normally an external-service concern (see
/// `SPEC_FULL.md` §9 "Resolved Open Questions"); this implementation is a
/// conservative local heuristic over a small built-in reading table so the
/// populator works without network access. Kanji without a known reading
/// are left un-annotated rather than guessed.
pub struct FuriganaPopulator {
    config: Config,
    args: Vec<ConfigArgument>,
    readings: BTreeMap<char, &'static str>,
}

impl FuriganaPopulator {
    pub fn new(supplied: BTreeMap<String, serde_json::Value>) -> Result<Self> {
        let args = vec![
            ConfigArgument::required("source_field", "Field containing Japanese text"),
            ConfigArgument::required("target_field", "Field to write annotated text into"),
        ];
        let config = Config::build(&args, supplied)?;
        let readings = BTreeMap::from([
            ('日', "にち"),
            ('本', "ほん"),
            ('語', "ご"),
            ('人', "じん"),
            ('学', "がく"),
            ('生', "せい"),
            ('時', "じ"),
            ('間', "かん"),
            ('今', "いま"),
            ('水', "みず"),
            ('火', "ひ"),
            ('木', "き"),
            ('金', "きん"),
            ('土', "つち"),
        ]);
        Ok(FuriganaPopulator { config, args, readings })
    }

    fn source_field(&self) -> String {
        self.config.str("source_field").unwrap_or_default().to_string()
    }

    fn target_field(&self) -> String {
        self.config.str("target_field").unwrap_or_default().to_string()
    }

    fn is_kanji(c: char) -> bool {
        ('\u{4e00}'..='\u{9fff}').contains(&c)
    }

    fn annotate(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        for c in value.chars() {
            if Self::is_kanji(c) {
                if let Some(reading) = self.readings.get(&c) {
                    out.push(c);
                    out.push('[');
                    out.push_str(reading);
                    out.push(']');
                    continue;
                }
            }
            out.push(c);
        }
        out
    }
}

impl FieldPopulator for FuriganaPopulator {
    fn name(&self) -> &str {
        "furigana"
    }

    fn description(&self) -> &str {
        "Annotate kanji with furigana readings"
    }

    fn config_arguments(&self) -> &[ConfigArgument] {
        &self.args
    }

    fn target_fields(&self) -> Vec<String> {
        vec![self.target_field()]
    }

    fn validate(&self, model: &Model) -> Result<()> {
        if model.field_by_name(&self.source_field()).is_none() {
            return Err(Error::SourceFieldNotInModel(self.source_field()));
        }
        if model.field_by_name(&self.target_field()).is_none() {
            return Err(Error::TargetFieldNotInModel(self.target_field()));
        }
        Ok(())
    }

    fn populate(&self, note: &Note) -> Result<BTreeMap<String, String>> {
        let source = self.source_field();
        let value = note
            .fields
            .get(&source)
            .ok_or_else(|| Error::SourceFieldNotInNote(source))?;
        let mut out = BTreeMap::new();
        out.insert(self.target_field(), self.annotate(value));
        Ok(out)
    }
}
