use crate::config::{Config, ConfigArgument};
use crate::error::{Error, Result};
use crate::populator::FieldPopulator;
use anki_model::{Model, Note, NoteId};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Sends a batch of source-field sentences to an LLM in a single call and
/// writes back translation/breakdown/nuance fields. `supports_batching` is
/// `true` and `populate_batch` issues exactly one external request per
/// batch, never per note, matching the spec's "single call for a batch"
/// contract.
pub struct JapLlmSentenceAnalyzerPopulator {
    config: Config,
    args: Vec<ConfigArgument>,
    client: reqwest::blocking::Client,
}

#[derive(Deserialize)]
struct Analysis {
    translation: String,
    breakdown: String,
    nuance: String,
}

impl JapLlmSentenceAnalyzerPopulator {
    pub fn new(supplied: BTreeMap<String, serde_json::Value>) -> Result<Self> {
        let args = vec![
            ConfigArgument::required("source_field", "Field containing the sentence to analyze"),
            ConfigArgument::required("translation_field", "Field to write the translation into"),
            ConfigArgument::required("breakdown_field", "Field to write the word breakdown into"),
            ConfigArgument::required("nuance_field", "Field to write the nuance explanation into"),
            ConfigArgument::optional("model", "LLM model name", serde_json::json!("gpt-4o-mini")),
        ];
        let config = Config::build(&args, supplied)?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::External(e.to_string()))?;
        Ok(JapLlmSentenceAnalyzerPopulator { config, args, client })
    }

    fn api_key(&self) -> Result<String> {
        self.config
            .str("api_key")
            .map(String::from)
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| Error::External("no OPENAI_API_KEY configured".to_string()))
    }
}

impl FieldPopulator for JapLlmSentenceAnalyzerPopulator {
    fn name(&self) -> &str {
        "jap-llm-sentence-analyzer"
    }

    fn description(&self) -> &str {
        "Analyze a Japanese sentence via an LLM: translation, breakdown, nuance"
    }

    fn config_arguments(&self) -> &[ConfigArgument] {
        &self.args
    }

    fn target_fields(&self) -> Vec<String> {
        vec![
            self.config.str("translation_field").unwrap_or_default().to_string(),
            self.config.str("breakdown_field").unwrap_or_default().to_string(),
            self.config.str("nuance_field").unwrap_or_default().to_string(),
        ]
    }

    fn supports_batching(&self) -> bool {
        true
    }

    fn validate(&self, model: &Model) -> Result<()> {
        let source = self.config.str("source_field").unwrap_or_default();
        if model.field_by_name(source).is_none() {
            return Err(Error::SourceFieldNotInModel(source.to_string()));
        }
        for target in self.target_fields() {
            if model.field_by_name(&target).is_none() {
                return Err(Error::TargetFieldNotInModel(target));
            }
        }
        Ok(())
    }

    fn populate(&self, note: &Note) -> Result<BTreeMap<String, String>> {
        let mut updates = self.populate_batch(&[note])?;
        Ok(updates.remove(&note.id).unwrap_or_default())
    }

    fn populate_batch(&self, notes: &[&Note]) -> Result<BTreeMap<NoteId, BTreeMap<String, String>>> {
        let source = self.config.str("source_field").unwrap_or_default();
        let api_key = self.api_key()?;
        let model_name = self.config.str("model").unwrap_or("gpt-4o-mini");

        let sentences: Vec<(NoteId, &str)> = notes
            .iter()
            .filter_map(|n| n.fields.get(source).map(|v| (n.id, v.as_str())))
            .collect();
        if sentences.is_empty() {
            return Ok(BTreeMap::new());
        }

        let body = serde_json::json!({
            "model": model_name,
            "sentences": sentences.iter().map(|(id, s)| serde_json::json!({"id": id.0, "text": s})).collect::<Vec<_>>(),
        });

        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .map_err(|e| Error::External(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Error::External(format!("LLM request failed with status {}", response.status())));
        }
        let analyses: BTreeMap<i64, Analysis> = response
            .json()
            .map_err(|e| Error::External(e.to_string()))?;

        let translation_field = self.config.str("translation_field").unwrap_or_default();
        let breakdown_field = self.config.str("breakdown_field").unwrap_or_default();
        let nuance_field = self.config.str("nuance_field").unwrap_or_default();

        let mut updates = BTreeMap::new();
        for (note_id, _) in sentences {
            if let Some(analysis) = analyses.get(&note_id.0) {
                let mut fields = BTreeMap::new();
                fields.insert(translation_field.to_string(), analysis.translation.clone());
                fields.insert(breakdown_field.to_string(), analysis.breakdown.clone());
                fields.insert(nuance_field.to_string(), analysis.nuance.clone());
                updates.insert(note_id, fields);
            }
        }
        Ok(updates)
    }
}
