use crate::error::{Error, Result};
use serde_json::Value as Json;
use std::collections::BTreeMap;

/// Declares one configuration key a populator accepts, mirroring
/// `PopulatorConfigArgument` (`anki_terminal/populators/base.py`).
#[derive(Debug, Clone)]
pub struct ConfigArgument {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
    pub default: Option<Json>,
}

impl ConfigArgument {
    pub fn required(name: &'static str, description: &'static str) -> Self {
        ConfigArgument {
            name,
            description,
            required: true,
            default: None,
        }
    }

    pub fn optional(name: &'static str, description: &'static str, default: Json) -> Self {
        ConfigArgument {
            name,
            description,
            required: false,
            default: Some(default),
        }
    }
}

/// A resolved populator configuration: declared arguments applied against
/// caller-supplied values, with defaults filled in for missing optional keys.
#[derive(Debug, Clone, Default)]
pub struct Config {
    values: BTreeMap<String, Json>,
}

impl Config {
    pub fn build(args: &[ConfigArgument], mut supplied: BTreeMap<String, Json>) -> Result<Self> {
        for arg in args {
            if arg.required && !supplied.contains_key(arg.name) {
                return Err(Error::MissingConfigArgument(arg.name.to_string()));
            }
            if !supplied.contains_key(arg.name) {
                if let Some(default) = &arg.default {
                    supplied.insert(arg.name.to_string(), default.clone());
                }
            }
        }
        Ok(Config { values: supplied })
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Json::as_str)
    }

    pub fn str_list(&self, key: &str) -> Vec<String> {
        self.values
            .get(key)
            .and_then(Json::as_array)
            .map(|a| a.iter().filter_map(|v| v.as_str().map(String::from)).collect())
            .unwrap_or_default()
    }
}
