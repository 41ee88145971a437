use crate::error::{Error, Result};
use serde_json::Value as Json;
use std::collections::BTreeMap;

/// Declares one argument an operation accepts, mirroring `OperationArgument`
/// (`anki_terminal/ops/op_base.py`).
#[derive(Debug, Clone)]
pub struct OperationArgument {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
    pub default: Option<Json>,
}

impl OperationArgument {
    pub fn required(name: &'static str, description: &'static str) -> Self {
        OperationArgument {
            name,
            description,
            required: true,
            default: None,
        }
    }

    pub fn optional(name: &'static str, description: &'static str, default: Json) -> Self {
        OperationArgument {
            name,
            description,
            required: false,
            default: Some(default),
        }
    }

    /// An optional argument with no default value at all (the key is simply
    /// absent when not supplied), for arguments like `model` whose "default"
    /// is resolver behavior (the collection's sole model) rather than a
    /// literal value.
    pub fn optional_no_default(name: &'static str, description: &'static str) -> Self {
        OperationArgument {
            name,
            description,
            required: false,
            default: None,
        }
    }
}

/// A resolved set of operation arguments: declared `arguments` applied
/// against caller-supplied values, with defaults filled in for absent
/// optional keys and `MissingArgument` raised for absent required ones.
#[derive(Debug, Clone, Default)]
pub struct Args {
    values: BTreeMap<String, Json>,
}

impl Args {
    pub fn build(schema: &[OperationArgument], mut supplied: BTreeMap<String, Json>) -> Result<Self> {
        for arg in schema {
            if arg.required && !supplied.contains_key(arg.name) {
                return Err(Error::MissingArgument(arg.name.to_string()));
            }
            if !supplied.contains_key(arg.name) {
                if let Some(default) = &arg.default {
                    supplied.insert(arg.name.to_string(), default.clone());
                }
            }
        }
        Ok(Args { values: supplied })
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Json::as_str)
    }

    pub fn string(&self, key: &str) -> String {
        self.str(key).unwrap_or_default().to_string()
    }

    pub fn i64(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(Json::as_i64)
    }

    pub fn bool(&self, key: &str) -> bool {
        self.values.get(key).and_then(Json::as_bool).unwrap_or(false)
    }

    pub fn str_list(&self, key: &str) -> Vec<String> {
        self.values
            .get(key)
            .and_then(Json::as_array)
            .map(|a| a.iter().filter_map(|v| v.as_str().map(String::from)).collect())
            .unwrap_or_default()
    }

    pub fn str_map(&self, key: &str) -> BTreeMap<String, String> {
        self.values
            .get(key)
            .and_then(Json::as_object)
            .map(|m| {
                m.iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn raw_map(&self, key: &str) -> BTreeMap<String, Json> {
        self.values
            .get(key)
            .and_then(Json::as_object)
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }
}
