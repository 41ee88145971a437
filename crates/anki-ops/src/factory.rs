use crate::error::Result;
use crate::loader::ResourceLoader;
use crate::operation::Operation;
use crate::registry::OperationRegistry;
use serde_json::Value as Json;
use std::collections::BTreeMap;

const FILE_URL_PREFIX: &str = "file://";

/// Builds an `Operation` from a three-tier argument bundle: CLI values win
/// over the resolved config file, which wins over the operation's own
/// defaults (applied later, inside `Args::build`). `file://<path>` values
/// anywhere in the merged bundle are replaced with the referenced file's
/// text contents via `loader` before the operation is constructed.
pub struct OperationFactory<'a> {
    registry: &'a OperationRegistry,
}

impl<'a> OperationFactory<'a> {
    pub fn new(registry: &'a OperationRegistry) -> Self {
        OperationFactory { registry }
    }

    pub fn build(
        &self,
        name: &str,
        cli_args: BTreeMap<String, Json>,
        config_args: BTreeMap<String, Json>,
        loader: &dyn ResourceLoader,
    ) -> Result<Box<dyn Operation>> {
        let mut merged = config_args;
        merged.extend(cli_args);

        let resolved = merged
            .into_iter()
            .map(|(k, v)| Ok((k, resolve_value(v, loader)?)))
            .collect::<Result<BTreeMap<String, Json>>>()?;

        self.registry.build(name, resolved)
    }
}

fn resolve_value(value: Json, loader: &dyn ResourceLoader) -> Result<Json> {
    match value {
        Json::String(s) => match s.strip_prefix(FILE_URL_PREFIX) {
            Some(path) => Ok(Json::String(loader.load(path)?)),
            None => Ok(Json::String(s)),
        },
        Json::Array(items) => Ok(Json::Array(
            items.into_iter().map(|v| resolve_value(v, loader)).collect::<Result<_>>()?,
        )),
        Json::Object(map) => Ok(Json::Object(
            map.into_iter()
                .map(|(k, v)| Ok((k, resolve_value(v, loader)?)))
                .collect::<Result<_>>()?,
        )),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FakeLoader {
        contents: RefCell<BTreeMap<String, String>>,
    }

    impl ResourceLoader for FakeLoader {
        fn load(&self, name: &str) -> Result<String> {
            self.contents
                .borrow()
                .get(name)
                .cloned()
                .ok_or_else(|| crate::error::Error::ResourceUnavailable {
                    name: name.to_string(),
                    reason: "not found in fake loader".to_string(),
                })
        }
    }

    #[test]
    fn resolve_value_substitutes_file_urls_in_nested_objects() {
        let mut contents = BTreeMap::new();
        contents.insert("css.txt".to_string(), ".card { color: red }".to_string());
        let loader = FakeLoader {
            contents: RefCell::new(contents),
        };

        let value = serde_json::json!({ "css": "file://css.txt", "name": "Basic" });
        let resolved = resolve_value(value, &loader).unwrap();
        assert_eq!(resolved["css"], ".card { color: red }");
        assert_eq!(resolved["name"], "Basic");
    }

    #[test]
    fn cli_args_override_config_args() {
        let registry = OperationRegistry::with_builtins();
        let factory = OperationFactory::new(&registry);
        let loader = FakeLoader {
            contents: RefCell::new(BTreeMap::new()),
        };

        let mut config_args = BTreeMap::new();
        config_args.insert("path".to_string(), serde_json::json!("/models"));
        let mut cli_args = BTreeMap::new();
        cli_args.insert("path".to_string(), serde_json::json!("/notes"));

        let op = factory.build("list", cli_args, config_args, &loader).unwrap();
        assert_eq!(op.name(), "list");
    }
}
