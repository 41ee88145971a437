use crate::error::Result;
use anki_ops::ResourceLoader;
use serde_json::Value as Json;
use std::collections::BTreeMap;
use std::path::Path;

/// Keys that, instead of being passed through literally, name a template
/// resource whose contents replace them under the listed target key.
/// Mirrors `ConfigManager.load_config`'s handling of `question_format_file`,
/// `answer_format_file`, and `css_file`.
const TEMPLATE_FILE_KEYS: &[(&str, &str)] = &[
    ("question_format_file", "question_format"),
    ("answer_format_file", "answer_format"),
    ("css_file", "css"),
];

/// Loads a JSON config file mapping argument names to values, resolving any
/// `*_file` template keys through `loader`. The generic `file://<path>`
/// substitution (any argument value) happens later, in
/// `anki_ops::OperationFactory::build`.
pub fn load_config(path: impl AsRef<Path>, loader: &dyn ResourceLoader) -> Result<BTreeMap<String, Json>> {
    let contents = std::fs::read_to_string(path)?;
    let mut map: serde_json::Map<String, Json> = serde_json::from_str(&contents)?;

    for (file_key, target_key) in TEMPLATE_FILE_KEYS {
        if let Some(Json::String(name)) = map.remove(*file_key) {
            let contents = loader.load(&name)?;
            map.insert(target_key.to_string(), Json::String(contents));
        }
    }

    Ok(map.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::FsResourceLoader;

    #[test]
    fn resolves_template_file_keys() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("q.html"), "{{Front}}").unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(
            &config_path,
            r#"{"model": "Basic", "question_format_file": "q.html"}"#,
        )
        .unwrap();

        let loader = FsResourceLoader::new(vec![dir.path().to_path_buf()]);
        let config = load_config(&config_path, &loader).unwrap();
        assert_eq!(config["model"], "Basic");
        assert_eq!(config["question_format"], "{{Front}}");
        assert!(!config.contains_key("question_format_file"));
    }
}
