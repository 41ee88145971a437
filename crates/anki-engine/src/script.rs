use crate::error::{Error, Result};
use regex::Regex;
use std::collections::BTreeMap;

/// Expands `${name}`/`${name:default}` references in one line against a
/// variable map. Mirrors `ScriptManager.expand_variables`.
pub fn expand_variables(line: &str, variables: &BTreeMap<String, String>) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}").expect("static variable-reference pattern is valid");

    let mut expanded = String::with_capacity(line.len());
    let mut last_end = 0;
    for caps in re.captures_iter(line) {
        let whole = caps.get(0).expect("capture 0 always matches");
        expanded.push_str(&line[last_end..whole.start()]);

        let var_spec = &caps[1];
        let (var_name, default) = match var_spec.split_once(':') {
            Some((name, default)) => (name, Some(default)),
            None => (var_spec, None),
        };

        if var_name.is_empty() || !var_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::InvalidVariableName(var_name.to_string()));
        }

        match variables.get(var_name) {
            Some(value) => expanded.push_str(value),
            None => match default {
                Some(default) => expanded.push_str(default),
                None => return Err(Error::MissingVariable(var_name.to_string())),
            },
        }

        last_end = whole.end();
    }
    expanded.push_str(&line[last_end..]);
    Ok(expanded)
}

/// Parses a script's text into the ordered list of CLI invocations it
/// expands to: blank lines and lines starting with `#` are dropped, every
/// remaining line has its variables expanded. Mirrors `ScriptManager.read_script`.
pub fn parse_script(contents: &str, variables: &BTreeMap<String, String>) -> Result<Vec<String>> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| expand_variables(line, variables))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_required_and_defaulted_variables() {
        let mut variables = BTreeMap::new();
        variables.insert("model".to_string(), "Basic".to_string());
        let expanded = expand_variables("add-field --model ${model} --field-name ${field:Notes}", &variables).unwrap();
        assert_eq!(expanded, "add-field --model Basic --field-name Notes");
    }

    #[test]
    fn missing_required_variable_is_an_error() {
        let err = expand_variables("${missing}", &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, Error::MissingVariable(ref name) if name == "missing"));
    }

    #[test]
    fn rejects_invalid_variable_names() {
        let err = expand_variables("${bad-name}", &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidVariableName(_)));
    }

    #[test]
    fn parse_script_skips_blank_and_comment_lines() {
        let script = "# a comment\n\nlist --path /models\n  count --path /notes  \n";
        let lines = parse_script(script, &BTreeMap::new()).unwrap();
        assert_eq!(lines, vec!["list --path /models", "count --path /notes"]);
    }
}
