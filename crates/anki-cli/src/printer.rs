use anki_ops::OperationResult;
use comfy_table::{presets::UTF8_FULL, Table};
use serde_json::Value as Json;

/// Renders an operation's outcome to stdout/stderr. Mirrors `OperationPrinter`
/// (`anki_terminal/ops/printer.py`): `print_result` for a successful run,
/// `print_error` for a message that aborted the run before producing one.
pub trait ResultPrinter {
    fn print_result(&self, result: &OperationResult);
    fn print_error(&self, message: &str);
}

fn result_to_json(result: &OperationResult) -> Json {
    serde_json::json!({
        "success": result.success,
        "message": result.message,
        "data": result.data,
    })
}

pub struct JsonPrinter {
    pub pretty: bool,
}

impl ResultPrinter for JsonPrinter {
    fn print_result(&self, result: &OperationResult) {
        let value = result_to_json(result);
        let rendered = if self.pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };
        println!("{}", rendered.unwrap_or_else(|e| format!(r#"{{"error": "failed to render result: {e}"}}"#)));
    }

    fn print_error(&self, message: &str) {
        let value = serde_json::json!({ "success": false, "error": message });
        let rendered = if self.pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };
        eprintln!("{}", rendered.unwrap_or_else(|_| format!("error: {message}")));
    }
}

pub struct HumanPrinter;

impl ResultPrinter for HumanPrinter {
    fn print_result(&self, result: &OperationResult) {
        println!("success: {}", result.success);
        println!("message: {}", result.message);
        if let Some(data) = &result.data {
            println!("data:");
            println!("{}", format_value(data, 1));
        }
    }

    fn print_error(&self, message: &str) {
        eprintln!("Error: {message}");
    }
}

fn scalar(value: &Json) -> String {
    match value {
        Json::String(s) => s.clone(),
        Json::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// The common key set of a non-empty array of objects sharing every key, or
/// `None` if the array is empty, holds a non-object, or the objects' keys
/// don't line up into rectangular rows. Only a uniform shape like this is
/// worth a table; anything else falls back to the indented formatter.
fn uniform_object_keys(items: &[Json]) -> Option<Vec<String>> {
    let first = items.first()?.as_object()?;
    let keys: Vec<String> = first.keys().cloned().collect();
    let uniform = items.iter().all(|item| {
        item.as_object()
            .is_some_and(|obj| obj.len() == keys.len() && keys.iter().all(|k| obj.contains_key(k)))
    });
    uniform.then_some(keys)
}

/// Renders a uniform array of objects (e.g. a `list` result's rows) as a
/// table, matching the teacher's `comfy-table`-flavored listing output
/// (`flowctl`'s `output::print_table`).
fn render_table(items: &[Json], keys: &[String]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(keys.clone());
    for item in items {
        let obj = item.as_object().expect("uniform_object_keys already checked this");
        let row: Vec<String> = keys.iter().map(|k| scalar(obj.get(k).unwrap_or(&Json::Null))).collect();
        table.add_row(row);
    }
    table.to_string()
}

fn format_value(value: &Json, indent: usize) -> String {
    let indent_str = "  ".repeat(indent);
    match value {
        Json::Object(map) => map
            .iter()
            .map(|(k, v)| match v {
                Json::Object(_) | Json::Array(_) => format!("{indent_str}{k}:\n{}", format_value(v, indent + 1)),
                _ => format!("{indent_str}{k}: {}", scalar(v)),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Json::Array(items) => {
            if items.is_empty() {
                return format!("{indent_str}(empty list)");
            }
            if let Some(keys) = uniform_object_keys(items) {
                return render_table(items, &keys);
            }
            items
                .iter()
                .map(|item| match item {
                    Json::Object(_) => format_value(item, indent),
                    other => format!("{indent_str}- {}", scalar(other)),
                })
                .collect::<Vec<_>>()
                .join(&format!("\n{indent_str}---\n"))
        }
        other => format!("{indent_str}{}", scalar(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_value_renders_uniform_object_arrays_as_a_table() {
        let value = serde_json::json!({ "models": [{"name": "Basic"}, {"name": "Cloze"}] });
        let rendered = format_value(&value, 0);
        assert!(rendered.contains("models:"));
        assert!(rendered.contains("Basic"));
        assert!(rendered.contains("Cloze"));
    }

    #[test]
    fn format_value_falls_back_to_indented_form_for_non_uniform_lists() {
        let value = serde_json::json!(["a", "b", {"name": "Basic"}]);
        let rendered = format_value(&value, 0);
        assert!(rendered.contains("- a"));
        assert!(rendered.contains("name: Basic"));
    }
}
