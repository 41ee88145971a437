/// Truncates a field value to 100 characters for display, appending `"..."`
/// when truncated. Shared by `list`, `get`, and `birds-eye-view`.
pub fn truncate_field(value: &str) -> String {
    if value.chars().count() > 100 {
        let mut truncated: String = value.chars().take(97).collect();
        truncated.push_str("...");
        truncated
    } else {
        value.to_string()
    }
}
