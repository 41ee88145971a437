use anki_persistence::Change;

/// Outcome of one operation run: a human-facing message, an optional
/// structured payload for the printer, and the changes to append to the
/// run's `ChangeLog`.
#[derive(Debug, Clone)]
pub struct OperationResult {
    pub success: bool,
    pub message: String,
    pub data: Option<serde_json::Value>,
    pub changes: Vec<Change>,
}

impl OperationResult {
    pub fn ok(message: impl Into<String>) -> Self {
        OperationResult {
            success: true,
            message: message.into(),
            data: None,
            changes: Vec::new(),
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_changes(mut self, changes: Vec<Change>) -> Self {
        self.changes = changes;
        self
    }
}
