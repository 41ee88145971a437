use crate::changelog::Change;
use crate::error::Result;
use anki_model::FIELD_SEPARATOR;

/// A single row-level mutation against the extracted SQLite database.
/// Grounded on `DBOperation`/`DBOperationGenerator`
/// (`anki_terminal/persistence/db_operations.py`), with `Where` narrowed to
/// the single-column-equality shape every lowering rule actually needs.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOp {
    UpdateCol {
        column: &'static str,
        json_value: String,
    },
    UpdateNoteFields {
        note_id: i64,
        flds: String,
    },
    MigrateNote {
        note_id: i64,
        target_model_id: i64,
        flds: String,
    },
    UpdateNoteTags {
        note_id: i64,
        tags: String,
    },
    MoveCard {
        card_id: i64,
        deck_id: i64,
    },
    DeleteNote {
        note_id: i64,
    },
    DeleteCard {
        card_id: i64,
    },
}

fn join_fields(fields: &std::collections::BTreeMap<String, String>) -> String {
    fields
        .values()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(&FIELD_SEPARATOR.to_string())
}

/// Lowers one [`Change`] into the row operations that realize it, per the
/// table in `SPEC_FULL.md` §4.6.
pub fn lower(change: &Change) -> Result<Vec<RowOp>> {
    let op = match change {
        Change::ModelUpdated { models } => {
            let map: serde_json::Map<String, serde_json::Value> = models
                .iter()
                .map(|(id, model)| (id.0.to_string(), serde_json::to_value(model).unwrap()))
                .collect();
            RowOp::UpdateCol {
                column: "models",
                json_value: serde_json::Value::Object(map).to_string(),
            }
        }
        Change::NoteFieldsUpdated { note_id, fields, .. } => RowOp::UpdateNoteFields {
            note_id: note_id.0,
            flds: join_fields(fields),
        },
        Change::NoteMigrated {
            note_id,
            target_model_id,
            fields,
            ..
        } => RowOp::MigrateNote {
            note_id: note_id.0,
            target_model_id: target_model_id.0,
            flds: join_fields(fields),
        },
        Change::NoteTagsUpdated { note_id, tags, .. } => RowOp::UpdateNoteTags {
            note_id: note_id.0,
            tags: tags.join(" "),
        },
        Change::CardMoved {
            card_id,
            target_deck_id,
            ..
        } => RowOp::MoveCard {
            card_id: card_id.0,
            deck_id: target_deck_id.0,
        },
        Change::DeckCreated { decks } => {
            let map: serde_json::Map<String, serde_json::Value> = decks
                .iter()
                .map(|(id, deck)| (id.0.to_string(), serde_json::to_value(deck).unwrap()))
                .collect();
            RowOp::UpdateCol {
                column: "decks",
                json_value: serde_json::Value::Object(map).to_string(),
            }
        }
        Change::NoteDeleted { note_id } => RowOp::DeleteNote { note_id: note_id.0 },
        Change::CardDeleted { card_id } => RowOp::DeleteCard { card_id: card_id.0 },
    };
    Ok(vec![op])
}

/// Lowers an entire change log, in order, into a flat row-operation list.
pub fn lower_all(changes: &[Change]) -> Result<Vec<RowOp>> {
    let mut ops = Vec::with_capacity(changes.len());
    for change in changes {
        ops.extend(lower(change)?);
    }
    Ok(ops)
}
