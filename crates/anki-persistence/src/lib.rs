//! Version-aware (v2/v21) schema loaders, the change log, the DB-operation
//! lowering table, and the transactional DB writer.

mod changelog;
mod db_operations;
mod error;
mod loader;
mod writer;

pub use changelog::{Change, ChangeLog};
pub use db_operations::{lower, lower_all, RowOp};
pub use error::{Error, Result};
pub use loader::load;
pub use writer::{apply, open, open_read_only};

#[cfg(test)]
mod tests {
    use super::*;
    use anki_model::*;
    use rusqlite::Connection;
    use std::collections::BTreeMap;

    fn seed_v2_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE col (id INTEGER, crt INTEGER, mod INTEGER, scm INTEGER, ver INTEGER, \
             dty INTEGER, usn INTEGER, ls INTEGER, conf TEXT, models TEXT, decks TEXT, dconf TEXT);
             CREATE TABLE notes (id INTEGER, guid TEXT, mid INTEGER, mod INTEGER, usn INTEGER, \
             tags TEXT, flds TEXT, sfld INTEGER, csum INTEGER, flags INTEGER, data TEXT);
             CREATE TABLE cards (id INTEGER, nid INTEGER, did INTEGER, ord INTEGER, mod INTEGER, \
             usn INTEGER, type INTEGER, queue INTEGER, due INTEGER, ivl INTEGER, factor INTEGER, \
             reps INTEGER, lapses INTEGER, left INTEGER, odue INTEGER, odid INTEGER, flags INTEGER, \
             data TEXT);",
        )
        .unwrap();

        let models = serde_json::json!({
            "1": {
                "name": "Basic",
                "flds": [{"name": "Front"}, {"name": "Back"}],
                "tmpls": [{"name": "Card 1", "ord": 0, "qfmt": "{{Front}}", "afmt": "{{Back}}"}],
                "css": "",
                "did": 1,
                "mod": 0,
                "type": 0,
                "usn": -1,
                "vers": 1
            }
        });
        let decks = serde_json::json!({
            "1": {"name": "Default", "mod": 0, "usn": -1, "conf": 1}
        });

        conn.execute(
            "INSERT INTO col VALUES (1, 0, 0, 0, 11, 0, 0, 0, '{}', ?1, ?2, '{}')",
            rusqlite::params![models.to_string(), decks.to_string()],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO notes VALUES (1, 'abc', 1, 0, -1, '', 'hi\u{1f}bye', 0, 0, 0, '{}')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO cards VALUES (1, 1, 1, 0, 0, -1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, '{}')",
            [],
        )
        .unwrap();
        conn
    }

    #[test]
    fn loads_v2_collection() {
        let conn = seed_v2_db();
        let collection = load(&conn, anki_package::DbVersion::V2).unwrap();
        assert_eq!(collection.models.len(), 1);
        let model = collection.models.get(&ModelId(1)).unwrap();
        assert_eq!(model.field_names(), vec!["Front", "Back"]);
        let note = collection.notes.get(&NoteId(1)).unwrap();
        assert_eq!(note.fields.get("Front").unwrap(), "hi");
        assert_eq!(note.fields.get("Back").unwrap(), "bye");
    }

    #[test]
    fn writer_applies_note_field_update() {
        let mut conn = seed_v2_db();
        let mut log = ChangeLog::new();
        let mut fields = BTreeMap::new();
        fields.insert("Front".to_string(), "changed".to_string());
        fields.insert("Back".to_string(), "bye".to_string());
        log.push(Change::NoteFieldsUpdated {
            note_id: NoteId(1),
            model_id: ModelId(1),
            fields,
        });
        apply(&mut conn, &log).unwrap();
        let flds: String = conn
            .query_row("SELECT flds FROM notes WHERE id = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(flds, "changed\u{1f}bye");
    }

    #[test]
    fn writer_applies_card_deletion() {
        let mut conn = seed_v2_db();
        let mut log = ChangeLog::new();
        log.push(Change::CardDeleted { card_id: CardId(1) });
        apply(&mut conn, &log).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM cards", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
