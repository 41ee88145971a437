//! Scoped package/collection lifecycle (`Context`), filesystem resource
//! resolution (`FsResourceLoader`), config-file loading, and script-file
//! parsing. The layer `anki-cli` drives to turn a parsed command line into a
//! run against an opened `.apkg`.

mod config;
mod context;
mod error;
mod loader;
mod script;

pub use config::load_config;
pub use context::Context;
pub use error::{Error, Result};
pub use loader::FsResourceLoader;
pub use script::{expand_variables, parse_script};

#[cfg(test)]
mod tests {
    use super::*;
    use anki_ops::{ListOperation, Operation};
    use std::io::Write;

    fn write_fixture_apkg(path: &std::path::Path) {
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

        let db_dir = tempfile::tempdir().unwrap();
        let db_path = db_dir.path().join("collection.anki2");
        let conn = rusqlite::Connection::open(&db_path).unwrap();
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
        drop(conn);

        let file = std::fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::default();
        zip.start_file("collection.anki2", options).unwrap();
        let mut bytes = Vec::new();
        std::fs::File::open(&db_path).unwrap().read_to_end(&mut bytes).unwrap();
        zip.write_all(&bytes).unwrap();
        zip.finish().unwrap();
    }

    use std::io::Read;

    #[test]
    fn read_only_context_discards_writes_with_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let apkg_path = dir.path().join("in.apkg");
        write_fixture_apkg(&apkg_path);

        let context = Context::open(&apkg_path, None, true).unwrap();
        assert!(context.read_only());
        assert_eq!(context.collection().models.len(), 1);
        context.finish().unwrap();
    }

    #[test]
    fn readonly_operation_in_a_write_context_produces_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let apkg_path = dir.path().join("in.apkg");
        write_fixture_apkg(&apkg_path);
        let output_path = dir.path().join("out.apkg");

        let mut args = std::collections::BTreeMap::new();
        args.insert("path".to_string(), serde_json::json!("/models"));

        let mut context = Context::open(&apkg_path, Some(output_path.clone()), false).unwrap();
        let mut op = ListOperation::new(args).unwrap();
        let result = context.run(&mut op).unwrap();
        assert!(result.success);
        context.finish().unwrap();

        assert!(!output_path.exists());
    }
}
