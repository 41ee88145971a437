use crate::error::Result;
use anki_engine::Context;
use anki_ops::{OperationFactory, OperationRegistry, OperationResult, ResourceLoader};
use anki_recipes::RecipeRegistry;
use serde_json::Value as Json;
use std::collections::BTreeMap;

/// Runs one recipe invocation: merges `config_args` under `cli_args` (CLI
/// wins), resolves the recipe to its flat op list via `anki_recipes::resolve`,
/// builds and runs each resolved operation against `context` in order.
/// Mirrors `OperationExecutor.execute_from_args` composed with
/// `MetaOpExecutor.resolve_and_execute`.
pub fn dispatch_recipe(
    context: &mut Context,
    op_registry: &OperationRegistry,
    recipe_registry: &RecipeRegistry,
    loader: &dyn ResourceLoader,
    recipe_name: &str,
    cli_args: BTreeMap<String, Json>,
    config_args: BTreeMap<String, Json>,
) -> Result<Vec<OperationResult>> {
    let mut merged = config_args;
    merged.extend(cli_args);

    let resolved_ops = anki_recipes::resolve(recipe_registry, recipe_name, merged)?;
    let factory = OperationFactory::new(op_registry);

    let mut results = Vec::with_capacity(resolved_ops.len());
    for resolved in resolved_ops {
        let mut operation = factory.build(&resolved.op_name, resolved.args, BTreeMap::new(), loader)?;
        let result = context.run(operation.as_mut())?;
        results.push(result);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anki_engine::FsResourceLoader;
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
    fn dispatch_runs_a_fundamental_recipe_through_to_a_result() {
        let dir = tempfile::tempdir().unwrap();
        let apkg_path = dir.path().join("in.apkg");
        write_fixture_apkg(&apkg_path);

        let mut context = Context::open(&apkg_path, None, true).unwrap();
        let op_registry = OperationRegistry::with_builtins();
        let recipe_registry = RecipeRegistry::with_builtins();
        let loader = FsResourceLoader::new(vec![]);

        let mut cli_args = BTreeMap::new();
        cli_args.insert("path".to_string(), serde_json::json!("/models"));

        let results = dispatch_recipe(
            &mut context,
            &op_registry,
            &recipe_registry,
            &loader,
            "list",
            cli_args,
            BTreeMap::new(),
        )
        .unwrap();

        assert_eq!(results.len(), 1);
        assert!(results[0].success);
        context.finish().unwrap();
    }

    #[test]
    fn dispatch_runs_a_composite_recipe_as_multiple_operations() {
        let dir = tempfile::tempdir().unwrap();
        let apkg_path = dir.path().join("in.apkg");
        write_fixture_apkg(&apkg_path);
        let output_path = dir.path().join("out.apkg");

        let mut context = Context::open(&apkg_path, Some(output_path), false).unwrap();
        let op_registry = OperationRegistry::with_builtins();
        let recipe_registry = RecipeRegistry::with_builtins();
        let loader = FsResourceLoader::new(vec![]);

        let mut cli_args = BTreeMap::new();
        cli_args.insert("model".to_string(), serde_json::json!("Basic"));
        cli_args.insert("field".to_string(), serde_json::json!("Back"));

        let results = dispatch_recipe(
            &mut context,
            &op_registry,
            &recipe_registry,
            &loader,
            "remove-brackets-and-empty-notes",
            cli_args,
            BTreeMap::new(),
        )
        .unwrap();

        assert_eq!(results.len(), 2);
        context.finish().unwrap();
    }
}
