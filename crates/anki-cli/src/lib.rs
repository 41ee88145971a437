//! Command-line front end: turns a parsed command line (or a script file's
//! lines) into a sequence of recipe dispatches against one `anki_engine::Context`.

pub mod cli;
pub mod dispatch;
pub mod error;
pub mod printer;
pub mod shell_split;

use anki_engine::{Context, FsResourceLoader};
use anki_ops::OperationRegistry;
use anki_recipes::RecipeRegistry;
use clap::ArgMatches;
use error::{Error, Result};
use printer::{HumanPrinter, JsonPrinter, ResultPrinter};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Parses `argv`, dispatches the requested recipe (or script), and reports
/// the outcome through the format-appropriate printer. Returns the process
/// exit code: `0` on success, `1` if the run itself failed. Clap's own usage
/// errors (unknown flag, missing required value) are reported and exited by
/// clap directly, before this function is reached.
pub fn run_cli() -> i32 {
    let op_registry = OperationRegistry::with_builtins();
    let recipe_registry = RecipeRegistry::with_builtins();
    let root = cli::build_root_command(&recipe_registry);
    let matches = root.get_matches();

    init_logging(matches.get_count("verbose"));

    let format = matches.get_one::<String>("format").expect("has a default value");
    let pretty = matches.get_flag("pretty");
    let printer: Box<dyn ResultPrinter> = match format.as_str() {
        "json" => Box::new(JsonPrinter { pretty }),
        _ => Box::new(HumanPrinter),
    };

    match run(&matches, &op_registry, &recipe_registry, printer.as_ref()) {
        Ok(()) => 0,
        Err(err) => {
            printer.print_error(&err.to_string());
            1
        }
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into());
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}

fn run(
    matches: &ArgMatches,
    op_registry: &OperationRegistry,
    recipe_registry: &RecipeRegistry,
    printer: &dyn ResultPrinter,
) -> Result<()> {
    let input = PathBuf::from(matches.get_one::<String>("input").expect("required by clap"));
    let output = matches.get_one::<String>("output").map(PathBuf::from);
    let config_path = matches.get_one::<String>("config").map(PathBuf::from);

    let (subcommand_name, subcommand_matches) = matches.subcommand().expect("required by clap");
    let loader = FsResourceLoader::new(vec![std::env::current_dir().unwrap_or_default()]);

    let config_args = match &config_path {
        Some(path) => {
            if !path.is_file() {
                return Err(Error::Engine(anki_engine::Error::ResourceNotFound(path.display().to_string())));
            }
            anki_engine::load_config(path, &loader)?
        }
        None => BTreeMap::new(),
    };

    if subcommand_name == cli::SCRIPT_SUBCOMMAND {
        let script_path = PathBuf::from(subcommand_matches.get_one::<String>("file").expect("required by clap"));
        if !script_path.is_file() {
            return Err(Error::Engine(anki_engine::Error::ResourceNotFound(script_path.display().to_string())));
        }
        let read_only = output.is_none();
        let mut context = Context::open(&input, output, read_only)?;
        run_script(&mut context, op_registry, recipe_registry, &loader, &script_path, printer)?;
        context.finish()?;
        return Ok(());
    }

    let recipe = recipe_registry.get(subcommand_name)?;
    let readonly = recipe_registry.readonly(subcommand_name)?;
    if !readonly && output.is_none() {
        return Err(Error::Cli(format!(
            "recipe '{subcommand_name}' performs writes; --output is required"
        )));
    }

    let cli_args = cli::extract_args(recipe, subcommand_matches).map_err(Error::Cli)?;
    let mut context = Context::open(&input, output, readonly)?;
    let results = dispatch::dispatch_recipe(
        &mut context,
        op_registry,
        recipe_registry,
        &loader,
        subcommand_name,
        cli_args,
        config_args,
    )?;
    for result in &results {
        printer.print_result(result);
    }
    context.finish()?;
    Ok(())
}

fn run_script(
    context: &mut Context,
    op_registry: &OperationRegistry,
    recipe_registry: &RecipeRegistry,
    loader: &FsResourceLoader,
    script_path: &std::path::Path,
    printer: &dyn ResultPrinter,
) -> Result<()> {
    let contents = std::fs::read_to_string(script_path).map_err(|e| Error::Cli(e.to_string()))?;
    let lines = anki_engine::parse_script(&contents, &BTreeMap::new())?;
    let line_command = cli::build_script_line_command(recipe_registry);

    for line in lines {
        let words = shell_split::shell_split(&line).map_err(Error::Cli)?;
        let matches = line_command
            .clone()
            .try_get_matches_from(std::iter::once(line_command.get_name().to_string()).chain(words))
            .map_err(|e| Error::Cli(e.to_string()))?;
        let (recipe_name, recipe_matches) = matches.subcommand().expect("required by clap");
        let recipe = recipe_registry.get(recipe_name)?;
        let cli_args = cli::extract_args(recipe, recipe_matches).map_err(Error::Cli)?;

        let results = dispatch::dispatch_recipe(
            context,
            op_registry,
            recipe_registry,
            loader,
            recipe_name,
            cli_args,
            BTreeMap::new(),
        )?;
        for result in &results {
            printer.print_result(result);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
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

    struct SilentPrinter;
    impl ResultPrinter for SilentPrinter {
        fn print_result(&self, _result: &anki_ops::OperationResult) {}
        fn print_error(&self, _message: &str) {}
    }

    #[test]
    fn end_to_end_readonly_subcommand_parses_and_dispatches() {
        let dir = tempfile::tempdir().unwrap();
        let apkg_path = dir.path().join("in.apkg");
        write_fixture_apkg(&apkg_path);

        let op_registry = OperationRegistry::with_builtins();
        let recipe_registry = RecipeRegistry::with_builtins();
        let root = cli::build_root_command(&recipe_registry);
        let matches = root
            .try_get_matches_from([
                "anki-terminal",
                "-i",
                apkg_path.to_str().unwrap(),
                "list",
                "--path",
                "/models",
            ])
            .unwrap();

        run(&matches, &op_registry, &recipe_registry, &SilentPrinter).unwrap();
    }

    #[test]
    fn end_to_end_script_subcommand_shares_one_context_across_lines() {
        let dir = tempfile::tempdir().unwrap();
        let apkg_path = dir.path().join("in.apkg");
        write_fixture_apkg(&apkg_path);
        let output_path = dir.path().join("out.apkg");
        let script_path = dir.path().join("run.txt");
        std::fs::write(
            &script_path,
            "tag-notes --source-field Front --pattern \"(hi)\" --tag-prefix matched::\nlist --path /models\n",
        )
        .unwrap();

        let op_registry = OperationRegistry::with_builtins();
        let recipe_registry = RecipeRegistry::with_builtins();
        let root = cli::build_root_command(&recipe_registry);
        let matches = root
            .try_get_matches_from([
                "anki-terminal",
                "-i",
                apkg_path.to_str().unwrap(),
                "-o",
                output_path.to_str().unwrap(),
                "script",
                script_path.to_str().unwrap(),
            ])
            .unwrap();

        run(&matches, &op_registry, &recipe_registry, &SilentPrinter).unwrap();
        assert!(output_path.exists());
    }

    #[test]
    fn write_recipe_without_output_is_rejected_before_opening_the_package() {
        let dir = tempfile::tempdir().unwrap();
        let apkg_path = dir.path().join("in.apkg");
        write_fixture_apkg(&apkg_path);

        let op_registry = OperationRegistry::with_builtins();
        let recipe_registry = RecipeRegistry::with_builtins();
        let root = cli::build_root_command(&recipe_registry);
        let matches = root
            .try_get_matches_from([
                "anki-terminal",
                "-i",
                apkg_path.to_str().unwrap(),
                "add-field",
                "--model",
                "Basic",
                "--field-name",
                "Extra",
            ])
            .unwrap();

        let err = run(&matches, &op_registry, &recipe_registry, &SilentPrinter).unwrap_err();
        assert!(matches!(err, Error::Cli(_)));
    }
}
