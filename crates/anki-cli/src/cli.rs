use anki_recipes::{Recipe, RecipeArgument, RecipeRegistry};
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::Value as Json;
use std::collections::BTreeMap;

pub const SCRIPT_SUBCOMMAND: &str = "script";

/// How a recipe argument's CLI value should be read back out of `ArgMatches`.
/// `arg_parser.py` infers this from each argument's *default value*'s Python
/// type at parser-construction time (`isinstance(default, bool)` → a flag,
/// `isinstance(default, int)` → `type=int`). That inference works for every
/// numeric/boolean argument in this crate except `episodes_per_deck`, which
/// is required with no default to sniff a type from (see DESIGN.md) — so
/// this list is the explicit, name-keyed version of that same inference,
/// covering the one case a default can't cover. `populator_config` and
/// `field_mapping` are the two arguments whose value is itself an object;
/// they are accepted as a JSON-encoded string on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgKind {
    Bool,
    I64,
    Json,
    Str,
}

fn arg_kind(name: &str) -> ArgKind {
    match name {
        "limit" | "batch_size" | "episodes_per_deck" | "example_count" => ArgKind::I64,
        "show_empty_models" | "show_empty_decks" => ArgKind::Bool,
        "populator_config" | "field_mapping" => ArgKind::Json,
        _ => ArgKind::Str,
    }
}

fn kebab(name: &str) -> String {
    name.replace('_', "-")
}

/// Builds one `clap::Arg` per recipe argument. Every argument is optional at
/// the clap layer regardless of the recipe's own `required` flag: requiredness
/// is enforced later, by `anki_recipes::resolve`/`anki_ops::Args::build`,
/// after the CLI tier has been merged on top of a config file's values —
/// making a flag mandatory here would make it impossible to satisfy a
/// required argument purely from `--config`.
fn build_arg(recipe_arg: &RecipeArgument) -> Arg {
    let id = recipe_arg.name.clone();
    let long = kebab(&recipe_arg.name);
    let help = recipe_arg.description.clone();

    match arg_kind(&recipe_arg.name) {
        ArgKind::Bool => Arg::new(id).long(long).help(help).action(ArgAction::SetTrue),
        ArgKind::I64 => Arg::new(id)
            .long(long)
            .help(help)
            .value_parser(clap::value_parser!(i64))
            .action(ArgAction::Set),
        ArgKind::Json | ArgKind::Str => Arg::new(id).long(long).help(help).action(ArgAction::Set),
    }
}

fn build_recipe_command(recipe: &Recipe) -> Command {
    let mut command = Command::new(recipe.name().to_string()).about(recipe.description().to_string());
    for arg in recipe.arguments() {
        command = command.arg(build_arg(arg));
    }
    command
}

/// Builds the full command tree: global input/output/config/format/verbosity
/// flags, one subcommand per registered recipe, and the `script` subcommand.
/// Mirrors `arg_parser.py`'s dynamic, schema-driven subparser construction
/// (`build_parser` iterating `recipe_registry.get_all()`), translated to
/// clap's builder API rather than 13 hand-written `#[derive(Args)]` structs,
/// since the source itself builds its parser data-driven at runtime.
pub fn build_root_command(registry: &RecipeRegistry) -> Command {
    let mut root = Command::new("anki-terminal")
        .about("Read, mutate, and repackage Anki .apkg flashcard decks")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .help("Path to the input .apkg file")
                .required(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Path to write the modified .apkg file to (required unless every run is read-only)")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to a JSON file of argument values, overridden by matching CLI flags")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .help("Result rendering format")
                .value_parser(["human", "json"])
                .default_value("human")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("pretty")
                .long("pretty")
                .help("Pretty-print JSON output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log verbosity (-v, -vv)")
                .action(ArgAction::Count),
        )
        .subcommand_required(true)
        .arg_required_else_help(true);

    let mut names: Vec<&str> = registry.names();
    names.sort_unstable();
    for name in names {
        let recipe = registry.get(name).expect("name came from registry.names()");
        root = root.subcommand(build_recipe_command(recipe));
    }

    root = root.subcommand(
        Command::new(SCRIPT_SUBCOMMAND)
            .about("Run every line of a script file against one shared context")
            .arg(
                Arg::new("file")
                    .help("Path to the script file")
                    .required(true)
                    .action(ArgAction::Set),
            ),
    );

    root
}

/// Builds the global-flag-free command tree used to parse one already-split
/// script line: just the recipe subcommands, no `--input`/`--output`/etc.
/// (those are fixed for the whole script, set once by the enclosing context).
pub fn build_script_line_command(registry: &RecipeRegistry) -> Command {
    let mut root = Command::new("anki-terminal-script-line")
        .subcommand_required(true)
        .arg_required_else_help(true);

    let mut names: Vec<&str> = registry.names();
    names.sort_unstable();
    for name in names {
        let recipe = registry.get(name).expect("name came from registry.names()");
        root = root.subcommand(build_recipe_command(recipe));
    }
    root
}

/// Reads a recipe's arguments back out of its subcommand's matches, in the
/// shape `anki_recipes::resolve` expects: a map from the recipe's own
/// (snake_case) argument names to JSON values, containing only the arguments
/// the user actually supplied on this invocation.
pub fn extract_args(recipe: &Recipe, matches: &ArgMatches) -> Result<BTreeMap<String, Json>, String> {
    let mut values = BTreeMap::new();
    for arg in recipe.arguments() {
        match arg_kind(&arg.name) {
            ArgKind::Bool => {
                if matches.get_flag(&arg.name) {
                    values.insert(arg.name.clone(), Json::Bool(true));
                }
            }
            ArgKind::I64 => {
                if let Some(value) = matches.get_one::<i64>(&arg.name) {
                    values.insert(arg.name.clone(), Json::Number((*value).into()));
                }
            }
            ArgKind::Json => {
                if let Some(value) = matches.get_one::<String>(&arg.name) {
                    let parsed = serde_json::from_str(value)
                        .map_err(|e| format!("argument '--{}' must be valid JSON: {e}", kebab(&arg.name)))?;
                    values.insert(arg.name.clone(), parsed);
                }
            }
            ArgKind::Str => {
                if let Some(value) = matches.get_one::<String>(&arg.name) {
                    values.insert(arg.name.clone(), Json::String(value.clone()));
                }
            }
        }
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_one_subcommand_per_recipe_plus_script() {
        let registry = RecipeRegistry::with_builtins();
        let command = build_root_command(&registry);
        let subcommand_names: Vec<&str> = command.get_subcommands().map(|c| c.get_name()).collect();
        assert!(subcommand_names.contains(&"list"));
        assert!(subcommand_names.contains(&"remove-brackets-and-empty-notes"));
        assert!(subcommand_names.contains(&SCRIPT_SUBCOMMAND));
    }

    #[test]
    fn extracts_i64_argument_from_matches() {
        let registry = RecipeRegistry::with_builtins();
        let recipe = registry.get("list").unwrap();
        let command = build_recipe_command(recipe);
        let matches = command.try_get_matches_from(["list", "--limit", "5", "--path", "/models"]).unwrap();
        let extracted = extract_args(recipe, &matches).unwrap();
        assert_eq!(extracted.get("limit").unwrap(), &Json::Number(5.into()));
        assert_eq!(extracted.get("path").unwrap(), "/models");
    }

    #[test]
    fn rejects_malformed_json_object_argument() {
        let registry = RecipeRegistry::with_builtins();
        let recipe = registry.get("populate-fields").unwrap();
        let command = build_recipe_command(recipe);
        let matches = command
            .try_get_matches_from(["populate-fields", "--populator", "x", "--populator-config", "not json"])
            .unwrap();
        assert!(extract_args(recipe, &matches).is_err());
    }
}
