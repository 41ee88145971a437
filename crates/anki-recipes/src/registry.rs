use crate::error::{Error, Result};
use crate::recipe::{ArgumentMapping, Recipe, RecipeArgument, Target};
use anki_ops::{
    AddFieldOperation, AddModelOperation, BirdsEyeViewOperation, CountOperation, DivideIntoDecksByTagsOperation,
    GetOperation, ListOperation, MigrateNotesOperation, OperationArgument, PopulateFieldsOperation,
    RemoveEmptyNotesOperation, RenameFieldOperation, RenameModelOperation, TagNotesOperation,
};
use std::collections::{BTreeMap, HashMap};

fn to_recipe_args(schema: &[OperationArgument]) -> Vec<RecipeArgument> {
    schema
        .iter()
        .map(|a| RecipeArgument {
            name: a.name.to_string(),
            description: a.description.to_string(),
            required: a.required,
            default: a.default.clone(),
        })
        .collect()
}

fn fundamental(op_name: &str, readonly: bool, schema: Vec<OperationArgument>) -> Recipe {
    Recipe::Fundamental {
        name: op_name.to_string(),
        description: op_name.to_string(),
        op_name: op_name.to_string(),
        readonly,
        arguments: to_recipe_args(&schema),
    }
}

/// Maps recipe names to recipes. `with_builtins` wraps every canonical
/// operation as a fundamental recipe and registers the built-in composite
/// recipes (e.g. `remove-brackets-and-empty-notes`).
pub struct RecipeRegistry {
    recipes: HashMap<String, Recipe>,
}

impl RecipeRegistry {
    pub fn new() -> Self {
        RecipeRegistry {
            recipes: HashMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register(fundamental("list", true, ListOperation::schema())).unwrap();
        registry.register(fundamental("count", true, CountOperation::schema())).unwrap();
        registry.register(fundamental("get", true, GetOperation::schema())).unwrap();
        registry
            .register(fundamental("birds-eye-view", true, BirdsEyeViewOperation::schema()))
            .unwrap();

        registry.register(fundamental("add-model", false, AddModelOperation::schema())).unwrap();
        registry.register(fundamental("add-field", false, AddFieldOperation::schema())).unwrap();
        registry
            .register(fundamental("rename-field", false, RenameFieldOperation::schema()))
            .unwrap();
        registry
            .register(fundamental("rename-model", false, RenameModelOperation::schema()))
            .unwrap();
        registry
            .register(fundamental("migrate-notes", false, MigrateNotesOperation::schema()))
            .unwrap();
        registry.register(fundamental("tag-notes", false, TagNotesOperation::schema())).unwrap();
        registry
            .register(fundamental(
                "divide-decks-by-tags",
                false,
                DivideIntoDecksByTagsOperation::schema(),
            ))
            .unwrap();
        registry
            .register(fundamental("remove-empty-notes", false, RemoveEmptyNotesOperation::schema()))
            .unwrap();
        registry
            .register(fundamental("populate-fields", false, PopulateFieldsOperation::schema()))
            .unwrap();

        registry.register(remove_brackets_and_empty_notes_recipe()).unwrap();

        registry
    }

    pub fn register(&mut self, recipe: Recipe) -> Result<()> {
        let name = recipe.name().to_string();
        if self.recipes.contains_key(&name) {
            return Err(Error::RecipeAlreadyRegistered(name));
        }
        self.recipes.insert(name, recipe);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Recipe> {
        self.recipes.get(name).ok_or_else(|| Error::RecipeNotFound(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.recipes.keys().map(String::as_str).collect()
    }

    /// Whether a recipe is readonly: fundamental recipes carry their
    /// underlying operation's flag directly; a composite recipe is readonly
    /// iff every target it resolves to (transitively) is.
    pub fn readonly(&self, name: &str) -> Result<bool> {
        match self.get(name)? {
            Recipe::Fundamental { readonly, .. } => Ok(*readonly),
            Recipe::Composite { targets, .. } => {
                for target in targets {
                    if !self.readonly(&target.recipe_name)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }
}

impl Default for RecipeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// `remove-brackets-and-empty-notes`: strips parenthesized asides from a
/// field via `populate-fields`/`remove-text-in-parentheses`, then deletes
/// any note left empty in that field via `remove-empty-notes`. Grounded on
/// `metaops/bundles/remove_brackets_and_empty_notes.py`, whose own
/// `TargetDescription`-based target list doesn't carry an explicit argument
/// mapping — reconstructed here as a proper `CompositeMetaOpRecipe` shape
/// threading the same `model`/`field` pair into both targets.
fn remove_brackets_and_empty_notes_recipe() -> Recipe {
    let mut populate_mapping: ArgumentMapping = BTreeMap::new();
    populate_mapping.insert("model".to_string(), "model".to_string());
    populate_mapping.insert("field".to_string(), "populator_config.field".to_string());
    let populate_target = Target::new("populate-fields", populate_mapping)
        .with_fixed("populator", serde_json::json!("remove-text-in-parentheses"));

    let mut remove_mapping: ArgumentMapping = BTreeMap::new();
    remove_mapping.insert("model".to_string(), "model".to_string());
    remove_mapping.insert("field".to_string(), "field".to_string());
    let remove_target = Target::new("remove-empty-notes", remove_mapping);

    Recipe::Composite {
        name: "remove-brackets-and-empty-notes".to_string(),
        description: "Strip parenthesized asides from a field, then remove notes left empty in that field"
            .to_string(),
        arguments: vec![
            RecipeArgument::required("model", "Name of the model to operate on"),
            RecipeArgument::required("field", "Field to strip brackets from and check for emptiness"),
        ],
        targets: vec![populate_target, remove_target],
    }
}
