use serde_json::Value as Json;
use std::collections::BTreeMap;

/// Declares one argument a recipe accepts, mirroring `MetaOpArgument`
/// (`anki_terminal/metaops/metaop_recipe.py`).
#[derive(Debug, Clone)]
pub struct RecipeArgument {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub default: Option<Json>,
}

impl RecipeArgument {
    pub fn required(name: impl Into<String>, description: impl Into<String>) -> Self {
        RecipeArgument {
            name: name.into(),
            description: description.into(),
            required: true,
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, description: impl Into<String>, default: Json) -> Self {
        RecipeArgument {
            name: name.into(),
            description: description.into(),
            required: false,
            default: Some(default),
        }
    }
}

/// Maps a composite recipe's own argument names onto the argument names of
/// one of its targets. Mirrors `ArgumentMapping` (`metaop_recipe.py`).
pub type ArgumentMapping = BTreeMap<String, String>;

/// One target of a composite recipe: the recipe to resolve into, how the
/// composite's arguments feed that target's arguments, and any constant
/// arguments the target needs that aren't derived from the composite's own
/// arguments (e.g. a fixed populator name). A target argument name
/// containing a `.` addresses a key inside a nested object argument (used
/// to thread a value into a populator's `populator_config`).
#[derive(Debug, Clone)]
pub struct Target {
    pub recipe_name: String,
    pub arg_mapping: ArgumentMapping,
    pub fixed: BTreeMap<String, Json>,
}

impl Target {
    pub fn new(recipe_name: impl Into<String>, arg_mapping: ArgumentMapping) -> Self {
        Target {
            recipe_name: recipe_name.into(),
            arg_mapping,
            fixed: BTreeMap::new(),
        }
    }

    pub fn with_fixed(mut self, name: impl Into<String>, value: Json) -> Self {
        self.fixed.insert(name.into(), value);
        self
    }
}

/// A recipe for a meta-operation: either fundamental (maps one-to-one with a
/// registered operation) or composite (resolves lazily into a list of
/// target recipes, which may themselves be composite). Mirrors
/// `FundamentalMetaOpRecipe`/`CompositeMetaOpRecipe` (`metaop_recipe.py`).
#[derive(Debug, Clone)]
pub enum Recipe {
    Fundamental {
        name: String,
        description: String,
        op_name: String,
        readonly: bool,
        arguments: Vec<RecipeArgument>,
    },
    Composite {
        name: String,
        description: String,
        arguments: Vec<RecipeArgument>,
        targets: Vec<Target>,
    },
}

impl Recipe {
    pub fn name(&self) -> &str {
        match self {
            Recipe::Fundamental { name, .. } => name,
            Recipe::Composite { name, .. } => name,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Recipe::Fundamental { description, .. } => description,
            Recipe::Composite { description, .. } => description,
        }
    }

    pub fn arguments(&self) -> &[RecipeArgument] {
        match self {
            Recipe::Fundamental { arguments, .. } => arguments,
            Recipe::Composite { arguments, .. } => arguments,
        }
    }

    pub fn is_fundamental(&self) -> bool {
        matches!(self, Recipe::Fundamental { .. })
    }
}
