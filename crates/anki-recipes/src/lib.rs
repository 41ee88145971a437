//! Meta-operation / recipe layer: fundamental recipes wrap a single
//! operation one-to-one, composite recipes resolve (lazily, depth-first)
//! into a flat list of target recipes.

mod error;
mod recipe;
mod registry;
mod resolver;

pub use error::{Error, Result};
pub use recipe::{ArgumentMapping, Recipe, RecipeArgument, Target};
pub use registry::RecipeRegistry;
pub use resolver::{resolve, ResolvedOp};
