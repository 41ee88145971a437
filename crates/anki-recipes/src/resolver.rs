use crate::error::{Error, Result};
use crate::recipe::Recipe;
use crate::registry::RecipeRegistry;
use serde_json::Value as Json;
use std::collections::BTreeMap;

const MAX_DEPTH: usize = 10;
const MAX_OPS: usize = 100;

/// One operation to build and run, named and with its fully-resolved
/// arguments, produced by flattening a meta-operation.
#[derive(Debug, Clone)]
pub struct ResolvedOp {
    pub op_name: String,
    pub args: BTreeMap<String, Json>,
}

/// Resolves a named recipe plus concrete argument values into the flat,
/// depth-first, left-to-right list of operations it expands to. Bounded by
/// `max_depth = 10` and `max_ops = 100`, matching
/// `MetaOpExecutor._resolve_ops_recursive`.
pub fn resolve(registry: &RecipeRegistry, recipe_name: &str, args: BTreeMap<String, Json>) -> Result<Vec<ResolvedOp>> {
    let mut ops = Vec::new();
    resolve_recursive(registry, recipe_name, args, &mut ops, 0)?;
    Ok(ops)
}

fn resolve_recursive(
    registry: &RecipeRegistry,
    recipe_name: &str,
    args: BTreeMap<String, Json>,
    ops: &mut Vec<ResolvedOp>,
    depth: usize,
) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(Error::MaxDepthExceeded(MAX_DEPTH));
    }

    let recipe = registry.get(recipe_name)?;
    let resolved_args = apply_defaults(recipe, args)?;

    match recipe {
        Recipe::Fundamental { op_name, .. } => {
            if ops.len() >= MAX_OPS {
                return Err(Error::MaxOpsExceeded(MAX_OPS));
            }
            ops.push(ResolvedOp {
                op_name: op_name.clone(),
                args: resolved_args,
            });
            Ok(())
        }
        Recipe::Composite { targets, .. } => {
            for target in targets {
                let mut target_args = BTreeMap::new();
                for (key, value) in &target.fixed {
                    insert_dotted(&mut target_args, key, value.clone());
                }
                for (composite_name, target_name) in &target.arg_mapping {
                    if let Some(value) = resolved_args.get(composite_name) {
                        insert_dotted(&mut target_args, target_name, value.clone());
                    }
                }
                resolve_recursive(registry, &target.recipe_name, target_args, ops, depth + 1)?;
            }
            Ok(())
        }
    }
}

fn apply_defaults(recipe: &Recipe, mut supplied: BTreeMap<String, Json>) -> Result<BTreeMap<String, Json>> {
    for arg in recipe.arguments() {
        if arg.required && !supplied.contains_key(&arg.name) {
            return Err(Error::MissingArgument(arg.name.clone()));
        }
        if !supplied.contains_key(&arg.name) {
            if let Some(default) = &arg.default {
                supplied.insert(arg.name.clone(), default.clone());
            }
        }
    }
    Ok(supplied)
}

fn insert_dotted(target: &mut BTreeMap<String, Json>, dotted_key: &str, value: Json) {
    match dotted_key.split_once('.') {
        None => {
            target.insert(dotted_key.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = target.entry(head.to_string()).or_insert_with(|| Json::Object(Default::default()));
            if let Json::Object(map) = entry {
                let mut nested: BTreeMap<String, Json> = map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                insert_dotted(&mut nested, rest, value);
                *entry = Json::Object(nested.into_iter().collect());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_fundamental_recipe_to_single_op() {
        let registry = RecipeRegistry::with_builtins();
        let mut args = BTreeMap::new();
        args.insert("path".to_string(), serde_json::json!("/models"));
        let ops = resolve(&registry, "list", args).unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].op_name, "list");
        assert_eq!(ops[0].args.get("path").unwrap(), "/models");
    }

    #[test]
    fn resolves_composite_recipe_to_two_ops_in_order() {
        let registry = RecipeRegistry::with_builtins();
        let mut args = BTreeMap::new();
        args.insert("model".to_string(), serde_json::json!("Basic"));
        args.insert("field".to_string(), serde_json::json!("Front"));
        let ops = resolve(&registry, "remove-brackets-and-empty-notes", args).unwrap();

        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].op_name, "populate-fields");
        assert_eq!(ops[0].args.get("populator").unwrap(), "remove-text-in-parentheses");
        assert_eq!(ops[0].args["populator_config"]["field"], "Front");
        assert_eq!(ops[1].op_name, "remove-empty-notes");
        assert_eq!(ops[1].args.get("field").unwrap(), "Front");
    }

    #[test]
    fn unknown_recipe_is_an_error() {
        let registry = RecipeRegistry::with_builtins();
        let err = resolve(&registry, "does-not-exist", BTreeMap::new()).unwrap_err();
        assert!(matches!(err, Error::RecipeNotFound(_)));
    }

    #[test]
    fn composite_recipe_is_readonly_only_if_every_target_is() {
        let registry = RecipeRegistry::with_builtins();
        assert!(!registry.readonly("remove-brackets-and-empty-notes").unwrap());
        assert!(registry.readonly("list").unwrap());
    }
}
