use crate::error::{Error, Result};
use crate::operation::Operation;
use crate::ops::read::{BirdsEyeViewOperation, CountOperation, GetOperation, ListOperation};
use crate::ops::write::{
    AddFieldOperation, AddModelOperation, DivideIntoDecksByTagsOperation, MigrateNotesOperation,
    PopulateFieldsOperation, RemoveEmptyNotesOperation, RenameFieldOperation, RenameModelOperation, TagNotesOperation,
};
use std::collections::{BTreeMap, HashMap};

type Constructor = Box<dyn Fn(BTreeMap<String, serde_json::Value>) -> Result<Box<dyn Operation>>>;

/// Maps operation names to constructors. The canonical set registered by
/// `with_builtins` is the full list of thirteen operations this crate
/// implements; the source's own `registry.py` only wires nine of them into
/// its `_register_defaults` (missing `rename-model`,
/// `divide-decks-by-tags`, `remove-empty-notes`, `birds-eye-view`) —
/// all thirteen are registered here regardless.
pub struct OperationRegistry {
    constructors: HashMap<String, Constructor>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        OperationRegistry {
            constructors: HashMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register("list", |args| Ok(Box::new(ListOperation::new(args)?) as Box<dyn Operation>));
        registry.register("count", |args| Ok(Box::new(CountOperation::new(args)?) as Box<dyn Operation>));
        registry.register("get", |args| Ok(Box::new(GetOperation::new(args)?) as Box<dyn Operation>));
        registry.register("birds-eye-view", |args| {
            Ok(Box::new(BirdsEyeViewOperation::new(args)?) as Box<dyn Operation>)
        });

        registry.register("add-model", |args| Ok(Box::new(AddModelOperation::new(args)?) as Box<dyn Operation>));
        registry.register("add-field", |args| Ok(Box::new(AddFieldOperation::new(args)?) as Box<dyn Operation>));
        registry.register("rename-field", |args| {
            Ok(Box::new(RenameFieldOperation::new(args)?) as Box<dyn Operation>)
        });
        registry.register("rename-model", |args| {
            Ok(Box::new(RenameModelOperation::new(args)?) as Box<dyn Operation>)
        });
        registry.register("migrate-notes", |args| {
            Ok(Box::new(MigrateNotesOperation::new(args)?) as Box<dyn Operation>)
        });
        registry.register("tag-notes", |args| Ok(Box::new(TagNotesOperation::new(args)?) as Box<dyn Operation>));
        registry.register("divide-decks-by-tags", |args| {
            Ok(Box::new(DivideIntoDecksByTagsOperation::new(args)?) as Box<dyn Operation>)
        });
        registry.register("remove-empty-notes", |args| {
            Ok(Box::new(RemoveEmptyNotesOperation::new(args)?) as Box<dyn Operation>)
        });
        registry.register("populate-fields", |args| {
            Ok(Box::new(PopulateFieldsOperation::new(args)?) as Box<dyn Operation>)
        });

        registry
    }

    /// Registers a new constructor. Panics on duplicate registration, since
    /// this only ever happens at startup against a hardcoded name table.
    pub fn register(
        &mut self,
        name: &str,
        constructor: impl Fn(BTreeMap<String, serde_json::Value>) -> Result<Box<dyn Operation>> + 'static,
    ) {
        if self.constructors.contains_key(name) {
            panic!("operation '{name}' already registered");
        }
        self.constructors.insert(name.to_string(), Box::new(constructor));
    }

    /// Registers a new constructor, returning an error rather than panicking
    /// on duplicate registration. Used by callers (e.g. plugin loading) that
    /// register names not known at compile time.
    pub fn try_register(
        &mut self,
        name: &str,
        constructor: impl Fn(BTreeMap<String, serde_json::Value>) -> Result<Box<dyn Operation>> + 'static,
    ) -> Result<()> {
        if self.constructors.contains_key(name) {
            return Err(Error::OperationAlreadyRegistered(name.to_string()));
        }
        self.constructors.insert(name.to_string(), Box::new(constructor));
        Ok(())
    }

    pub fn build(&self, name: &str, args: BTreeMap<String, serde_json::Value>) -> Result<Box<dyn Operation>> {
        match self.constructors.get(name) {
            Some(ctor) => ctor(args),
            None => Err(Error::UnknownOperation(name.to_string())),
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_builtins_registers_all_thirteen_canonical_operations() {
        let registry = OperationRegistry::with_builtins();
        let names = registry.names();
        assert_eq!(names.len(), 13);
        for expected in [
            "list",
            "count",
            "get",
            "birds-eye-view",
            "add-model",
            "add-field",
            "rename-field",
            "rename-model",
            "migrate-notes",
            "tag-notes",
            "divide-decks-by-tags",
            "remove-empty-notes",
            "populate-fields",
        ] {
            assert!(names.contains(&expected), "missing operation: {expected}");
        }
    }

    #[test]
    fn try_register_rejects_duplicate_name() {
        let mut registry = OperationRegistry::with_builtins();
        let err = registry
            .try_register("list", |args| Ok(Box::new(ListOperation::new(args)?) as Box<dyn Operation>))
            .unwrap_err();
        assert!(matches!(err, Error::OperationAlreadyRegistered(_)));
    }

    #[test]
    fn build_rejects_unknown_name() {
        let registry = OperationRegistry::with_builtins();
        let err = registry.build("does-not-exist", BTreeMap::new()).unwrap_err();
        assert!(matches!(err, Error::UnknownOperation(_)));
    }
}
