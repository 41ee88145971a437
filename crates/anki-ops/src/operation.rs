use crate::args::OperationArgument;
use crate::error::{Error, Result};
use crate::result::OperationResult;
use anki_model::{Collection, Model};

/// A named, validatable, executable unit of work against a `Collection`.
///
/// Mirrors `anki_terminal.ops.op_base.Operation`: construction resolves and
/// stores the operation's arguments (see `Args::build`), `validate` checks
/// shape against a given collection without mutating it, and `execute`
/// performs the mutation and returns the changes to log.
pub trait Operation {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn readonly(&self) -> bool;
    fn arguments(&self) -> &[OperationArgument];

    fn validate(&mut self, collection: &Collection) -> Result<()>;
    fn execute(&mut self, collection: &mut Collection) -> Result<OperationResult>;
}

/// Finds a model by name, or the collection's sole model if `name` is
/// `None`. Mirrors `Operation._get_model`.
pub fn get_model<'a>(collection: &'a Collection, name: Option<&str>) -> Result<&'a Model> {
    match name {
        Some(name) => collection
            .model_by_name(name)
            .ok_or_else(|| Error::ModelNotFound(name.to_string())),
        None => collection.sole_model().ok_or_else(|| {
            let names = collection.models.values().map(|m| m.name.clone()).collect();
            Error::AmbiguousModel(names)
        }),
    }
}
