use thiserror::Error;

/// Errors raised while resolving, validating, or executing an operation.
///
/// Persistence and package errors live in their own crates; this enum only
/// covers the operation-framework concerns described in the spec's error
/// taxonomy (InvalidInput, NotFound, Conflict, ValidationFailed).
#[derive(Error, Debug)]
pub enum Error {
    #[error("missing required argument: {0}")]
    MissingArgument(String),

    #[error("invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("operation already registered: {0}")]
    OperationAlreadyRegistered(String),

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("multiple models found, please specify one: {0:?}")]
    AmbiguousModel(Vec<String>),

    #[error("field '{field}' not found in model '{model}'")]
    FieldNotFound { model: String, field: String },

    #[error("template '{template}' not found in model '{model}'")]
    TemplateNotFound { model: String, template: String },

    #[error("deck not found: {0}")]
    DeckNotFound(String),

    #[error("field mapping is not injective: target field '{0}' used more than once")]
    NonInjectiveMapping(String),

    #[error("invalid regular expression: {0}")]
    InvalidRegex(String),

    #[error("pattern must contain at least one capture group")]
    PatternMissingCaptureGroup,

    #[error("no notes found for model '{0}'")]
    NoMatchingNotes(String),

    #[error("failed to load resource '{name}': {reason}")]
    ResourceUnavailable { name: String, reason: String },

    #[error(transparent)]
    Model(#[from] anki_model::Error),

    #[error(transparent)]
    Populate(#[from] anki_populate::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
