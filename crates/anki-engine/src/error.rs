use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("output path must be specified for write operations")]
    OutputPathRequired,

    #[error("cannot perform write operation in read-only mode")]
    WriteInReadOnlyMode,

    #[error("validation failed for operation '{operation}': {reason}")]
    ValidationFailed { operation: String, reason: String },

    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    #[error("invalid variable name '{0}': only letters, numbers, and underscores are allowed")]
    InvalidVariableName(String),

    #[error("no value provided for variable: {0}")]
    MissingVariable(String),

    #[error(transparent)]
    Package(#[from] anki_package::Error),

    #[error(transparent)]
    Persistence(#[from] anki_persistence::Error),

    #[error(transparent)]
    Ops(#[from] anki_ops::Error),

    #[error(transparent)]
    Recipes(#[from] anki_recipes::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
