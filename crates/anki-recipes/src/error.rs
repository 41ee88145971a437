use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("recipe not found: {0}")]
    RecipeNotFound(String),

    #[error("recipe already registered: {0}")]
    RecipeAlreadyRegistered(String),

    #[error("missing required argument '{0}' for recipe")]
    MissingArgument(String),

    #[error("meta-operation resolution exceeded max depth of {0}")]
    MaxDepthExceeded(usize),

    #[error("meta-operation resolution exceeded max operation count of {0}")]
    MaxOpsExceeded(usize),

    #[error(transparent)]
    Ops(#[from] anki_ops::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
