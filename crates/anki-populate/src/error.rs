use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("missing required configuration argument: {0}")]
    MissingConfigArgument(String),

    #[error("unknown populator: {0}")]
    UnknownPopulator(String),

    #[error("target field '{0}' not found in model")]
    TargetFieldNotInModel(String),

    #[error("source field '{0}' not found in model")]
    SourceFieldNotInModel(String),

    #[error("source field '{0}' not found in note")]
    SourceFieldNotInNote(String),

    #[error("populator '{0}' does not support batch operation")]
    BatchingUnsupported(String),

    #[error(transparent)]
    Model(#[from] anki_model::Error),

    #[error("external service error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
