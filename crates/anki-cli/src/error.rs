use thiserror::Error;

/// Errors this binary can report. Lower crates' errors pass through
/// `#[error(transparent)]`, so a reader only ever sees the concrete message
/// that crate already defined; `Cli` covers concerns specific to this
/// binary (argument decoding, unknown formats) that have no home lower down.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Cli(String),

    #[error(transparent)]
    Engine(#[from] anki_engine::Error),

    #[error(transparent)]
    Ops(#[from] anki_ops::Error),

    #[error(transparent)]
    Recipes(#[from] anki_recipes::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
