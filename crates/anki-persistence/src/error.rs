use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Model(#[from] anki_model::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("database error")]
    Sqlite(#[from] rusqlite::Error),

    #[error("collection row missing from 'col' table")]
    MissingColRow,

    #[error("unsupported schema version {0}")]
    UnsupportedSchemaVersion(i64),
}

pub type Result<T> = std::result::Result<T, Error>;
