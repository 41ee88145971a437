use thiserror::Error;
use std::path::PathBuf;

#[derive(Error, Debug)]
pub enum Error {
    #[error("package file not found: {0}")]
    NotFound(PathBuf),

    #[error("no recognized Anki database file (collection.anki21 or collection.anki2) found in package")]
    PackageInvalid,

    #[error("output file already exists: {0}")]
    OutputExists(PathBuf),

    #[error("package has already been released")]
    AlreadyReleased,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}

pub type Result<T> = std::result::Result<T, Error>;
