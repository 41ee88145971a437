//! Extraction and re-packaging of `.apkg` archives, plus schema-version
//! detection. Grounded on `ApkgManager` (`anki_terminal/persistence/apkg_manager.py`),
//! reimplemented as an RAII guard rather than a `__enter__`/`__exit__`
//! context manager.

mod error;

pub use error::{Error, Result};

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const ANKI21_DB: &str = "collection.anki21";
const ANKI2_DB: &str = "collection.anki2";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbVersion {
    V2,
    V21,
}

impl DbVersion {
    pub fn filename(self) -> &'static str {
        match self {
            DbVersion::V2 => ANKI2_DB,
            DbVersion::V21 => ANKI21_DB,
        }
    }
}

/// Owns the scratch directory a package was extracted into. Dropping it (or
/// calling `release` explicitly) removes the directory; extraction and
/// packaging both happen through this single guard so the temp directory,
/// the SQL connection opened against `db_path`, and the in-memory collection
/// are acquired/released in the well-defined order the executor relies on.
pub struct Package {
    temp_dir: Option<TempDir>,
    db_path: PathBuf,
    db_version: DbVersion,
    read_only: bool,
}

impl Package {
    /// Extracts `apkg_path` into a fresh temporary directory. In read-only
    /// mode only the chosen database file is extracted; otherwise the whole
    /// archive (media files, manifest) is carried so it can be repackaged.
    pub fn open(apkg_path: impl AsRef<Path>, read_only: bool) -> Result<Self> {
        let apkg_path = apkg_path.as_ref();
        if !apkg_path.exists() {
            return Err(Error::NotFound(apkg_path.to_path_buf()));
        }
        tracing::debug!(path = %apkg_path.display(), "opening package");

        let temp_dir = tempfile::tempdir()?;
        let file = File::open(apkg_path)?;
        let mut archive = zip::ZipArchive::new(file)?;

        let has_21 = archive.by_name(ANKI21_DB).is_ok();
        let has_2 = archive.by_name(ANKI2_DB).is_ok();
        let (db_file, db_version) = if has_21 {
            (ANKI21_DB, DbVersion::V21)
        } else if has_2 {
            (ANKI2_DB, DbVersion::V2)
        } else {
            return Err(Error::PackageInvalid);
        };
        tracing::debug!(db_file, ?db_version, "selected database");

        if read_only {
            extract_one(&mut archive, db_file, temp_dir.path())?;
        } else {
            extract_all(&mut archive, temp_dir.path())?;
        }

        let db_path = temp_dir.path().join(db_file);
        if !db_path.exists() {
            return Err(Error::PackageInvalid);
        }

        Ok(Package {
            temp_dir: Some(temp_dir),
            db_path,
            db_version,
            read_only,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn db_version(&self) -> DbVersion {
        self.db_version
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.temp_dir.as_ref().map(|d| d.path())
    }

    /// Writes every file currently in the working directory into a new
    /// deflate-compressed archive at `output_path`.
    pub fn package(&self, output_path: impl AsRef<Path>) -> Result<()> {
        if self.read_only {
            return Err(Error::AlreadyReleased);
        }
        let output_path = output_path.as_ref();
        if output_path.exists() {
            return Err(Error::OutputExists(output_path.to_path_buf()));
        }
        let working_dir = self
            .temp_dir
            .as_ref()
            .ok_or(Error::AlreadyReleased)?
            .path();

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(output_path)?;
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        for entry in walkdir::WalkDir::new(working_dir) {
            let entry = entry.map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry.path().strip_prefix(working_dir).unwrap();
            let name = rel.to_string_lossy().replace('\\', "/");
            zip.start_file(name, options)?;
            let mut f = File::open(entry.path())?;
            io::copy(&mut f, &mut zip)?;
        }
        zip.finish()?;
        tracing::debug!(path = %output_path.display(), "packaging complete");
        Ok(())
    }

    /// Explicitly releases the scratch directory. Also happens on `Drop`.
    pub fn release(&mut self) {
        self.temp_dir.take();
    }
}

fn extract_one<R: Read + io::Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
    dest: &Path,
) -> Result<()> {
    let mut entry = archive.by_name(name)?;
    let out_path = dest.join(name);
    let mut out = File::create(&out_path)?;
    io::copy(&mut entry, &mut out)?;
    Ok(())
}

fn extract_all<R: Read + io::Seek>(archive: &mut zip::ZipArchive<R>, dest: &Path) -> Result<()> {
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let out_path = match entry.enclosed_name() {
            Some(p) => dest.join(p),
            None => continue,
        };
        if entry.is_dir() {
            std::fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&out_path)?;
        io::copy(&mut entry, &mut out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture_apkg(path: &Path, db_filename: &str) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::default();
        zip.start_file(db_filename, options).unwrap();
        zip.write_all(b"not a real sqlite file").unwrap();
        zip.finish().unwrap();
    }

    #[test]
    fn prefers_v21_when_both_present() {
        let dir = tempfile::tempdir().unwrap();
        let apkg_path = dir.path().join("test.apkg");
        let file = File::create(&apkg_path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::default();
        zip.start_file(ANKI2_DB, options).unwrap();
        zip.write_all(b"v2").unwrap();
        zip.start_file(ANKI21_DB, options).unwrap();
        zip.write_all(b"v21").unwrap();
        zip.finish().unwrap();

        let package = Package::open(&apkg_path, true).unwrap();
        assert_eq!(package.db_version(), DbVersion::V21);
    }

    #[test]
    fn falls_back_to_v2() {
        let dir = tempfile::tempdir().unwrap();
        let apkg_path = dir.path().join("test.apkg");
        write_fixture_apkg(&apkg_path, ANKI2_DB);

        let package = Package::open(&apkg_path, true).unwrap();
        assert_eq!(package.db_version(), DbVersion::V2);
    }

    #[test]
    fn missing_database_is_package_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let apkg_path = dir.path().join("test.apkg");
        write_fixture_apkg(&apkg_path, "unrelated.txt");

        let err = Package::open(&apkg_path, true).unwrap_err();
        assert!(matches!(err, Error::PackageInvalid));
    }

    #[test]
    fn package_refuses_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let apkg_path = dir.path().join("test.apkg");
        write_fixture_apkg(&apkg_path, ANKI2_DB);
        let package = Package::open(&apkg_path, false).unwrap();

        let output_path = dir.path().join("out.apkg");
        std::fs::write(&output_path, b"existing").unwrap();

        let err = package.package(&output_path).unwrap_err();
        assert!(matches!(err, Error::OutputExists(_)));
    }
}
