use crate::error::{Error, Result};
use anki_model::Collection;
use anki_ops::{Operation, OperationResult};
use anki_package::Package;
use anki_persistence::ChangeLog;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Owns the scoped lifecycle of one run: extracted package, SQL connection,
/// and in-memory collection, acquired in that order. Mirrors `AnkiContext`
/// (`anki_context.py`), reworked from a `__enter__`/`__exit__` context
/// manager into ownership: acquisition happens in [`Context::open`], and
/// release (apply pending changes, repackage, discard the temp directory)
/// happens in the consuming [`Context::finish`] rather than in `Drop`, since
/// packaging can fail and `Drop` cannot report that to the caller.
pub struct Context {
    output_path: Option<PathBuf>,
    read_only: bool,
    package: Package,
    conn: Connection,
    collection: Collection,
    changelog: Option<ChangeLog>,
}

impl Context {
    /// Extracts `apkg_path`, opens its database, and loads the collection.
    /// `output_path` is required unless `read_only` is set.
    pub fn open(apkg_path: impl AsRef<Path>, output_path: Option<PathBuf>, read_only: bool) -> Result<Self> {
        if !read_only && output_path.is_none() {
            return Err(Error::OutputPathRequired);
        }

        let package = Package::open(apkg_path, read_only)?;
        let conn = if read_only {
            anki_persistence::open_read_only(package.db_path())?
        } else {
            anki_persistence::open(package.db_path())?
        };
        let collection = anki_persistence::load(&conn, package.db_version())?;
        let changelog = if read_only { None } else { Some(ChangeLog::new()) };

        Ok(Context {
            output_path,
            read_only,
            package,
            conn,
            collection,
            changelog,
        })
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    fn has_writes(&self) -> bool {
        self.changelog.as_ref().is_some_and(ChangeLog::has_changes)
    }

    /// Runs one operation against the collection, recording its changes in
    /// the run's change log. Mirrors `AnkiContext.run` / `OperationExecutor`.
    pub fn run(&mut self, operation: &mut dyn Operation) -> Result<OperationResult> {
        if !operation.readonly() && self.read_only {
            return Err(Error::WriteInReadOnlyMode);
        }

        operation
            .validate(&self.collection)
            .map_err(|e| Error::ValidationFailed {
                operation: operation.name().to_string(),
                reason: e.to_string(),
            })?;

        let result = match operation.execute(&mut self.collection) {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(operation = operation.name(), error = %e, "operation failed");
                return Err(e.into());
            }
        };

        if result.success {
            tracing::info!(operation = operation.name(), message = %result.message, "operation succeeded");
            if let Some(changelog) = &mut self.changelog {
                changelog.extend(result.changes.clone());
            }
        } else {
            tracing::error!(operation = operation.name(), message = %result.message, "operation reported failure");
        }

        Ok(result)
    }

    /// Applies pending changes and repackages the archive, then discards the
    /// working directory. A read-only context never has a change log (see
    /// [`Context::open`]), so there is never anything to discard here.
    /// Mirrors `AnkiContext._cleanup`/`_package`.
    pub fn finish(mut self) -> Result<()> {
        if !self.has_writes() {
            return Ok(());
        }

        // `open` rejects a non-read-only context without an output path, and
        // `has_writes` is only true when a change log exists, which only
        // happens in a non-read-only context, so this is always populated.
        let output_path = self.output_path.clone().expect("write context always has an output path");
        let changelog = self.changelog.take().unwrap_or_default();
        tracing::info!("applying changes to database before packaging");
        anki_persistence::apply(&mut self.conn, &changelog)?;

        self.package.package(&output_path)?;
        tracing::info!(path = %output_path.display(), "packaged new archive");
        Ok(())
    }
}
