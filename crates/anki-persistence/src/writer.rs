use crate::changelog::ChangeLog;
use crate::db_operations::{lower_all, RowOp};
use crate::error::Result;
use rusqlite::Connection;

/// Opens the extracted database read-write, matching the `open_unchecked`
/// pattern from the teacher's catalog crate (no schema-build check here —
/// the schema is owned by the source application, not by this engine).
pub fn open(path: impl AsRef<std::path::Path>) -> Result<Connection> {
    let conn = Connection::open(path)?;
    Ok(conn)
}

pub fn open_read_only(path: impl AsRef<std::path::Path>) -> Result<Connection> {
    let conn = Connection::open_with_flags(path, rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    Ok(conn)
}

/// Applies a change log to the database inside one transaction. Any SQL
/// error rolls the whole transaction back (via `Drop` on an uncommitted
/// `rusqlite::Transaction`) and is surfaced to the caller.
pub fn apply(conn: &mut Connection, log: &ChangeLog) -> Result<()> {
    let ops = lower_all(log.changes())?;
    let tx = conn.transaction()?;
    for op in &ops {
        apply_one(&tx, op)?;
    }
    tx.commit()?;
    Ok(())
}

fn apply_one(tx: &rusqlite::Transaction<'_>, op: &RowOp) -> Result<()> {
    match op {
        RowOp::UpdateCol { column, json_value } => {
            let sql = format!("UPDATE col SET {} = ?1 WHERE id = 1", column);
            tx.execute(&sql, rusqlite::params![json_value])?;
        }
        RowOp::UpdateNoteFields { note_id, flds } => {
            tx.execute(
                "UPDATE notes SET flds = ?1 WHERE id = ?2",
                rusqlite::params![flds, note_id],
            )?;
        }
        RowOp::MigrateNote {
            note_id,
            target_model_id,
            flds,
        } => {
            tx.execute(
                "UPDATE notes SET mid = ?1, flds = ?2 WHERE id = ?3",
                rusqlite::params![target_model_id, flds, note_id],
            )?;
        }
        RowOp::UpdateNoteTags { note_id, tags } => {
            tx.execute(
                "UPDATE notes SET tags = ?1 WHERE id = ?2",
                rusqlite::params![tags, note_id],
            )?;
        }
        RowOp::MoveCard { card_id, deck_id } => {
            tx.execute(
                "UPDATE cards SET did = ?1 WHERE id = ?2",
                rusqlite::params![deck_id, card_id],
            )?;
        }
        RowOp::DeleteNote { note_id } => {
            tx.execute("DELETE FROM notes WHERE id = ?1", rusqlite::params![note_id])?;
        }
        RowOp::DeleteCard { card_id } => {
            tx.execute("DELETE FROM cards WHERE id = ?1", rusqlite::params![card_id])?;
        }
    }
    Ok(())
}
