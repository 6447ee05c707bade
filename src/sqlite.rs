//! SQLite handles and the online copy between them.

use crate::error::{BackupError, DestinationCause};
use log::{debug, warn};
use rusqlite::backup::{Backup, Progress};
use rusqlite::{Connection, OpenFlags};
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

/// Pages copied per backup step.
pub const PAGES_PER_STEP: i32 = 100;
/// Pause between steps, giving writers on the source a chance to proceed.
pub const PAUSE_BETWEEN_STEPS: Duration = Duration::from_millis(10);

/// Opens an existing database for reading.
pub fn open_source(path: &Path) -> Result<Connection, BackupError> {
    // OPEN_CREATE isn't passed, so a missing source stays missing
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(
        |source| BackupError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        },
    )?;
    debug!("SQLite version is {}", rusqlite::version());
    Ok(conn)
}

/// Creates `path` and opens it as an empty database.
///
/// Fails with [`BackupError::NameCollision`] if anything already lives at
/// `path`; an existing backup is never overwritten.
pub fn create_destination(path: &Path) -> Result<Connection, BackupError> {
    let write_failure = |cause: DestinationCause| BackupError::DestinationWriteFailure {
        path: path.to_path_buf(),
        source: cause,
    };

    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(_) => {}
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            return Err(BackupError::NameCollision {
                path: path.to_path_buf(),
            });
        }
        Err(err) => return Err(write_failure(err.into())),
    }

    Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE).map_err(|err| {
        discard(path);
        write_failure(err.into())
    })
}

/// Copies every page of `src` into `dst`.
///
/// Returns the number of pages in the finished copy.
pub fn copy_database(src: &Connection, dst: &mut Connection) -> rusqlite::Result<i32> {
    let backup = Backup::new(src, dst)?;
    backup.run_to_completion(PAGES_PER_STEP, PAUSE_BETWEEN_STEPS, Some(log_progress))?;
    Ok(backup.progress().pagecount)
}

fn log_progress(progress: Progress) {
    debug!(
        "backup progress: {}/{} pages",
        progress.pagecount - progress.remaining,
        progress.pagecount
    );
}

/// Closes `conn`, surfacing any error SQLite reports while doing so.
pub fn close(conn: Connection) -> rusqlite::Result<()> {
    conn.close().map_err(|(_, err)| err)
}

/// Best-effort removal of a destination left behind by a failed run.
pub(crate) fn discard(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!("removed incomplete backup {:?}", path),
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => warn!("could not remove incomplete backup {:?}: {}", path, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_source_is_not_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("calificaciones.db");
        let err = open_source(&path).unwrap_err();
        assert!(matches!(err, BackupError::SourceUnavailable { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn destination_refuses_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("backup_20250523_163258.db");
        fs::write(&path, b"keep me").unwrap();
        let err = create_destination(&path).unwrap_err();
        assert!(matches!(err, BackupError::NameCollision { .. }));
        assert_eq!(fs::read(&path).unwrap(), b"keep me");
    }

    #[test]
    fn destination_refuses_existing_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("backup_20250523_163258.db");
        fs::create_dir(&path).unwrap();
        let err = create_destination(&path).unwrap_err();
        assert!(matches!(err, BackupError::NameCollision { .. }));
        assert!(path.is_dir());
    }

    #[test]
    fn destination_in_missing_directory_is_a_write_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no_such_dir").join("backup.db");
        let err = create_destination(&path).unwrap_err();
        assert!(matches!(
            err,
            BackupError::DestinationWriteFailure {
                source: DestinationCause::Io(_),
                ..
            }
        ));
    }

    #[test]
    fn empty_source_gives_empty_copy() {
        let dir = TempDir::new().unwrap();
        let src_path = dir.path().join("calificaciones.db");
        fs::write(&src_path, b"").unwrap();
        let dst_path = dir.path().join("backup_20250523_163258.db");

        let src = open_source(&src_path).unwrap();
        let mut dst = create_destination(&dst_path).unwrap();
        assert_eq!(copy_database(&src, &mut dst).unwrap(), 0);
        close(dst).unwrap();
        close(src).unwrap();

        assert_eq!(fs::metadata(&dst_path).unwrap().len(), 0);
    }

    #[test]
    fn copy_reports_page_count() {
        let src = Connection::open_in_memory().unwrap();
        src.execute_batch(
            "CREATE TABLE t (x INTEGER); INSERT INTO t VALUES (1), (2), (3);",
        )
        .unwrap();
        let mut dst = Connection::open_in_memory().unwrap();
        let pages = copy_database(&src, &mut dst).unwrap();
        assert!(pages > 0);
        let count: i64 = dst
            .query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 3);
    }
}
