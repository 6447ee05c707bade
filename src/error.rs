use std::path::{Path, PathBuf};
use thiserror::Error;

/// Ways a backup run can fail.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("source database {path:?} is unavailable")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("cannot write backup database {path:?}")]
    DestinationWriteFailure {
        path: PathBuf,
        #[source]
        source: DestinationCause,
    },

    #[error("backup {path:?} already exists")]
    NameCollision { path: PathBuf },

    #[error("copying {from:?} into {to:?} failed")]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
}

/// Underlying reason a destination could not be created or finalized.
#[derive(Debug, Error)]
pub enum DestinationCause {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

impl BackupError {
    /// Path of the file the error refers to.
    pub fn path(&self) -> &Path {
        match self {
            BackupError::SourceUnavailable { path, .. }
            | BackupError::DestinationWriteFailure { path, .. }
            | BackupError::NameCollision { path } => path,
            BackupError::CopyFailed { to, .. } => to,
        }
    }
}
