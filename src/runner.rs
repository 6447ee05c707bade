use crate::clock::Clock;
use crate::error::BackupError;
use crate::sqlite;
use chrono::NaiveDateTime;
use log::info;
use std::path::{Path, PathBuf};

/// Database the grades system keeps in its working directory.
pub const DEFAULT_SOURCE: &str = "calificaciones.db";

const FILE_PREFIX: &str = "backup_";
const FILE_SUFFIX: &str = ".db";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Name of the backup taken at `at`, e.g. `backup_20250523_163258.db`.
pub fn backup_file_name(at: NaiveDateTime) -> String {
    format!("{}{}{}", FILE_PREFIX, at.format(TIMESTAMP_FORMAT), FILE_SUFFIX)
}

/// Backup runner configuration
#[derive(Debug, Clone, PartialEq)]
pub struct BackupConfig {
    /// Path to the database being backed up
    pub source_path: PathBuf,
    /// Directory the backup file is written to
    pub output_dir: PathBuf,
}

impl BackupConfig {
    pub fn new(source_path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            output_dir: output_dir.into(),
        }
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE, ".")
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct BackupReport {
    pub file_name: String,
    pub path: PathBuf,
    pub pages: i32,
}

pub struct BackupRunner<C> {
    config: BackupConfig,
    clock: C,
}

impl<C: Clock> BackupRunner<C> {
    pub fn new(config: BackupConfig, clock: C) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &BackupConfig {
        &self.config
    }

    /// Takes one backup of the configured source.
    ///
    /// On failure no backup file is left behind, except when the name was
    /// already taken, in which case the existing file is untouched.
    pub fn run(&self) -> Result<BackupReport, BackupError> {
        let file_name = backup_file_name(self.clock.now());
        let path = self.config.output_dir.join(&file_name);

        let source = sqlite::open_source(&self.config.source_path)?;
        info!("backing up {:?} to {:?}", self.config.source_path, path);

        let copied = self.copy_into(&source, &path).and_then(|pages| {
            sqlite::close(source).map_err(|source| BackupError::SourceUnavailable {
                path: self.config.source_path.clone(),
                source,
            })?;
            Ok(pages)
        });
        let pages = match copied {
            Ok(pages) => pages,
            Err(err) => {
                if !matches!(err, BackupError::NameCollision { .. }) {
                    sqlite::discard(&path);
                }
                return Err(err);
            }
        };

        info!("backup {:?} complete, {} pages", path, pages);
        Ok(BackupReport {
            file_name,
            path,
            pages,
        })
    }

    // The destination handle lives only inside this call and is dropped on
    // every return path.
    fn copy_into(&self, source: &rusqlite::Connection, path: &Path) -> Result<i32, BackupError> {
        let mut destination = sqlite::create_destination(path)?;
        let pages = sqlite::copy_database(source, &mut destination).map_err(|err| {
            BackupError::CopyFailed {
                from: self.config.source_path.clone(),
                to: path.to_path_buf(),
                source: err,
            }
        })?;
        sqlite::close(destination).map_err(|err| BackupError::DestinationWriteFailure {
            path: path.to_path_buf(),
            source: err.into(),
        })?;
        Ok(pages)
    }
}
