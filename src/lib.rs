//! Timestamped online backups of a SQLite database.
//!
//! # Intention
//!
//! - Copy a live database file into a new `backup_<YYYYMMDD_HHMMSS>.db` file
//!   using SQLite's online backup API.
//! - Keep the source path and the wall clock as explicit inputs so a run is
//!   reproducible under test.
//!
//! # Architectural Boundaries
//!
//! - Only backup/database code belongs here.
//! - Printing and exit codes are left to the binary.

pub mod clock;
pub mod error;
pub mod runner;
pub mod sqlite;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::BackupError;
pub use runner::{backup_file_name, BackupConfig, BackupReport, BackupRunner};
