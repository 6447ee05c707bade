use anyhow::Context;
use sqlite_backup::{BackupConfig, BackupRunner, SystemClock};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = BackupConfig::default();
    let runner = BackupRunner::new(config, SystemClock);
    let report = runner
        .run()
        .with_context(|| format!("backup of {:?} failed", runner.config().source_path))?;

    println!("Backup creado: {}", report.file_name);
    Ok(())
}
