//! Backups and restore command implementations

use colored::Colorize;

use rules_core::BackupManager;

use crate::context::Context;
use crate::error::{CliError, Result};

/// Run the backups command
pub fn run_backups(ctx: &Context) -> Result<()> {
    let manager = BackupManager::new(ctx.rules_dir.clone());
    let backups = manager.list_backups()?;

    if backups.is_empty() {
        println!("No backups in {}", manager.backups_dir().as_str());
        return Ok(());
    }

    println!("{}", "Backups".bold());
    for backup in &backups {
        println!(
            "  {} {} ({} file(s), {})",
            "-".green(),
            backup.metadata.run_id.cyan(),
            backup.metadata.files.len(),
            backup.metadata.created.format("%Y-%m-%d %H:%M:%S UTC").to_string().dimmed()
        );
        for file in &backup.metadata.files {
            println!("      {}", file);
        }
    }
    Ok(())
}

/// Run the restore command
///
/// Copies the run's files back; the backup itself is kept.
pub fn run_restore(ctx: &Context, run_id: &str) -> Result<()> {
    let manager = BackupManager::new(ctx.rules_dir.clone());
    let restored = manager.restore_backup(run_id)?;

    if restored.is_empty() {
        return Err(CliError::user(format!("Backup {} holds no files to restore", run_id)));
    }

    for path in &restored {
        println!("   {} {}", "+".green(), path);
    }
    println!(
        "{} Restored {} file(s) from {}.",
        "OK".green().bold(),
        restored.len(),
        run_id.cyan()
    );
    Ok(())
}
