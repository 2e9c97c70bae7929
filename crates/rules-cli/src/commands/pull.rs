//! Pull command implementation

use colored::Colorize;

use rules_core::{FileDiff, Policy, SyncReport, fetch_template};

use crate::context::Context;
use crate::error::{CliError, Result};

/// Run the pull command
///
/// Downloads the template and applies it under the policy selected by the
/// flags. The version ledger is saved once, after all writes.
pub fn run_pull(ctx: &Context, name: Option<String>, force: bool, merge: bool) -> Result<()> {
    let policy = match (force, merge) {
        (_, true) => Policy::Merge,
        (true, false) => Policy::Force,
        (false, false) => Policy::Abort,
    };

    let store = ctx.store()?;
    let name = ctx.resolve_template(name, store.as_ref())?;
    println!("{} Pulling template {}...", "=>".blue().bold(), name.cyan());

    let remote = fetch_template(store.as_ref(), &name)?;
    let engine = ctx.engine(policy);

    let outcome = match engine.pull(&remote) {
        Ok(outcome) => outcome,
        Err(rules_core::Error::Conflict { paths }) => {
            println!("{} Local changes would be overwritten:", "CONFLICT".red().bold());
            for path in &paths {
                println!("   {} {}", "!".red(), path.cyan());
            }
            println!();
            println!(
                "Run with {} to overwrite (local files are backed up) or {} to review diffs first.",
                "--force".cyan(),
                "--merge".cyan()
            );
            return Err(CliError::user(format!(
                "{} conflicting file(s); nothing was written",
                paths.len()
            )));
        }
        Err(e) => return Err(e.into()),
    };

    print_diffs(&outcome.report.diffs);
    print_report(&outcome.report);
    println!(
        "{} Template {} is in sync ({} file(s)).",
        "OK".green().bold(),
        name.cyan(),
        remote.collection.len()
    );
    Ok(())
}

fn print_diffs(diffs: &[FileDiff]) {
    for diff in diffs {
        println!(
            "{} {} ({}, {})",
            "DIFF".yellow().bold(),
            diff.path.cyan(),
            format!("+{}", diff.stats.insertions).green(),
            format!("-{}", diff.stats.deletions).red()
        );
        for line in diff.unified.lines() {
            if line.starts_with("---") || line.starts_with("+++") {
                println!("{}", line.bold());
            } else if line.starts_with("@@") {
                println!("{}", line.cyan());
            } else if line.starts_with('-') {
                println!("{}", line.red());
            } else if line.starts_with('+') {
                println!("{}", line.green());
            } else {
                println!("{}", line);
            }
        }
        println!();
    }
}

fn print_report(report: &SyncReport) {
    for path in &report.written {
        println!("   {} {}", "+".green(), path);
    }
    for path in &report.adopted {
        println!("   {} {} {}", "=".blue(), path, "(already up to date)".dimmed());
    }
    if !report.skipped.is_empty() {
        println!("   {} {} unchanged file(s)", "-".dimmed(), report.skipped.len());
    }
    if let Some(backup) = &report.backup {
        println!(
            "{} Backed up {} file(s) to {}",
            "BACKUP".yellow().bold(),
            backup.metadata.files.len(),
            backup.path.as_str().cyan()
        );
        println!(
            "Run {} to undo.",
            format!("cursorrules restore {}", backup.metadata.run_id).cyan()
        );
    }
}
