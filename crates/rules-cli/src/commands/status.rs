//! Status command implementation

use colored::Colorize;

use rules_core::{FileStatus, fetch_template};

use crate::context::Context;
use crate::error::Result;

/// Run the status command
///
/// Classifies the remote template against the ledger without writing.
pub fn run_status(ctx: &Context, name: Option<String>) -> Result<()> {
    let store = ctx.store()?;
    let name = ctx.resolve_template(name, store.as_ref())?;
    let remote = fetch_template(store.as_ref(), &name)?;
    let plan = ctx.engine(Default::default()).status(&remote)?;

    println!("{}", "Rules Status".bold());
    println!();
    println!("{}:   {}", "Template".dimmed(), name.cyan());
    println!("{}:   {}", "Rules".dimmed(), ctx.rules_dir.as_str());
    println!("{}:   {}", "Strictness".dimmed(), ctx.settings.strictness);
    println!();

    for file in plan.files() {
        let label = match file.status {
            FileStatus::New => "new".green(),
            FileStatus::Diverged => "diverged".red(),
            FileStatus::Unchanged => "unchanged".dimmed(),
        };
        let marker = if file.conflict { "!".red().bold() } else { " ".normal() };
        println!("  {} {:<10} {}", marker, label, file.path);
    }
    println!();

    let conflicts = plan.conflicts();
    if conflicts.is_empty() {
        println!("{} A pull would apply cleanly.", "OK".green().bold());
    } else {
        println!(
            "{} {} conflicting file(s). Pull with {} or {}.",
            "CONFLICT".red().bold(),
            conflicts.len(),
            "--force".cyan(),
            "--merge".cyan()
        );
    }
    Ok(())
}
