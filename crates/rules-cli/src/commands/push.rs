//! Push command implementation

use colored::Colorize;

use rules_core::{LocalSnapshot, PushOutcome, push_template};

use crate::context::{Context, template_arg};
use crate::error::{CliError, Result};

/// Run the push command
///
/// Uploads every rule file in the rules directory, replacing the remote
/// template of the same name, then records the pushed versions in the
/// ledger.
pub fn run_push(ctx: &Context, name: Option<String>) -> Result<()> {
    let name = match template_arg(name) {
        Some(name) => name,
        None => ctx.ledger_template()?.unwrap_or_else(|| ctx.directory_name()),
    };

    let snapshot = LocalSnapshot::scan(&ctx.rules_dir, &name)?;
    if snapshot.is_empty() {
        return Err(CliError::user(format!(
            "No rule files found in {}",
            ctx.rules_dir.as_str()
        )));
    }

    println!(
        "{} Pushing {} file(s) as template {}...",
        "=>".blue().bold(),
        snapshot.files.len(),
        name.cyan()
    );

    let store = ctx.store()?;
    let outcome = push_template(store.as_ref(), &snapshot)?;
    ctx.engine(Default::default()).record_push(&snapshot)?;

    match outcome {
        PushOutcome::Created { .. } => {
            println!("{} Created template {}.", "OK".green().bold(), name.cyan());
        }
        PushOutcome::Updated { .. } => {
            println!("{} Updated template {}.", "OK".green().bold(), name.cyan());
        }
        PushOutcome::UpToDate { .. } => {
            println!("{} Template {} is already up to date.", "OK".green().bold(), name.cyan());
        }
    }
    Ok(())
}
