//! Delete command implementation

use colored::Colorize;

use crate::context::Context;
use crate::error::Result;
use crate::interactive;

/// Run the delete command
///
/// Asks for confirmation unless `force` is set. Local files are not touched.
pub fn run_delete(ctx: &Context, name: Option<String>, force: bool) -> Result<()> {
    let store = ctx.store()?;
    let name = ctx.resolve_template(name, store.as_ref())?;

    let summary = store
        .find(&name)?
        .ok_or_else(|| rules_core::Error::TemplateNotFound { name: name.clone() })?;

    if !force && !interactive::confirm_delete(&name)? {
        println!("Deletion cancelled.");
        return Ok(());
    }

    store.delete(&summary.id)?;
    println!("{} Deleted template {}.", "OK".green().bold(), name.cyan());
    Ok(())
}
