//! List command implementation

use colored::Colorize;

use crate::context::Context;
use crate::error::Result;

/// Run the list command
pub fn run_list(ctx: &Context) -> Result<()> {
    let store = ctx.store()?;
    let mut templates = store.list()?;
    templates.sort_by(|a, b| a.name.cmp(&b.name));

    if templates.is_empty() {
        println!("No templates stored yet.");
        println!("Run {} to upload one.", "cursorrules push <name>".cyan());
        return Ok(());
    }

    println!("{}", "Templates".bold());
    for template in &templates {
        println!("  {} {} {}", "-".green(), template.name.cyan(), template.id.dimmed());
    }
    Ok(())
}
