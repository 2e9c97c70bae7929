//! Interactive prompts for CLI commands
//!
//! Uses dialoguer for terminal-based interactive selection.

use dialoguer::{Confirm, Password, Select};

use crate::error::Result;

/// Ask the user to pick one template
pub fn select_template(names: &[String]) -> Result<String> {
    let idx = Select::new()
        .with_prompt("Select a template")
        .items(names)
        .default(0)
        .interact()?;
    Ok(names[idx].clone())
}

/// Ask for confirmation before deleting a template
pub fn confirm_delete(name: &str) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(format!("Really delete template '{}'?", name))
        .default(false)
        .interact()?)
}

/// Read an access token without echoing it
pub fn prompt_token() -> Result<String> {
    Ok(Password::new()
        .with_prompt("GitHub personal access token")
        .interact()?)
}
