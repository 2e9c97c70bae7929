//! Auth command implementation

use colored::Colorize;

use crate::context::Context;
use crate::error::Result;
use crate::interactive;

/// Run the auth command
///
/// Stores the token given on the command line, or prompts for one.
pub fn run_auth(ctx: &Context, token: Option<String>) -> Result<()> {
    let token = match token {
        Some(token) => token,
        None => interactive::prompt_token()?,
    };

    ctx.credentials.save_token(&token)?;

    println!(
        "{} Token saved to {}",
        "OK".green().bold(),
        ctx.credentials.path().as_str().cyan()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CliOverrides;
    use rules_core::EnvOverrides;
    use tempfile::TempDir;

    fn context(home: &TempDir) -> Context {
        Context::with_config_root(
            home.path(),
            home.path().to_path_buf(),
            &EnvOverrides::default(),
            &CliOverrides::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_auth_saves_token() {
        let home = TempDir::new().unwrap();
        let ctx = context(&home);

        run_auth(&ctx, Some("ghp_abc".into())).unwrap();

        let stored = ctx.credentials.clone().without_env().get_token().unwrap();
        assert_eq!(stored, "ghp_abc");
    }

    #[test]
    fn test_auth_rejects_blank_token() {
        let home = TempDir::new().unwrap();
        let ctx = context(&home);

        assert!(run_auth(&ctx, Some("  ".into())).is_err());
    }
}
