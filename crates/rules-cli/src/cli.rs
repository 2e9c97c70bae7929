//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use rules_core::Strictness;

/// Cursor Rules CLI - Share `.cursor/rules` between projects through a remote store
#[derive(Parser, Debug)]
#[command(name = "cursorrules")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Rules directory (default: .cursor/rules under the working directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub rules_dir: Option<PathBuf>,

    /// How untracked local files at remote paths are treated
    #[arg(long, global = true, value_enum)]
    pub strictness: Option<StrictnessArg>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Conflict strictness for untracked local files
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrictnessArg {
    /// Any existing file is a conflict
    Path,
    /// Only an existing file with different content is a conflict
    Content,
}

impl From<StrictnessArg> for Strictness {
    fn from(arg: StrictnessArg) -> Self {
        match arg {
            StrictnessArg::Path => Strictness::Path,
            StrictnessArg::Content => Strictness::Content,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Store the GitHub personal access token
    ///
    /// Prompts for the token unless --token is given. The token is saved to
    /// ~/.cursorrules/credentials.json, readable only by you.
    Auth {
        /// Token value (skips the prompt)
        #[arg(long)]
        token: Option<String>,
    },

    /// List templates in the remote store
    List,

    /// Download a template into the rules directory
    ///
    /// Without --force or --merge the pull aborts when any file would
    /// overwrite local changes, and nothing is written.
    ///
    /// Examples:
    ///   cursorrules pull team           # Safe pull, aborts on conflict
    ///   cursorrules pull team --force   # Overwrite, backing up local files
    ///   cursorrules pull team --merge   # Show diffs, then overwrite
    #[command(visible_aliases = ["download", "sync"])]
    Pull {
        /// Template name (defaults to the template last synced here)
        name: Option<String>,

        /// Overwrite conflicting files, backing them up first
        #[arg(long, conflicts_with = "merge")]
        force: bool,

        /// Print a diff of each conflicting file, then overwrite it.
        /// Local content is not merged; the old version is kept as a backup.
        #[arg(long)]
        merge: bool,
    },

    /// Upload the rules directory as a template
    ///
    /// Replaces any template with the same name.
    #[command(visible_alias = "upload")]
    Push {
        /// Template name (defaults to the template last synced here, then
        /// the working directory name)
        name: Option<String>,
    },

    /// Delete a template from the remote store
    Delete {
        /// Template name
        name: Option<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Show how a template compares with the rules directory
    Status {
        /// Template name (defaults to the template last synced here)
        name: Option<String>,
    },

    /// List backup runs in the rules directory
    Backups,

    /// Copy the files of a backup run back into the rules directory
    Restore {
        /// Backup run id, as shown by `cursorrules backups`
        run_id: String,
    },
}
