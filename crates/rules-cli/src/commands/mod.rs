//! Command implementations for rules-cli

pub mod auth;
pub mod backup;
pub mod delete;
pub mod list;
pub mod pull;
pub mod push;
pub mod status;

pub use auth::run_auth;
pub use backup::{run_backups, run_restore};
pub use delete::run_delete;
pub use list::run_list;
pub use pull::run_pull;
pub use push::run_push;
pub use status::run_status;
