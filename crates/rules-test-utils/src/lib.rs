//! Shared test utilities for the rules-sync workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`rules`]: [`TestRules`] temporary project with a rules directory

pub mod rules;

pub use rules::TestRules;
