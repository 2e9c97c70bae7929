//! Rule collections
//!
//! A rule is one tracked text file. A [`RuleCollection`] (a "template") is the
//! named bag of rules that is pushed to and pulled from the remote store,
//! keyed by each rule's path relative to the rules directory.

mod collection;
mod rule;

pub use collection::RuleCollection;
pub use rule::Rule;
