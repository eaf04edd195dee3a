//! Subcommand implementations.

pub mod completion;
pub mod list;
pub mod pack;
