//! Subcommand implementations

pub mod evaluate;
pub mod extract;
pub mod parse;
pub mod tile;
