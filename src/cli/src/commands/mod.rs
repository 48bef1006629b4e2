//! Subcommand implementations.

pub mod add;
pub mod check;
pub mod score;
