//! CLI command handlers
//!
//! Each subcommand of the harmonica CLI is implemented in its own module.

pub mod cache;
pub mod extract;
pub mod helpers;
pub mod search;
pub mod versions;
