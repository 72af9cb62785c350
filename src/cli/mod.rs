//! CLI module
//!
//! Command-line interface for fetching page posts.
//!
//! # Commands
//!
//! - `posts` - Fetch a page's posts and write them as a table
//! - `check` - Probe a page and token with a single-post request

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{Runner, TOKEN_ENV_VAR};
