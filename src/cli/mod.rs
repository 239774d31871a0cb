//! Command-line interface for song-minder.
//!
//! This module provides CLI commands for listing, renaming and tagging the
//! songs of a repository.

mod commands;

pub use commands::{Cli, Commands, run_command};
