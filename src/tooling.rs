//! Tooling & Integration Layer
//!
//! The `brickgraph` command line: argument parsing, command dispatch against a
//! `CatalogApi`, and text rendering of results.

pub mod cli;
pub mod format;

pub use cli::{Cli, CliContext, Commands, OutputFormat};
