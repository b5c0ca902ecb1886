// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]
// Commands report to the terminal directly.
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![expect(
    clippy::missing_errors_doc,
    reason = "Errors are CliError variants documented in cli"
)]

//! fan - (F)etch (A)nd ru(N) remote scripts and executables
//!
//! `fan run <url>` downloads a target, stores it in a local cache and runs it
//! with the remaining arguments. Later runs reuse the cached copy until it
//! expires.
//!
//! ```text
//! fan alias add hello https://example.com/hello.sh
//! fan run hello --name world
//! fan cache clean
//! ```
//!
//! The cache itself lives in the `fan-cache` crate; this crate adds the
//! command line, configuration, downloading and process execution.

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod exec;
pub mod fetch;
pub mod tracing;

pub use cli::{CliError, EXIT_CLI, EXIT_FAILURE, EXIT_OK};
pub use config::Config;
pub use context::AppContext;
