//! Command line definition, CLI errors and exit codes

use crate::commands::Command;
use crate::tracing::{LogLevel, TracingFormat};
use clap::{Parser, Subcommand};
use miette::{Diagnostic, Report};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// CLI or configuration error exit code
pub const EXIT_CLI: i32 = 2;
/// Cache, fetch or execution error exit code
pub const EXIT_FAILURE: i32 = 3;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// CLI or configuration error (exit code 2)
    #[error("CLI/configuration error: {message}")]
    #[diagnostic(code(fan::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Cache failure (exit code 3)
    #[error("Cache error: {message}")]
    #[diagnostic(code(fan::cli::cache))]
    Cache {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Download failure (exit code 3)
    #[error("Fetch error: {message}")]
    #[diagnostic(code(fan::cli::fetch))]
    Fetch {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// The target could not be started (exit code 3)
    #[error("Execution error: {message}")]
    #[diagnostic(code(fan::cli::exec))]
    Execution {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

fn help_of(diagnostic: &dyn Diagnostic) -> Option<String> {
    diagnostic.help().map(|h| h.to_string())
}

impl CliError {
    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new cache error with help text
    #[must_use]
    pub fn cache_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a new execution error
    #[must_use]
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
            help: None,
        }
    }
}

impl From<fan_cache::Error> for CliError {
    fn from(err: fan_cache::Error) -> Self {
        Self::Cache {
            help: help_of(&err),
            message: err.to_string(),
        }
    }
}

impl From<crate::fetch::Error> for CliError {
    fn from(err: crate::fetch::Error) -> Self {
        Self::Fetch {
            help: help_of(&err),
            message: err.to_string(),
        }
    }
}

impl From<crate::config::Error> for CliError {
    fn from(err: crate::config::Error) -> Self {
        Self::Config {
            help: help_of(&err),
            message: err.to_string(),
        }
    }
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CLI,
        CliError::Cache { .. } | CliError::Fetch { .. } | CliError::Execution { .. } => {
            EXIT_FAILURE
        }
    }
}

/// Render an error for humans on stderr
pub fn render_error(err: &CliError) {
    let report = Report::new(err.clone());
    eprintln!("{report:?}");
    // Ensure output is flushed before potential process exit
    let _ = io::stderr().flush();
}

/// (F)etch (A)nd ru(N) a remote script or executable.
///
/// Fetched targets are cached locally and reused until they expire.
#[derive(Parser, Debug)]
#[command(name = "fan")]
#[command(about = "(F)etch (A)nd ru(N) a remote script or executable")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the configuration file.
    #[arg(
        long,
        global = true,
        env = "FAN_CONFIG",
        help = "Path to the configuration file",
        value_name = "PATH"
    )]
    pub config: Option<PathBuf>,

    /// Logging verbosity level.
    #[arg(
        short = 'L',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    /// Log output format.
    #[arg(
        long = "log-format",
        global = true,
        help = "Log output format",
        default_value = "compact",
        value_enum
    )]
    pub log_format: TracingFormat,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch (or reuse) a target and run it.
    #[command(about = "Fetch and run a target")]
    Run {
        /// URL or alias of the target.
        #[arg(help = "URL or alias of the target", value_name = "URL|ALIAS")]
        target: String,
        /// Arguments passed to the target unchanged.
        #[arg(
            help = "Arguments passed to the target",
            trailing_var_arg = true,
            allow_hyphen_values = true,
            value_name = "ARGS"
        )]
        args: Vec<String>,
    },
    /// Cache maintenance.
    #[command(about = "Inspect and maintain the cache")]
    Cache {
        /// Cache subcommand to execute.
        #[command(subcommand)]
        subcommand: CacheCommands,
    },
    /// Alias management.
    #[command(about = "Manage fan aliases")]
    Alias {
        /// Alias subcommand to execute.
        #[command(subcommand)]
        subcommand: AliasCommands,
    },
}

/// Cache subcommands.
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Remove expired targets.
    #[command(about = "Check the cache for expired targets and remove them")]
    Clean,
    /// Drop targets regardless of age.
    #[command(about = "Invalidate targets in the cache")]
    Invalidate {
        /// Invalidate every target.
        #[arg(long, help = "Invalidate all targets", conflicts_with = "targets")]
        all: bool,
        /// URLs or aliases to invalidate.
        #[arg(
            help = "URLs or aliases to invalidate",
            value_name = "URL|ALIAS",
            required_unless_present = "all"
        )]
        targets: Vec<String>,
    },
}

/// Alias subcommands.
#[derive(Subcommand, Debug)]
pub enum AliasCommands {
    /// List aliases.
    #[command(about = "List all aliases")]
    List,
    /// Add or replace an alias.
    #[command(about = "Add an alias")]
    Add {
        /// Name of the alias.
        alias: String,
        /// URL the alias expands to.
        url: String,
        /// Skip checking that the URL can be fetched.
        #[arg(long, help = "Do not fail if the URL cannot be reached")]
        force: bool,
    },
    /// Remove aliases.
    #[command(about = "Remove aliases")]
    Remove {
        /// Aliases to remove.
        #[arg(required = true)]
        aliases: Vec<String>,
    },
}

impl Commands {
    /// Convert parsed arguments into the command to execute.
    #[must_use]
    pub fn into_command(self) -> Command {
        match self {
            Self::Run { target, args } => Command::Run { target, args },
            Self::Cache { subcommand } => match subcommand {
                CacheCommands::Clean => Command::CacheClean,
                CacheCommands::Invalidate { all, targets } => {
                    Command::CacheInvalidate { all, targets }
                }
            },
            Self::Alias { subcommand } => match subcommand {
                AliasCommands::List => Command::AliasList,
                AliasCommands::Add { alias, url, force } => {
                    Command::AliasAdd { alias, url, force }
                }
                AliasCommands::Remove { aliases } => Command::AliasRemove { aliases },
            },
        }
    }
}

/// Parse the process arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
