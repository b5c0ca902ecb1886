//! Command implementations

pub mod alias;
pub mod cache;
pub mod run;

use crate::cli::{CliError, EXIT_OK};
use crate::command_span;
use crate::context::AppContext;

/// A parsed command, independent of the argument parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch if needed, then run a target
    Run {
        /// URL or alias
        target: String,
        /// Arguments for the target
        args: Vec<String>,
    },
    /// Remove expired entries
    CacheClean,
    /// Remove entries regardless of age
    CacheInvalidate {
        /// Purge the whole store
        all: bool,
        /// URLs or aliases to remove
        targets: Vec<String>,
    },
    /// Print all aliases
    AliasList,
    /// Add or replace an alias
    AliasAdd {
        /// Alias name
        alias: String,
        /// URL the alias expands to
        url: String,
        /// Skip the reachability check
        force: bool,
    },
    /// Remove aliases
    AliasRemove {
        /// Alias names
        aliases: Vec<String>,
    },
}

impl Command {
    /// Name used for the command span
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Run { .. } => "run",
            Self::CacheClean => "cache clean",
            Self::CacheInvalidate { .. } => "cache invalidate",
            Self::AliasList => "alias list",
            Self::AliasAdd { .. } => "alias add",
            Self::AliasRemove { .. } => "alias remove",
        }
    }
}

/// Execute `command` and return the process exit code.
pub fn execute(command: Command, ctx: &mut AppContext) -> Result<i32, CliError> {
    let span = command_span!(command.name());
    let _guard = span.enter();

    match command {
        Command::Run { target, args } => run::execute_run(ctx, &target, &args),
        Command::CacheClean => cache::execute_clean(ctx).map(|_| EXIT_OK),
        Command::CacheInvalidate { all, targets } => {
            cache::execute_invalidate(ctx, all, &targets).map(|_| EXIT_OK)
        }
        Command::AliasList => {
            print!("{}", alias::format_alias_list(&ctx.config.aliases));
            Ok(EXIT_OK)
        }
        Command::AliasAdd { alias, url, force } => {
            alias::execute_add(ctx, alias, url, force).map(|()| EXIT_OK)
        }
        Command::AliasRemove { aliases } => {
            alias::execute_remove(ctx, &aliases).map(|_| EXIT_OK)
        }
    }
}
