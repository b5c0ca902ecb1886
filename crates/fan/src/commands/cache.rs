//! `fan cache clean` and `fan cache invalidate`

use crate::cli::CliError;
use crate::context::AppContext;
use fan_cache::{Cache, CleanSummary};
use tracing::info;

/// Remove expired entries from the writable cache.
pub fn execute_clean(ctx: &AppContext) -> Result<CleanSummary, CliError> {
    let summary = ctx.cache.clean()?;
    info!(
        removed = summary.removed,
        retained = summary.retained,
        "Cleaned cache"
    );
    Ok(summary)
}

/// Drop the entries for `targets` (URLs or aliases), or everything with `all`.
///
/// Returns how many entries were removed; a purge reports zero.
pub fn execute_invalidate(
    ctx: &AppContext,
    all: bool,
    targets: &[String],
) -> Result<usize, CliError> {
    if all {
        ctx.cache.purge()?;
        info!("Invalidated all cached targets");
        return Ok(0);
    }

    let mut removed = 0;
    for target in targets {
        let url = ctx.config.resolve(target);
        if ctx.cache.invalidate(url)? {
            info!(url, "Invalidated");
            removed += 1;
        } else {
            info!(url, "Not cached");
        }
    }
    Ok(removed)
}
