//! Forget command - drop the cached password.

use crate::cli::output;
use crate::cli::resolve::CliContext;
use crate::core::{cache, config};
use crate::error::Result;

pub fn execute(ctx: &CliContext) -> Result<()> {
    let path = config::database_path(ctx.db.clone())?;
    cache::forget(&path)?;
    output::success("cached password removed");
    Ok(())
}
