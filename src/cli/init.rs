//! Init command - create a new database.

use tracing::info;

use crate::cli::output;
use crate::cli::resolve::{self, CliContext};
use crate::core::session::Session;
use crate::error::Result;

/// Create a new, empty database at the configured path.
pub fn execute(ctx: &CliContext) -> Result<()> {
    let config = resolve::create_config(ctx)?;

    info!(path = %config.path.display(), "creating database");
    let session = Session::create(&config)?;

    output::success(&format!("created {}", session.path().display()));
    output::hint("add your first entry with: strongbox add");
    Ok(())
}
