//! Group management commands.

use dialoguer::Confirm;
use tracing::info;

use crate::cli::output;
use crate::cli::resolve::{self, prompt_failed, CliContext};
use crate::error::{Error, Result};

/// Add a group, under the root or under a matched parent group.
pub fn add(ctx: &CliContext, name: &str, parent: Option<&str>) -> Result<()> {
    let mut session = resolve::open_session(ctx)?;

    let parent_id = match parent {
        Some(pattern) => session
            .store()
            .find_group(pattern)?
            .ok_or_else(|| Error::GroupNotFound(pattern.to_string()))?,
        None => session.store().root(),
    };
    let parent_name = session.store().group(parent_id)?.name().to_string();

    session.add_group(name, parent_id)?;
    info!(group = %name, parent = %parent_name, "group added");

    output::success(&format!("group '{}' added under '{}'", name, parent_name));
    Ok(())
}

/// Remove a group and everything beneath it.
pub fn rm(ctx: &CliContext, pattern: &str, yes: bool) -> Result<()> {
    let mut session = resolve::open_session(ctx)?;

    let id = session
        .store()
        .find_group(pattern)?
        .ok_or_else(|| Error::GroupNotFound(pattern.to_string()))?;
    let name = session.store().group(id)?.name().to_string();

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete group '{}' and everything in it?", name))
            .default(false)
            .interact()
            .map_err(prompt_failed)?;
        if !confirmed {
            output::dimmed("aborted");
            return Ok(());
        }
    }

    let removed = session.delete_group(id)?;
    info!(group = %name, entries = removed, "group removed");

    output::success(&format!("group '{}' removed ({} entries)", name, removed));
    Ok(())
}
