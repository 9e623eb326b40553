//! Entry mutation commands - edit, change-password, rm.

use dialoguer::Confirm;
use tracing::info;
use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::resolve::{self, prompt_failed, CliContext};
use crate::core::store::EditableField;
use crate::error::Result;

/// Change one editable field of an entry.
pub fn edit(ctx: &CliContext, query: &str, field: &str, value: &str) -> Result<()> {
    let field: EditableField = field.parse()?;

    let mut session = resolve::open_session(ctx)?;
    let id = resolve::select_entry(&session, query)?;
    let locator = session.store().locator(id)?;

    session.edit_entry(id, field, value)?;
    info!(entry = %locator, field = %field, "entry updated");

    output::success(&format!("{}: {} updated", locator, field));
    Ok(())
}

/// Change an entry's password.
pub fn change_password(ctx: &CliContext, query: &str, password: Option<String>) -> Result<()> {
    let mut session = resolve::open_session(ctx)?;
    let id = resolve::select_entry(&session, query)?;
    let locator = session.store().locator(id)?;

    let new_password = match password {
        Some(p) => Zeroizing::new(p),
        None => resolve::prompt_new_password("New password")?,
    };

    session.change_password(id, &new_password)?;
    info!(entry = %locator, "password updated");

    output::success(&format!("{}: password updated", locator));
    Ok(())
}

/// Remove an entry, confirming first unless `--yes` was given.
pub fn rm(ctx: &CliContext, query: &str, yes: bool) -> Result<()> {
    let mut session = resolve::open_session(ctx)?;
    let id = resolve::select_entry(&session, query)?;
    let locator = session.store().locator(id)?;

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete {}?", locator))
            .default(false)
            .interact()
            .map_err(prompt_failed)?;
        if !confirmed {
            output::dimmed("aborted");
            return Ok(());
        }
    }

    session.delete_entry(id)?;
    info!(entry = %locator, "entry removed");

    output::success(&format!("{} removed", locator));
    Ok(())
}
