//! Get command - show matching entries in full.

use crate::cli::output;
use crate::cli::resolve::{self, CliContext};
use crate::core::store::{EntryId, Store};
use crate::error::Result;

/// Print every entry matching the query. Passwords stay masked unless
/// explicitly requested.
pub fn execute(ctx: &CliContext, query: &str, show_password: bool) -> Result<()> {
    let session = resolve::open_session(ctx)?;
    let store = session.store();

    let matches = store.find_entries(query, None)?;
    if matches.is_empty() {
        output::dimmed("no matching entry found");
        return Ok(());
    }

    for id in matches {
        print_details(store, id, show_password)?;
    }
    Ok(())
}

fn print_details(store: &Store, id: EntryId, show_password: bool) -> Result<()> {
    let entry = store.entry(id)?;
    output::section(&store.locator(id)?);
    output::kv("username", entry.username());
    if show_password {
        output::kv("password", entry.password());
    } else {
        output::kv("password", "********");
    }
    output::kv("url", entry.url());
    output::kv("notes", entry.notes());
    Ok(())
}
