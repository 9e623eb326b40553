//! Listing commands - group names and group entries.

use crate::cli::output;
use crate::cli::resolve::{self, CliContext};
use crate::core::store::{GroupId, Store};
use crate::error::{Error, Result};

/// List all group names, optionally with each group's entries.
pub fn groups(ctx: &CliContext, with_entries: bool) -> Result<()> {
    let session = resolve::open_session(ctx)?;
    let store = session.store();

    if with_entries {
        for id in store.groups() {
            print_group(store, id)?;
        }
    } else {
        output::section("Groups");
        for name in store.group_names() {
            output::list_item(&name);
        }
    }
    Ok(())
}

/// List the entries of the first group matching the pattern.
pub fn entries(ctx: &CliContext, pattern: &str) -> Result<()> {
    let session = resolve::open_session(ctx)?;
    let store = session.store();

    let id = store
        .find_group(pattern)?
        .ok_or_else(|| Error::GroupNotFound(pattern.to_string()))?;
    print_group(store, id)
}

fn print_group(store: &Store, id: GroupId) -> Result<()> {
    let group = store.group(id)?;
    output::section(group.name());
    for eid in store.entries_of(id)? {
        output::list_item(store.entry(eid)?.title());
    }
    Ok(())
}
