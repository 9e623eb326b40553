//! Show command - print one attribute of one entry.
//!
//! Prints the raw value to stdout with nothing else, so it can be piped
//! into a clipboard tool or another command.

use crate::cli::resolve::{self, CliContext};
use crate::core::store::ShowField;
use crate::error::Result;

pub fn execute(ctx: &CliContext, query: &str, field: &str) -> Result<()> {
    let field: ShowField = field.parse()?;

    let session = resolve::open_session(ctx)?;
    let id = resolve::select_entry(&session, query)?;

    println!("{}", session.store().entry(id)?.field(field));
    Ok(())
}
