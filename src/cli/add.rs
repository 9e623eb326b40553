//! Add command - create a new entry.
//!
//! Anything not supplied as a flag is prompted for. The duplicate-title
//! check runs right after the title is known, before the remaining
//! prompts, so a collision aborts early.

use dialoguer::{Input, Password};
use tracing::info;

use crate::cli::output;
use crate::cli::resolve::{self, prompt_failed, CliContext};
use crate::core::session::Session;
use crate::core::store::GroupId;
use crate::error::{Error, Result};

/// Field values supplied on the command line.
pub struct AddArgs {
    pub group: Option<String>,
    pub title: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub url: Option<String>,
    pub notes: Option<String>,
}

pub fn execute(ctx: &CliContext, args: AddArgs) -> Result<()> {
    let mut session = resolve::open_session(ctx)?;

    let group_pattern = match args.group {
        Some(g) => g,
        None => Input::new()
            .with_prompt("Group name")
            .default("root".to_string())
            .interact_text()
            .map_err(prompt_failed)?,
    };
    let gid = session
        .store()
        .find_group(&group_pattern)?
        .ok_or_else(|| Error::GroupNotFound(group_pattern.clone()))?;
    let group_name = session.store().group(gid)?.name().to_string();

    let title = match args.title {
        Some(t) => t,
        None => Input::new()
            .with_prompt("Title")
            .interact_text()
            .map_err(prompt_failed)?,
    };
    reject_duplicate(&session, gid, &group_name, &title)?;

    let username = text_or_prompt(args.username, "Username")?;
    let password = match args.password {
        Some(p) => p,
        None => Password::new()
            .with_prompt("Password")
            .interact()
            .map_err(prompt_failed)?,
    };
    let url = text_or_prompt(args.url, "URL")?;
    let notes = text_or_prompt(args.notes, "Notes")?;

    session.add_entry(gid, &title, &username, &password, &url, &notes)?;
    info!(group = %group_name, title = %title, "entry added");

    output::section("New entry added");
    output::kv("entry", format!("{}/{}", group_name, title));
    output::kv("username", &username);
    output::kv("password", "********");
    output::kv("url", &url);
    output::kv("notes", &notes);
    Ok(())
}

/// Fail before prompting for the remaining fields when the title is
/// already taken in this group.
fn reject_duplicate(session: &Session, gid: GroupId, group_name: &str, title: &str) -> Result<()> {
    let lowered = title.to_lowercase();
    for eid in session.store().entries_of(gid)? {
        if session.store().entry(eid)?.title().to_lowercase() == lowered {
            return Err(Error::DuplicateEntry {
                group: group_name.to_string(),
                title: title.to_string(),
            });
        }
    }
    Ok(())
}

fn text_or_prompt(value: Option<String>, prompt: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_failed),
    }
}
