//! Resolution of database location, credentials and entry selection.
//!
//! Commands go through one session-opening path: password from the
//! environment, then the encrypted cache sidecar, then an interactive
//! prompt. A cached password that no longer authenticates is dropped and
//! re-prompted once instead of locking the user out for the cache window.

use std::path::PathBuf;

use dialoguer::{Password, Select};
use tracing::debug;
use zeroize::Zeroizing;

use crate::core::cache;
use crate::core::config::{self, StoreConfig};
use crate::core::session::Session;
use crate::core::store::EntryId;
use crate::error::{Error, Result};

/// Global flags shared by every command.
pub struct CliContext {
    pub db: Option<PathBuf>,
    pub keyfile: Option<PathBuf>,
}

/// Open the configured database, returning the session and the resolved
/// config (the config is needed again for comparison copies).
pub fn open_with_config(ctx: &CliContext) -> Result<(Session, StoreConfig)> {
    let path = config::database_path(ctx.db.clone())?;
    let keyfile = config::keyfile_path(ctx.keyfile.clone())?;

    let (password, from_cache) = match config::env_password() {
        Some(pw) => (pw, false),
        None => match cache::load(&path) {
            Some(pw) => (pw, true),
            None => (prompt_password("Database password")?, false),
        },
    };

    let store_config = StoreConfig {
        path,
        password,
        keyfile,
    };

    match Session::open(&store_config) {
        Ok(session) => {
            remember_password(&store_config);
            Ok((session, store_config))
        }
        Err(Error::Authentication) if from_cache => {
            // Stale cache (the database password changed): re-prompt once.
            let _ = cache::forget(&store_config.path);
            let store_config = StoreConfig {
                password: prompt_password("Database password")?,
                ..store_config
            };
            let session = Session::open(&store_config)?;
            remember_password(&store_config);
            Ok((session, store_config))
        }
        Err(e) => Err(e),
    }
}

/// Open the configured database.
pub fn open_session(ctx: &CliContext) -> Result<Session> {
    open_with_config(ctx).map(|(session, _)| session)
}

/// Build the config for creating a new database (password confirmed).
pub fn create_config(ctx: &CliContext) -> Result<StoreConfig> {
    let path = config::database_path(ctx.db.clone())?;
    let keyfile = config::keyfile_path(ctx.keyfile.clone())?;

    let password = match config::env_password() {
        Some(pw) => pw,
        None => prompt_new_password("Database password")?,
    };

    Ok(StoreConfig {
        path,
        password,
        keyfile,
    })
}

/// Resolve a query to exactly one entry, asking the user to pick when
/// several match.
pub fn select_entry(session: &Session, query: &str) -> Result<EntryId> {
    let matches = session.store().find_entries(query, None)?;
    match matches.len() {
        0 => Err(Error::EntryNotFound(query.to_string())),
        1 => Ok(matches[0]),
        _ => {
            let items: Vec<String> = matches
                .iter()
                .map(|id| session.store().locator(*id))
                .collect::<Result<_>>()?;
            let choice = Select::new()
                .with_prompt("Multiple matching entries found, select one")
                .items(&items)
                .default(0)
                .interact()
                .map_err(prompt_failed)?;
            Ok(matches[choice])
        }
    }
}

/// Hidden password prompt.
pub fn prompt_password(prompt: &str) -> Result<Zeroizing<String>> {
    Password::new()
        .with_prompt(prompt)
        .interact()
        .map(Zeroizing::new)
        .map_err(prompt_failed)
}

/// Hidden password prompt with confirmation, for newly chosen passwords.
pub fn prompt_new_password(prompt: &str) -> Result<Zeroizing<String>> {
    Password::new()
        .with_prompt(prompt)
        .with_confirmation("Confirm password", "passwords do not match")
        .interact()
        .map(Zeroizing::new)
        .map_err(prompt_failed)
}

pub(crate) fn prompt_failed(e: dialoguer::Error) -> Error {
    Error::Config(format!("prompt failed: {}", e))
}

fn remember_password(config: &StoreConfig) {
    if let Err(e) = cache::store(&config.path, &config.password) {
        debug!(error = %e, "could not cache password");
    }
}
