//! Database location and profile resolution.
//!
//! The database path and keyfile come from command-line flags (which clap
//! already folds together with the `STRONGBOX_DB` / `STRONGBOX_KEYFILE`
//! environment variables) with an optional profile file as the fallback.
//! The profile never stores the password.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;
use zeroize::Zeroizing;

use crate::core::constants;
use crate::error::{Error, Result};

/// Location and credentials used to open or create a store.
///
/// Not persisted; assembled per invocation from flags, environment, the
/// profile, the password cache, or an interactive prompt.
pub struct StoreConfig {
    pub path: PathBuf,
    pub password: Zeroizing<String>,
    pub keyfile: Option<PathBuf>,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>, password: &str, keyfile: Option<PathBuf>) -> Self {
        Self {
            path: path.into(),
            password: Zeroizing::new(password.to_string()),
            keyfile,
        }
    }
}

/// Optional profile at `<config dir>/strongbox/config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Profile {
    pub database: Option<PathBuf>,
    pub keyfile: Option<PathBuf>,
}

impl Profile {
    /// Load the profile, or defaults if none exists.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if a profile exists but is not valid TOML.
    pub fn load() -> Result<Self> {
        let Some(dir) = dirs::config_dir() else {
            return Ok(Self::default());
        };
        let path = dir.join(constants::PROFILE_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        debug!(path = %path.display(), "loading profile");
        let contents = std::fs::read_to_string(&path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("invalid profile {}: {}", path.display(), e)))
    }
}

/// Resolve the database path: flag/environment first, then the profile.
pub fn database_path(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path);
    }
    if let Some(path) = Profile::load()?.database {
        return Ok(path);
    }
    Err(Error::NoDatabase)
}

/// Resolve the keyfile path: flag/environment first, then the profile.
pub fn keyfile_path(flag: Option<PathBuf>) -> Result<Option<PathBuf>> {
    if flag.is_some() {
        return Ok(flag);
    }
    Ok(Profile::load()?.keyfile)
}

/// Password from the environment, if set and non-empty.
pub fn env_password() -> Option<Zeroizing<String>> {
    std::env::var(constants::ENV_PASSWORD)
        .ok()
        .filter(|s| !s.is_empty())
        .map(Zeroizing::new)
}
