//! Session: the open → mutate → atomic save lifecycle.
//!
//! A `Session` is the only way to get a `Store` from disk, and the only
//! component that writes one back. Every mutating operation re-encrypts
//! and atomically replaces the file before returning, so a completed call
//! implies durability and a crash never leaves a half-written database.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::core::codec;
use crate::core::config::StoreConfig;
use crate::core::crypto::{self, CompositeSecret, KdfParams, MasterKey, SALT_LEN};
use crate::core::store::{EditableField, Entry, EntryId, GroupId, Store};
use crate::error::{Error, Result};

/// An open database with its derived key material.
pub struct Session {
    store: Store,
    key: MasterKey,
    params: KdfParams,
    salt: [u8; SALT_LEN],
    path: PathBuf,
}

impl Session {
    /// Open an existing database.
    ///
    /// The container must decode and authenticate in full before a session
    /// exists; there is no partially-open state.
    ///
    /// # Errors
    ///
    /// `Error::DatabaseNotFound` if the file is missing,
    /// `Error::Authentication` for wrong credentials or tampering,
    /// `Error::Format` for a malformed container.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        if !config.path.exists() {
            return Err(Error::DatabaseNotFound(config.path.display().to_string()));
        }

        let secret = CompositeSecret::new(&config.password, config.keyfile.as_deref())?;
        let bytes = fs::read(&config.path)?;
        let decoded = codec::decode(&bytes, &secret)?;

        debug!(path = %config.path.display(), "database opened");
        Ok(Self {
            store: decoded.store,
            key: decoded.key,
            params: decoded.params,
            salt: decoded.salt,
            path: config.path.clone(),
        })
    }

    /// Create a new database with default KDF cost.
    pub fn create(config: &StoreConfig) -> Result<Self> {
        Self::create_with_params(config, KdfParams::default())
    }

    /// Create a new database with explicit KDF cost parameters.
    ///
    /// # Errors
    ///
    /// `Error::DatabaseExists` if the file is already present.
    pub fn create_with_params(config: &StoreConfig, params: KdfParams) -> Result<Self> {
        if config.path.exists() {
            return Err(Error::DatabaseExists(config.path.display().to_string()));
        }

        let secret = CompositeSecret::new(&config.password, config.keyfile.as_deref())?;
        let salt = crypto::random_salt();
        let key = crypto::derive_key(&secret, &salt, params)?;

        let session = Self {
            store: Store::new(),
            key,
            params,
            salt,
            path: config.path.clone(),
        };
        session.save()?;

        info!(path = %session.path.display(), "database created");
        Ok(session)
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-encrypt and atomically replace the database file.
    ///
    /// Writes to a temp file in the same directory, fsyncs, then renames
    /// over the original, so a concurrent reader sees either the old or
    /// the new container, never a partial write.
    pub fn save(&self) -> Result<()> {
        let bytes = codec::encode(&self.store, &self.key, self.params, &self.salt)?;

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "database saved");
        Ok(())
    }

    // Mutating wrappers. The store mutation validates and applies first;
    // a failed mutation leaves the store untouched and skips the save.

    pub fn add_entry(
        &mut self,
        group: GroupId,
        title: &str,
        username: &str,
        password: &str,
        url: &str,
        notes: &str,
    ) -> Result<EntryId> {
        let id = self
            .store
            .add_entry(group, title, username, password, url, notes)?;
        self.save()?;
        Ok(id)
    }

    pub fn delete_entry(&mut self, id: EntryId) -> Result<Entry> {
        let removed = self.store.delete_entry(id)?;
        self.save()?;
        Ok(removed)
    }

    pub fn edit_entry(&mut self, id: EntryId, field: EditableField, value: &str) -> Result<()> {
        self.store.edit_entry(id, field, value)?;
        self.save()
    }

    pub fn change_password(&mut self, id: EntryId, new_password: &str) -> Result<()> {
        self.store.change_password(id, new_password)?;
        self.save()
    }

    pub fn add_group(&mut self, name: &str, parent: GroupId) -> Result<GroupId> {
        let id = self.store.add_group(name, parent)?;
        self.save()?;
        Ok(id)
    }

    pub fn delete_group(&mut self, id: GroupId) -> Result<usize> {
        let removed = self.store.delete_group(id)?;
        self.save()?;
        Ok(removed)
    }
}
