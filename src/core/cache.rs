//! Encrypted password cache sidecar.
//!
//! Avoids re-prompting for the database password within a fixed window.
//! The cache is keyed by a locally generated random secret (0600 file)
//! and a salt rotated on every write; entries expire 24 hours after they
//! are written. Strictly best-effort: every failure here degrades to "no
//! cached password" and the engine never depends on it for correctness.
//!
//! Cache file layout: salt (16) | nonce (12) | created-at (8, LE seconds)
//! | ciphertext. The timestamp is the AEAD associated data, so rewinding
//! it fails authentication.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use tracing::debug;
use zeroize::Zeroizing;

use crate::core::constants::CACHE_TTL_HOURS;
use crate::core::crypto::{self, MasterKey, NONCE_LEN, SALT_LEN};
use crate::error::{Error, Result};

const SECRET_FILE: &str = "secret.key";
const PREFIX_LEN: usize = SALT_LEN + NONCE_LEN + 8;

/// Cache the password for a database, replacing any previous entry.
pub fn store(db_path: &Path, password: &str) -> Result<()> {
    write_cache(db_path, password, Utc::now().timestamp())
}

/// Fetch a cached password, if one exists and has not expired.
///
/// All failures (missing cache, expired entry, unreadable secret,
/// authentication mismatch) return `None`.
pub fn load(db_path: &Path) -> Option<Zeroizing<String>> {
    let path = cache_file(db_path)?;
    let bytes = fs::read(&path).ok()?;
    if bytes.len() < PREFIX_LEN {
        return None;
    }

    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&bytes[..SALT_LEN]);
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&bytes[SALT_LEN..SALT_LEN + NONCE_LEN]);
    let mut stamp = [0u8; 8];
    stamp.copy_from_slice(&bytes[SALT_LEN + NONCE_LEN..PREFIX_LEN]);
    let created_at = i64::from_le_bytes(stamp);

    let age = Utc::now().timestamp() - created_at;
    if age < 0 || age >= CACHE_TTL_HOURS * 3600 {
        debug!("cached password expired");
        let _ = fs::remove_file(&path);
        return None;
    }

    let secret = local_secret(path.parent()?).ok()?;
    let key = cache_key(&secret, &salt);
    let plaintext = crypto::open(&key, &nonce, &stamp, &bytes[PREFIX_LEN..]).ok()?;

    debug!("using cached password");
    String::from_utf8(plaintext.to_vec()).ok().map(Zeroizing::new)
}

/// Drop the cached password for a database.
pub fn forget(db_path: &Path) -> Result<()> {
    if let Some(path) = cache_file(db_path) {
        if path.exists() {
            fs::remove_file(&path)?;
            debug!("cached password removed");
        }
    }
    Ok(())
}

fn write_cache(db_path: &Path, password: &str, created_at: i64) -> Result<()> {
    let Some(path) = cache_file(db_path) else {
        return Ok(());
    };
    let Some(dir) = path.parent() else {
        return Ok(());
    };
    fs::create_dir_all(dir)?;

    let secret = local_secret(dir)?;
    let salt = crypto::random_salt();
    let nonce = crypto::random_nonce();
    let stamp = created_at.to_le_bytes();

    let key = cache_key(&secret, &salt);
    let ciphertext = crypto::seal(&key, &nonce, &stamp, password.as_bytes())?;

    let mut out = Vec::with_capacity(PREFIX_LEN + ciphertext.len());
    out.extend_from_slice(&salt);
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&stamp);
    out.extend_from_slice(&ciphertext);

    fs::write(&path, out)?;
    restrict_permissions(&path)?;

    debug!(path = %path.display(), "password cached");
    Ok(())
}

/// Per-database cache file under the user cache directory.
fn cache_file(db_path: &Path) -> Option<PathBuf> {
    let dir = dirs::cache_dir()?.join("strongbox");
    let canonical = db_path
        .canonicalize()
        .unwrap_or_else(|_| db_path.to_path_buf());
    let digest = Sha256::digest(canonical.to_string_lossy().as_bytes());
    let name: String = digest[..8].iter().map(|b| format!("{:02x}", b)).collect();
    Some(dir.join(format!("{}.cache", name)))
}

/// The locally generated cache secret, created on first use.
fn local_secret(dir: &Path) -> Result<Zeroizing<[u8; 32]>> {
    let path = dir.join(SECRET_FILE);
    if path.exists() {
        let bytes = Zeroizing::new(fs::read(&path)?);
        let mut secret = Zeroizing::new([0u8; 32]);
        if bytes.len() != 32 {
            return Err(Error::Config("corrupt cache secret".to_string()));
        }
        secret.copy_from_slice(&bytes);
        return Ok(secret);
    }

    let mut secret = Zeroizing::new([0u8; 32]);
    OsRng.fill_bytes(secret.as_mut_slice());
    fs::write(&path, secret.as_slice())?;
    restrict_permissions(&path)?;
    Ok(secret)
}

fn cache_key(secret: &Zeroizing<[u8; 32]>, salt: &[u8; SALT_LEN]) -> MasterKey {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_slice());
    hasher.update(salt);
    Zeroizing::new(hasher.finalize().into())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
