//! Key derivation and authenticated encryption.
//!
//! The master key is derived with Argon2id from a composite secret
//! (password, optionally strengthened with a keyfile digest). Payloads are
//! sealed with ChaCha20-Poly1305; the container header rides along as
//! associated data so header tampering also fails authentication.

use std::fs;
use std::path::Path;

use argon2::{Argon2, Params};
use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    ChaCha20Poly1305, Key, Nonce,
};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Length of the KDF salt stored in the container header.
pub const SALT_LEN: usize = 16;

/// Length of the AEAD nonce stored in the container header.
pub const NONCE_LEN: usize = 12;

/// Length of the derived master key.
pub const KEY_LEN: usize = 32;

/// A derived 32-byte master key, zeroized on drop.
pub type MasterKey = Zeroizing<[u8; KEY_LEN]>;

/// Argon2id cost parameters, stored unencrypted in the container header so
/// decryption parameters are always recoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub m_cost: u32,
    /// Iteration count.
    pub t_cost: u32,
    /// Degree of parallelism.
    pub p_cost: u32,
}

impl Default for KdfParams {
    /// Interactive-use tuning: 64 MiB, 3 passes, 1 lane.
    fn default() -> Self {
        Self {
            m_cost: 64 * 1024,
            t_cost: 3,
            p_cost: 1,
        }
    }
}

impl KdfParams {
    fn to_argon2(self) -> Result<Params> {
        Params::new(self.m_cost, self.t_cost, self.p_cost, Some(KEY_LEN))
            .map_err(|e| Error::Format(format!("unsupported kdf parameters: {}", e)))
    }
}

/// The pre-hashed secret input to the KDF.
///
/// Computed once per credential set and reused across files that share
/// credentials (the main database and its conflict copies each carry their
/// own salt, so the per-file key still differs).
pub struct CompositeSecret(Zeroizing<[u8; 32]>);

impl CompositeSecret {
    /// Build the composite secret from a password and optional keyfile.
    ///
    /// The keyfile contributes `SHA-256(keyfile bytes)`, hashed together
    /// with the password, so either credential alone cannot open the store.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the keyfile cannot be read.
    pub fn new(password: &str, keyfile: Option<&Path>) -> Result<Self> {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        if let Some(path) = keyfile {
            let contents = Zeroizing::new(fs::read(path)?);
            let digest = Sha256::digest(&*contents);
            hasher.update(digest);
        }
        Ok(Self(Zeroizing::new(hasher.finalize().into())))
    }
}

/// Derive the master key for a given salt and cost parameters.
///
/// Deliberately slow; callers must treat this as a blocking call with no
/// cancellation hook.
pub fn derive_key(secret: &CompositeSecret, salt: &[u8; SALT_LEN], params: KdfParams) -> Result<MasterKey> {
    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params.to_argon2()?,
    );

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(secret.0.as_slice(), salt, key.as_mut_slice())
        .map_err(|e| Error::Crypto(format!("key derivation failed: {}", e)))?;

    Ok(key)
}

/// Seal a plaintext under the master key.
///
/// The nonce must be freshly drawn for every write and never reused with
/// the same key.
pub fn seal(key: &MasterKey, nonce: &[u8; NONCE_LEN], aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    cipher(key)
        .encrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|e| Error::Crypto(format!("encryption failed: {:?}", e)))
}

/// Open a sealed payload.
///
/// Any tag mismatch surfaces as `Error::Authentication`: a wrong password,
/// wrong keyfile, and tampered ciphertext are indistinguishable here.
pub fn open(key: &MasterKey, nonce: &[u8; NONCE_LEN], aad: &[u8], ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    cipher(key)
        .decrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map(Zeroizing::new)
        .map_err(|_| Error::Authentication)
}

/// Draw a fresh random KDF salt.
pub fn random_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Draw a fresh random AEAD nonce.
pub fn random_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

fn cipher(key: &MasterKey) -> ChaCha20Poly1305 {
    ChaCha20Poly1305::new(Key::from_slice(key.as_slice()))
}
