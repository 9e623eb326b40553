//! Authenticated container encode/decode.
//!
//! Container layout (all integers little-endian):
//!
//! ```text
//! offset  size  field
//! 0       4     magic "SBX1"
//! 4       2     format version
//! 6       4     Argon2 memory cost (KiB)
//! 10      4     Argon2 time cost
//! 14      4     Argon2 parallelism
//! 18      16    KDF salt
//! 34      12    AEAD nonce
//! 46      8     ciphertext length
//! 54      n     ChaCha20-Poly1305 ciphertext
//! ```
//!
//! The 46-byte prefix through the nonce is the AEAD associated data, so a
//! tampered header fails authentication along with the payload. KDF
//! parameters stay unencrypted so decryption parameters are always
//! recoverable from the file alone.
//!
//! Pure transform: no file I/O happens here.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use crate::core::constants::{FORMAT_VERSION, MAGIC};
use crate::core::crypto::{self, CompositeSecret, KdfParams, MasterKey, NONCE_LEN, SALT_LEN};
use crate::core::store::{Entry, EntryId, Group, GroupId, Store};
use crate::error::{Error, Result};

const HEADER_LEN: usize = 54;
const AAD_LEN: usize = 46;

// Upper bound on header-supplied memory cost (4 GiB). A forged header must
// not be able to demand arbitrary allocations before authentication.
const MAX_M_COST_KIB: u32 = 1 << 22;

/// A successfully decoded container.
///
/// Carries the key material back to the caller so a session can re-encode
/// without paying the KDF again.
pub struct Decoded {
    pub store: Store,
    pub params: KdfParams,
    pub salt: [u8; SALT_LEN],
    pub key: MasterKey,
}

/// Decode and authenticate a container.
///
/// # Errors
///
/// `Error::Format` for a malformed or truncated header/payload;
/// `Error::Authentication` for a wrong password/keyfile or any tampering —
/// the two are indistinguishable by design.
pub fn decode(bytes: &[u8], secret: &CompositeSecret) -> Result<Decoded> {
    let header = Header::parse(bytes)?;

    let body = &bytes[HEADER_LEN..];
    if body.len() as u64 != header.body_len {
        return Err(Error::Format(format!(
            "truncated container: expected {} ciphertext bytes, found {}",
            header.body_len,
            body.len()
        )));
    }

    let key = crypto::derive_key(secret, &header.salt, header.params)?;
    let payload = crypto::open(&key, &header.nonce, &bytes[..AAD_LEN], body)?;

    let wire: WireStore = serde_json::from_slice(&payload)
        .map_err(|e| Error::Format(format!("invalid payload: {}", e)))?;
    let store = from_wire(wire)?;

    debug!(
        groups = store.group_count(),
        entries = store.entry_count(),
        "container decoded"
    );

    Ok(Decoded {
        store,
        params: header.params,
        salt: header.salt,
        key,
    })
}

/// Encode a store into a fresh container.
///
/// The salt and cost parameters are reused from the open container; the
/// nonce is drawn fresh on every call and never reused.
pub fn encode(
    store: &Store,
    key: &MasterKey,
    params: KdfParams,
    salt: &[u8; SALT_LEN],
) -> Result<Vec<u8>> {
    let wire = to_wire(store)?;
    let payload = Zeroizing::new(
        serde_json::to_vec(&wire).map_err(|e| Error::Crypto(format!("serialize failed: {}", e)))?,
    );

    let nonce = crypto::random_nonce();
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len() + 16);
    write_prefix(&mut out, params, salt, &nonce);

    let ciphertext = crypto::seal(key, &nonce, &out[..AAD_LEN], &payload)?;
    out.extend_from_slice(&(ciphertext.len() as u64).to_le_bytes());
    out.extend_from_slice(&ciphertext);

    debug!(bytes = out.len(), "container encoded");
    Ok(out)
}

struct Header {
    params: KdfParams,
    salt: [u8; SALT_LEN],
    nonce: [u8; NONCE_LEN],
    body_len: u64,
}

impl Header {
    fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::Format("container too short".to_string()));
        }
        if bytes[0..4] != MAGIC {
            return Err(Error::Format("not a strongbox database".to_string()));
        }
        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != FORMAT_VERSION {
            return Err(Error::Format(format!(
                "unsupported format version {}",
                version
            )));
        }

        let m_cost = read_u32(bytes, 6);
        let t_cost = read_u32(bytes, 10);
        let p_cost = read_u32(bytes, 14);
        if m_cost > MAX_M_COST_KIB {
            return Err(Error::Format(format!(
                "kdf memory cost {} KiB exceeds the supported maximum",
                m_cost
            )));
        }

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&bytes[18..34]);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[34..46]);
        let mut len_buf = [0u8; 8];
        len_buf.copy_from_slice(&bytes[46..54]);
        let body_len = u64::from_le_bytes(len_buf);

        Ok(Self {
            params: KdfParams {
                m_cost,
                t_cost,
                p_cost,
            },
            salt,
            nonce,
            body_len,
        })
    }
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(buf)
}

fn write_prefix(out: &mut Vec<u8>, params: KdfParams, salt: &[u8; SALT_LEN], nonce: &[u8; NONCE_LEN]) {
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&params.m_cost.to_le_bytes());
    out.extend_from_slice(&params.t_cost.to_le_bytes());
    out.extend_from_slice(&params.p_cost.to_le_bytes());
    out.extend_from_slice(salt);
    out.extend_from_slice(nonce);
}

// Wire representation of the decrypted payload: groups as a flat array in
// traversal order (index = identifier, root first), entries inline.

#[derive(Serialize, Deserialize)]
struct WireStore {
    groups: Vec<WireGroup>,
}

#[derive(Serialize, Deserialize)]
struct WireGroup {
    name: String,
    parent: Option<u32>,
    entries: Vec<WireEntry>,
}

#[derive(Serialize, Deserialize)]
struct WireEntry {
    title: String,
    username: String,
    password: String,
    url: String,
    notes: String,
}

/// Flatten a store for serialization, compacting vacated slots.
fn to_wire(store: &Store) -> Result<WireStore> {
    let order = store.groups();
    let index: HashMap<GroupId, u32> = order
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, i as u32))
        .collect();

    let mut groups = Vec::with_capacity(order.len());
    for gid in &order {
        let group = store.group(*gid)?;
        let entries = group
            .entries()
            .iter()
            .map(|eid| {
                let e = store.entry(*eid)?;
                Ok(WireEntry {
                    title: e.title().to_string(),
                    username: e.username().to_string(),
                    password: e.password().to_string(),
                    url: e.url().to_string(),
                    notes: e.notes().to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        groups.push(WireGroup {
            name: group.name().to_string(),
            parent: group.parent().and_then(|p| index.get(&p).copied()),
            entries,
        });
    }

    Ok(WireStore { groups })
}

/// Rebuild and validate the tree. A malformed tree is rejected wholesale;
/// no partially-populated store is ever returned.
fn from_wire(wire: WireStore) -> Result<Store> {
    let total = wire.groups.len();
    if total == 0 {
        return Err(Error::Format("no root group".to_string()));
    }

    let mut groups: Vec<Option<Group>> = Vec::with_capacity(total);
    let mut entries: Vec<Option<Entry>> = Vec::new();

    for (i, wg) in wire.groups.into_iter().enumerate() {
        let parent = match (i, wg.parent) {
            (0, None) => None,
            (0, Some(_)) => {
                return Err(Error::Format("root group has a parent".to_string()));
            }
            (_, None) => {
                return Err(Error::Format(format!("group {} has no parent", i)));
            }
            (_, Some(p)) => {
                let p = p as usize;
                if p >= total || p == i {
                    return Err(Error::Format(format!(
                        "group {} has invalid parent {}",
                        i, p
                    )));
                }
                Some(GroupId(p))
            }
        };

        let mut group = Group::new(wg.name, parent);
        for we in wg.entries {
            let eid = EntryId(entries.len());
            entries.push(Some(Entry::new(
                GroupId(i),
                we.title,
                we.username,
                we.password,
                we.url,
                we.notes,
            )));
            group.entries.push(eid);
        }
        groups.push(Some(group));
    }

    // Link children in index order, then require every group to be
    // reachable from the root (rejects parent cycles).
    for i in 1..total {
        let parent = groups[i]
            .as_ref()
            .and_then(|g| g.parent)
            .map(|p| p.0)
            .unwrap_or(0);
        if let Some(Some(p)) = groups.get_mut(parent) {
            p.children.push(GroupId(i));
        }
    }

    let store = Store::from_parts(groups, entries);
    if store.group_count() != total {
        return Err(Error::Format(
            "unreachable or cyclic groups in tree".to_string(),
        ));
    }

    Ok(store)
}
