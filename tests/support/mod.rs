//! Shared helpers for integration tests.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::path::Path;

use strongbox::core::config::StoreConfig;
use strongbox::core::crypto::KdfParams;
use strongbox::Session;

pub const PASSWORD: &str = "test-password";

/// Low KDF cost so tests don't pay the interactive-grade derivation.
pub fn cheap_params() -> KdfParams {
    KdfParams {
        m_cost: 16,
        t_cost: 1,
        p_cost: 1,
    }
}

pub fn config(path: &Path) -> StoreConfig {
    StoreConfig::new(path, PASSWORD, None)
}

/// Create a database at `path` seeded with `(group, title, username)`
/// entries. Groups are created under root on first use.
pub fn seeded_db(path: &Path, entries: &[(&str, &str, &str)]) -> Session {
    let mut session = Session::create_with_params(&config(path), cheap_params()).unwrap();
    for (group, title, username) in entries {
        let gid = match session
            .store()
            .find_group(&format!("^{}$", regex_escape(group)))
            .unwrap()
        {
            Some(gid) => gid,
            None => session.add_group(group, session.store().root()).unwrap(),
        };
        session.add_entry(gid, title, username, "pw", "", "").unwrap();
    }
    session
}

// Enough escaping for the fixture names used in these tests.
fn regex_escape(s: &str) -> String {
    s.chars()
        .flat_map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                vec![c]
            } else {
                vec!['\\', c]
            }
        })
        .collect()
}
