//! Conflict detection between divergent copies of a store.
//!
//! File-sync tools resolve concurrent writes by leaving renamed copies next
//! to the original. This module compares the main store against each such
//! copy and reports what diverged; nothing is merged automatically.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::codec;
use crate::core::crypto::CompositeSecret;
use crate::core::store::{EntryId, Store};
use crate::error::Result;

/// Canonical projection of an entry used for set comparison.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct EntryTuple {
    pub group: String,
    pub title: String,
    pub username: String,
    pub password: String,
    pub url: String,
    pub notes: String,
}

impl EntryTuple {
    /// The `"group/title"` identifier shown in reports.
    pub fn locator(&self) -> String {
        format!("{}/{}", self.group, self.title)
    }

    fn key(&self) -> (String, String) {
        (self.group.clone(), self.title.clone())
    }
}

/// The divergence between the main store and one comparison copy.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ComparisonReport {
    missing_in_comparison: BTreeSet<String>,
    missing_in_main: BTreeSet<String>,
    conflicts: BTreeMap<String, BTreeSet<&'static str>>,
}

impl ComparisonReport {
    /// Entries present in the main store only.
    pub fn missing_in_comparison(&self) -> &BTreeSet<String> {
        &self.missing_in_comparison
    }

    /// Entries present in the comparison copy only.
    pub fn missing_in_main(&self) -> &BTreeSet<String> {
        &self.missing_in_main
    }

    /// Entries present in both, keyed by locator, with the fields that
    /// differ.
    pub fn conflicts(&self) -> &BTreeMap<String, BTreeSet<&'static str>> {
        &self.conflicts
    }

    /// Whether the two stores hold identical entry sets.
    pub fn is_clean(&self) -> bool {
        self.missing_in_comparison.is_empty()
            && self.missing_in_main.is_empty()
            && self.conflicts.is_empty()
    }
}

/// Result of examining one candidate copy.
#[derive(Debug)]
pub enum Outcome {
    Compared(ComparisonReport),
    /// The copy exists but could not be read or authenticated; the rest of
    /// the run is unaffected.
    Inaccessible,
}

/// Compare two stores sharing a logical origin.
///
/// Works on the symmetric difference of canonical entry tuples, then
/// resolves each differing tuple by its `(group, title)` key in the
/// counterpart store: found → conflict with the differing fields, not
/// found → missing on that side. Set operations keep this O(entries) plus
/// O(difference) keyed lookups.
pub fn compare(main: &Store, comparison: &Store) -> ComparisonReport {
    let main_set = canonical_set(main);
    let comparison_set = canonical_set(comparison);
    let main_index = key_index(main);
    let comparison_index = key_index(comparison);

    let mut report = ComparisonReport::default();

    for tuple in main_set.difference(&comparison_set) {
        match comparison_index.get(&tuple.key()) {
            Some(other) => {
                report
                    .conflicts
                    .entry(tuple.locator())
                    .or_default()
                    .extend(differing_fields(tuple, other));
            }
            None => {
                report.missing_in_comparison.insert(tuple.locator());
            }
        }
    }

    for tuple in comparison_set.difference(&main_set) {
        match main_index.get(&tuple.key()) {
            Some(ours) => {
                report
                    .conflicts
                    .entry(tuple.locator())
                    .or_default()
                    .extend(differing_fields(ours, tuple));
            }
            None => {
                report.missing_in_main.insert(tuple.locator());
            }
        }
    }

    report
}

/// Candidate conflicting copies of `primary`: every file in the same
/// directory whose name starts with the primary's stem and shares its
/// extension, the primary itself excluded. Sorted by name.
pub fn discover_copies(primary: &Path) -> Result<Vec<PathBuf>> {
    let dir = match primary.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let stem = primary
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = primary
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let primary_name = primary.file_name().map(|n| n.to_os_string());

    let mut copies = Vec::new();
    for dirent in fs::read_dir(dir)? {
        let path = dirent?.path();
        if path.file_name().map(|n| n.to_os_string()) == primary_name {
            continue;
        }
        let candidate_stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let candidate_ext = path
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if candidate_stem.starts_with(&stem) && candidate_ext == extension {
            copies.push(path);
        }
    }
    copies.sort();

    debug!(count = copies.len(), "candidate conflicting copies");
    Ok(copies)
}

/// Compare the main store against every discovered copy.
///
/// A copy that fails to read or authenticate is reported as
/// [`Outcome::Inaccessible`]; the remaining copies are still processed.
pub fn compare_all(
    main: &Store,
    primary: &Path,
    secret: &CompositeSecret,
) -> Result<BTreeMap<String, Outcome>> {
    let mut results = BTreeMap::new();

    for path in discover_copies(primary)? {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let decoded = fs::read(&path)
            .map_err(crate::error::Error::from)
            .and_then(|bytes| codec::decode(&bytes, secret));

        match decoded {
            Ok(decoded) => {
                results.insert(name, Outcome::Compared(compare(main, &decoded.store)));
            }
            Err(e) => {
                warn!(file = %name, error = %e, "comparison copy inaccessible");
                results.insert(name, Outcome::Inaccessible);
            }
        }
    }

    Ok(results)
}

fn tuple_of(store: &Store, id: EntryId) -> Option<EntryTuple> {
    let entry = store.entry(id).ok()?;
    let group = store.group(entry.group()).ok()?;
    Some(EntryTuple {
        group: group.name().to_string(),
        title: entry.title().to_string(),
        username: entry.username().to_string(),
        password: entry.password().to_string(),
        url: entry.url().to_string(),
        notes: entry.notes().to_string(),
    })
}

fn canonical_set(store: &Store) -> BTreeSet<EntryTuple> {
    store
        .all_entries()
        .into_iter()
        .filter_map(|id| tuple_of(store, id))
        .collect()
}

/// Index entries by `(group, title)`. Duplicate keys (possible in imported
/// data) resolve to the first entry in traversal order.
fn key_index(store: &Store) -> BTreeMap<(String, String), EntryTuple> {
    let mut index = BTreeMap::new();
    for id in store.all_entries() {
        if let Some(tuple) = tuple_of(store, id) {
            index.entry(tuple.key()).or_insert(tuple);
        }
    }
    index
}

fn differing_fields(a: &EntryTuple, b: &EntryTuple) -> BTreeSet<&'static str> {
    let mut fields = BTreeSet::new();
    if a.username != b.username {
        fields.insert("username");
    }
    if a.password != b.password {
        fields.insert("password");
    }
    if a.url != b.url {
        fields.insert("url");
    }
    if a.notes != b.notes {
        fields.insert("notes");
    }
    fields
}
