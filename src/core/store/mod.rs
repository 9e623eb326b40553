//! In-memory credential store model.
//!
//! A `Store` owns two arenas: groups and entries. Groups form a tree under
//! a fixed root; each group holds ordered identifier lists for its children
//! and entries. Deletion vacates arena slots, so identifiers handed out by
//! lookups stay stable until the referenced item is removed.
//!
//! The model does no I/O; loading and saving belong to the session.

mod entry;
mod group;
mod query;

use std::collections::VecDeque;

use regex::Regex;

pub use entry::{EditableField, Entry, EntryId, ShowField};
pub use group::{Group, GroupId};
pub use query::Query;

use crate::core::constants;
use crate::error::{Error, Result};

/// The decrypted credential database: a tree of groups and entries.
#[derive(Debug, Clone)]
pub struct Store {
    groups: Vec<Option<Group>>,
    entries: Vec<Option<Entry>>,
}

impl Store {
    /// A fresh store containing only the root group.
    pub fn new() -> Self {
        Self {
            groups: vec![Some(Group::new(constants::ROOT_GROUP.to_string(), None))],
            entries: Vec::new(),
        }
    }

    pub(crate) fn from_parts(groups: Vec<Option<Group>>, entries: Vec<Option<Entry>>) -> Self {
        Self { groups, entries }
    }

    /// The root group. Always present, never deletable.
    pub fn root(&self) -> GroupId {
        GroupId(0)
    }

    pub fn group(&self, id: GroupId) -> Result<&Group> {
        self.groups
            .get(id.0)
            .and_then(|slot| slot.as_ref())
            .ok_or_else(|| Error::GroupNotFound(format!("#{}", id.0)))
    }

    fn group_mut(&mut self, id: GroupId) -> Result<&mut Group> {
        self.groups
            .get_mut(id.0)
            .and_then(|slot| slot.as_mut())
            .ok_or_else(|| Error::GroupNotFound(format!("#{}", id.0)))
    }

    pub fn entry(&self, id: EntryId) -> Result<&Entry> {
        self.entries
            .get(id.0)
            .and_then(|slot| slot.as_ref())
            .ok_or_else(|| Error::EntryNotFound(format!("#{}", id.0)))
    }

    fn entry_mut(&mut self, id: EntryId) -> Result<&mut Entry> {
        self.entries
            .get_mut(id.0)
            .and_then(|slot| slot.as_mut())
            .ok_or_else(|| Error::EntryNotFound(format!("#{}", id.0)))
    }

    /// All live groups in breadth-first order from the root.
    ///
    /// This is the canonical traversal order: `find_group` returns the
    /// first match along it, and listings follow it.
    pub fn groups(&self) -> Vec<GroupId> {
        self.subtree(self.root())
    }

    /// Group names in traversal order.
    pub fn group_names(&self) -> Vec<String> {
        self.groups()
            .into_iter()
            .filter_map(|id| self.group(id).ok().map(|g| g.name().to_string()))
            .collect()
    }

    /// Direct entries of a group, in creation order.
    pub fn entries_of(&self, id: GroupId) -> Result<Vec<EntryId>> {
        Ok(self.group(id)?.entries().to_vec())
    }

    /// Every live entry, grouped in traversal order.
    pub fn all_entries(&self) -> Vec<EntryId> {
        self.groups()
            .into_iter()
            .filter_map(|gid| self.group(gid).ok())
            .flat_map(|g| g.entries().iter().copied())
            .collect()
    }

    pub fn group_count(&self) -> usize {
        self.groups().len()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.iter().filter(|slot| slot.is_some()).count()
    }

    /// `"group/title"` identifier of an entry, as shown to users and used
    /// in conflict reports.
    pub fn locator(&self, id: EntryId) -> Result<String> {
        let entry = self.entry(id)?;
        let group = self.group(entry.group())?;
        Ok(format!("{}/{}", group.name(), entry.title()))
    }

    /// First group whose name matches the pattern, breadth-first from root.
    pub fn find_group(&self, pattern: &str) -> Result<Option<GroupId>> {
        let re = query::compile(pattern)?;
        Ok(self
            .groups()
            .into_iter()
            .find(|id| matches!(self.group(*id), Ok(g) if re.is_match(g.name()))))
    }

    /// Search entries by query string.
    ///
    /// With an explicit `group`, the query is a title pattern matched only
    /// against that group's immediate entries. Otherwise the query may be
    /// `"group/title"`; the group pattern selects a subtree to search, and
    /// a group pattern that matches nothing falls back to a store-wide
    /// title search. Results are ordered by (group name, title).
    pub fn find_entries(&self, raw: &str, group: Option<GroupId>) -> Result<Vec<EntryId>> {
        let found = match group {
            Some(id) => {
                self.group(id)?;
                let re = query::compile(raw)?;
                self.matching_entries(&[id], &re)
            }
            None => {
                let q = Query::parse(raw);
                let re = query::compile(q.title)?;
                let scope = match q.group {
                    Some(gpat) => match self.find_group(gpat)? {
                        Some(gid) => self.subtree(gid),
                        None => self.groups(),
                    },
                    None => self.groups(),
                };
                self.matching_entries(&scope, &re)
            }
        };

        let mut keyed: Vec<(String, String, EntryId)> = found
            .into_iter()
            .filter_map(|id| {
                let entry = self.entry(id).ok()?;
                let group = self.group(entry.group()).ok()?;
                Some((group.name().to_string(), entry.title().to_string(), id))
            })
            .collect();
        keyed.sort_by(|a, b| (&a.0, &a.1).cmp(&(&b.0, &b.1)));

        Ok(keyed.into_iter().map(|(_, _, id)| id).collect())
    }

    /// Add a sub-group under `parent`. Group names need not be unique.
    pub fn add_group(&mut self, name: &str, parent: GroupId) -> Result<GroupId> {
        self.group(parent)?;

        let id = GroupId(self.groups.len());
        self.group_mut(parent)?.children.push(id);
        self.groups
            .push(Some(Group::new(name.to_string(), Some(parent))));
        Ok(id)
    }

    /// Delete a group and everything beneath it.
    ///
    /// Returns the number of entries removed by the cascade. The root
    /// group is not deletable.
    pub fn delete_group(&mut self, id: GroupId) -> Result<usize> {
        if id == self.root() {
            return Err(Error::RootGroup);
        }
        let parent = self.group(id)?.parent();

        let doomed = self.subtree(id);
        let mut removed = 0;
        for gid in &doomed {
            let entry_ids = match self.group(*gid) {
                Ok(g) => g.entries().to_vec(),
                Err(_) => continue,
            };
            for eid in entry_ids {
                self.entries[eid.0] = None;
                removed += 1;
            }
        }

        if let Some(parent) = parent {
            if let Ok(p) = self.group_mut(parent) {
                p.children.retain(|c| *c != id);
            }
        }
        for gid in doomed {
            self.groups[gid.0] = None;
        }

        Ok(removed)
    }

    /// Add an entry to a group.
    ///
    /// The title must be case-insensitively unique among the group's
    /// direct entries; on a collision the store is left unchanged.
    pub fn add_entry(
        &mut self,
        group: GroupId,
        title: &str,
        username: &str,
        password: &str,
        url: &str,
        notes: &str,
    ) -> Result<EntryId> {
        let g = self.group(group)?;
        let lowered = title.to_lowercase();
        for eid in g.entries() {
            if let Ok(existing) = self.entry(*eid) {
                if existing.title().to_lowercase() == lowered {
                    return Err(Error::DuplicateEntry {
                        group: g.name().to_string(),
                        title: title.to_string(),
                    });
                }
            }
        }

        let id = EntryId(self.entries.len());
        self.group_mut(group)?.entries.push(id);
        self.entries.push(Some(Entry::new(
            group,
            title.to_string(),
            username.to_string(),
            password.to_string(),
            url.to_string(),
            notes.to_string(),
        )));
        Ok(id)
    }

    /// Delete an entry, returning the removed record.
    pub fn delete_entry(&mut self, id: EntryId) -> Result<Entry> {
        let entry = self.entry(id)?.clone();
        if let Ok(g) = self.group_mut(entry.group()) {
            g.entries.retain(|e| *e != id);
        }
        self.entries[id.0] = None;
        Ok(entry)
    }

    /// Change one editable field of an entry.
    ///
    /// The field set is closed; password changes go through
    /// [`Store::change_password`].
    pub fn edit_entry(&mut self, id: EntryId, field: EditableField, value: &str) -> Result<()> {
        let entry = self.entry_mut(id)?;
        match field {
            EditableField::Username => entry.username = value.to_string(),
            EditableField::Url => entry.url = value.to_string(),
            EditableField::Notes => entry.notes = value.to_string(),
        }
        Ok(())
    }

    pub fn change_password(&mut self, id: EntryId, new_password: &str) -> Result<()> {
        self.entry_mut(id)?.password = new_password.to_string();
        Ok(())
    }

    /// Breadth-first traversal of the subtree rooted at `id`.
    fn subtree(&self, id: GroupId) -> Vec<GroupId> {
        let mut order = Vec::new();
        let mut queue = VecDeque::from([id]);
        while let Some(gid) = queue.pop_front() {
            let Ok(group) = self.group(gid) else { continue };
            order.push(gid);
            queue.extend(group.children().iter().copied());
        }
        order
    }

    fn matching_entries(&self, groups: &[GroupId], re: &Regex) -> Vec<EntryId> {
        groups
            .iter()
            .filter_map(|gid| self.group(*gid).ok())
            .flat_map(|g| g.entries().iter().copied())
            .filter(|eid| matches!(self.entry(*eid), Ok(e) if re.is_match(e.title())))
            .collect()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> Store {
        let mut store = Store::new();
        let my_group = store.add_group("MyGroup", store.root()).unwrap();
        let web = store.add_group("Web", store.root()).unwrap();
        store
            .add_entry(my_group, "gmail", "alice", "pw1", "https://gmail.com", "")
            .unwrap();
        store
            .add_entry(web, "github", "alice", "pw2", "https://github.com", "")
            .unwrap();
        store
    }

    #[test]
    fn test_new_store_has_root_only() {
        let store = Store::new();
        assert_eq!(store.group_names(), vec!["Root"]);
        assert_eq!(store.entry_count(), 0);
        assert!(store.group(store.root()).unwrap().parent().is_none());
    }

    #[test]
    fn test_find_group_first_match_bfs() {
        let mut store = Store::new();
        let a = store.add_group("Accounts", store.root()).unwrap();
        // Deeper group whose name also matches "acc"
        store.add_group("Accounting", a).unwrap();

        let found = store.find_group("acc").unwrap().unwrap();
        assert_eq!(found, a);
    }

    #[test]
    fn test_find_entries_partial_title() {
        let store = sample_store();

        let hits = store.find_entries("gm", None).unwrap();
        assert_eq!(hits.len(), 1);
        let entry = store.entry(hits[0]).unwrap();
        assert_eq!(entry.title(), "gmail");
        assert_eq!(store.group(entry.group()).unwrap().name(), "MyGroup");
    }

    #[test]
    fn test_find_entries_explicit_group_is_non_recursive() {
        let store = sample_store();

        // "gmail" lives in MyGroup, not directly under Root.
        let hits = store.find_entries("gmail", Some(store.root())).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_find_entries_group_slash_title() {
        let store = sample_store();

        let hits = store.find_entries("mygroup/gm", None).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(store.locator(hits[0]).unwrap(), "MyGroup/gmail");
    }

    #[test]
    fn test_find_entries_unmatched_group_falls_back_to_title() {
        let store = sample_store();

        let hits = store.find_entries("nosuchgroup/gmail", None).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(store.locator(hits[0]).unwrap(), "MyGroup/gmail");
    }

    #[test]
    fn test_find_entries_sorted_by_group_then_title() {
        let mut store = Store::new();
        let b = store.add_group("Beta", store.root()).unwrap();
        let a = store.add_group("Alpha", store.root()).unwrap();
        store.add_entry(b, "site2", "", "", "", "").unwrap();
        store.add_entry(b, "site1", "", "", "", "").unwrap();
        store.add_entry(a, "site3", "", "", "", "").unwrap();

        let hits = store.find_entries("site", None).unwrap();
        let locators: Vec<String> = hits
            .iter()
            .map(|id| store.locator(*id).unwrap())
            .collect();
        assert_eq!(locators, vec!["Alpha/site3", "Beta/site1", "Beta/site2"]);
    }

    #[test]
    fn test_add_entry_duplicate_title_rejected() {
        let mut store = sample_store();
        let my_group = store.find_group("MyGroup").unwrap().unwrap();

        let before = store.entry_count();
        let result = store.add_entry(my_group, "GMAIL", "bob", "x", "", "");
        assert!(matches!(result, Err(Error::DuplicateEntry { .. })));
        assert_eq!(store.entry_count(), before);
    }

    #[test]
    fn test_duplicate_title_allowed_across_groups() {
        let mut store = sample_store();
        let web = store.find_group("Web").unwrap().unwrap();

        assert!(store.add_entry(web, "gmail", "bob", "x", "", "").is_ok());
    }

    #[test]
    fn test_edit_entry_fields() {
        let mut store = sample_store();
        let id = store.find_entries("gmail", None).unwrap()[0];

        store.edit_entry(id, EditableField::Username, "bob").unwrap();
        store.edit_entry(id, EditableField::Url, "https://mail.google.com").unwrap();
        store.edit_entry(id, EditableField::Notes, "work account").unwrap();

        let entry = store.entry(id).unwrap();
        assert_eq!(entry.username(), "bob");
        assert_eq!(entry.url(), "https://mail.google.com");
        assert_eq!(entry.notes(), "work account");
        assert_eq!(entry.password(), "pw1");
    }

    #[test]
    fn test_change_password() {
        let mut store = sample_store();
        let id = store.find_entries("gmail", None).unwrap()[0];

        store.change_password(id, "new-pw").unwrap();
        assert_eq!(store.entry(id).unwrap().password(), "new-pw");
    }

    #[test]
    fn test_delete_entry() {
        let mut store = sample_store();
        let id = store.find_entries("gmail", None).unwrap()[0];

        let removed = store.delete_entry(id).unwrap();
        assert_eq!(removed.title(), "gmail");
        assert!(store.entry(id).is_err());
        assert!(store.find_entries("gmail", None).unwrap().is_empty());
    }

    #[test]
    fn test_delete_group_cascades() {
        let mut store = Store::new();
        let outer = store.add_group("Outer", store.root()).unwrap();
        let inner = store.add_group("Inner", outer).unwrap();
        store.add_entry(outer, "one", "", "", "", "").unwrap();
        store.add_entry(inner, "two", "", "", "", "").unwrap();
        store.add_entry(store.root(), "kept", "", "", "", "").unwrap();

        let removed = store.delete_group(outer).unwrap();
        assert_eq!(removed, 2);
        assert!(store.find_entries("one", None).unwrap().is_empty());
        assert!(store.find_entries("two", None).unwrap().is_empty());
        assert_eq!(store.find_entries("kept", None).unwrap().len(), 1);
        assert_eq!(store.group_names(), vec!["Root"]);
    }

    #[test]
    fn test_delete_root_rejected() {
        let mut store = Store::new();
        assert!(matches!(
            store.delete_group(store.root()),
            Err(Error::RootGroup)
        ));
    }

    #[test]
    fn test_stale_id_after_delete() {
        let mut store = sample_store();
        let id = store.find_entries("gmail", None).unwrap()[0];
        store.delete_entry(id).unwrap();

        assert!(matches!(store.entry(id), Err(Error::EntryNotFound(_))));
        assert!(store.change_password(id, "x").is_err());
    }
}
