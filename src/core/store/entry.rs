//! Entry type and the closed field enumerations.
//!
//! A credential record holds five fixed attributes plus a back-reference to
//! its owning group. The back-reference is an index, not an owning pointer;
//! the group's entry list is the ownership edge.

use std::fmt;
use std::str::FromStr;

use super::group::GroupId;
use crate::error::Error;

/// Identifier of an entry within a store.
///
/// Indexes the store's entry arena. Identifiers are stable across edits but
/// are invalidated by deleting the entry (or its group).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(pub(crate) usize);

/// A single credential record.
#[derive(Clone, PartialEq, Eq)]
pub struct Entry {
    pub(crate) group: GroupId,
    pub(crate) title: String,
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) url: String,
    pub(crate) notes: String,
}

impl Entry {
    pub(crate) fn new(
        group: GroupId,
        title: String,
        username: String,
        password: String,
        url: String,
        notes: String,
    ) -> Self {
        Self {
            group,
            title,
            username,
            password,
            url,
            notes,
        }
    }

    /// Owning group.
    pub fn group(&self) -> GroupId {
        self.group
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// The secret itself. Callers must never log this.
    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Read a single attribute by its closed-enum selector.
    pub fn field(&self, field: ShowField) -> &str {
        match field {
            ShowField::Title => &self.title,
            ShowField::Username => &self.username,
            ShowField::Password => &self.password,
            ShowField::Url => &self.url,
            ShowField::Notes => &self.notes,
        }
    }
}

// Password is masked: Debug output ends up in logs.
impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("group", &self.group)
            .field("title", &self.title)
            .field("username", &self.username)
            .field("password", &"********")
            .field("url", &self.url)
            .field("notes", &self.notes)
            .finish()
    }
}

/// Fields that `edit_entry` may change.
///
/// Password is deliberately absent; password changes go through
/// `change_password` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditableField {
    Username,
    Url,
    Notes,
}

impl EditableField {
    pub fn as_str(self) -> &'static str {
        match self {
            EditableField::Username => "username",
            EditableField::Url => "url",
            EditableField::Notes => "notes",
        }
    }
}

impl FromStr for EditableField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "username" => Ok(EditableField::Username),
            "url" => Ok(EditableField::Url),
            "notes" => Ok(EditableField::Notes),
            _ => Err(Error::InvalidField(s.to_string())),
        }
    }
}

impl fmt::Display for EditableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields that may be printed individually (the `show` command).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowField {
    Title,
    Username,
    Password,
    Url,
    Notes,
}

impl ShowField {
    pub fn as_str(self) -> &'static str {
        match self {
            ShowField::Title => "title",
            ShowField::Username => "username",
            ShowField::Password => "password",
            ShowField::Url => "url",
            ShowField::Notes => "notes",
        }
    }
}

impl FromStr for ShowField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "title" => Ok(ShowField::Title),
            "username" => Ok(ShowField::Username),
            "password" => Ok(ShowField::Password),
            "url" => Ok(ShowField::Url),
            "notes" => Ok(ShowField::Notes),
            _ => Err(Error::InvalidField(s.to_string())),
        }
    }
}

impl fmt::Display for ShowField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
