//! Query string handling.
//!
//! A query is either `"<group-pattern>/<title-pattern>"` or a bare title
//! pattern. Both segments are case-insensitive regular expressions matched
//! anywhere in the name, so plain substrings work unchanged.

use regex::{Regex, RegexBuilder};

use crate::error::{Error, Result};

/// A parsed query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query<'a> {
    pub group: Option<&'a str>,
    pub title: &'a str,
}

impl<'a> Query<'a> {
    /// Split a raw query at the first `/` into group and title patterns.
    pub fn parse(raw: &'a str) -> Self {
        match raw.split_once('/') {
            Some((group, title)) => Self {
                group: Some(group),
                title,
            },
            None => Self {
                group: None,
                title: raw,
            },
        }
    }
}

/// Compile a pattern for case-insensitive partial matching.
pub(crate) fn compile(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| Error::Pattern {
            pattern: pattern.to_string(),
            source,
        })
}
