use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Administrator tag, grants the management views.
pub const ADMIN: &str = "ADMIN";

/// Regular signed-up user.
pub const USER: &str = "USER";

/// A normalized role tag: trimmed and uppercased.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// Normalize `raw` into a role. Blank input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_uppercase();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_admin(&self) -> bool {
        self.0 == ADMIN
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role data as it shows up on the wire or in older storage: one tag,
/// a comma-separated list, or a JSON array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawRoles {
    One(String),
    Many(Vec<String>),
}

/// The set of roles a user holds. Zero, one or many.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a single tag or a comma-separated list.
    pub fn parse(raw: &str) -> Self {
        raw.split(',').filter_map(Role::parse).collect()
    }

    pub fn from_raw(raw: RawRoles) -> Self {
        match raw {
            RawRoles::One(s) => Self::parse(&s),
            RawRoles::Many(list) => list.iter().flat_map(|s| Self::parse(s).0).collect(),
        }
    }

    pub fn contains(&self, role: &str) -> bool {
        Role::parse(role).is_some_and(|r| self.0.contains(&r))
    }

    /// True when at least one of `required` is held. An empty requirement
    /// list matches nothing.
    pub fn has_any<R: AsRef<str>>(&self, required: &[R]) -> bool {
        required.iter().any(|r| self.contains(r.as_ref()))
    }

    /// True when every one of `required` is held. An empty requirement list
    /// matches nothing.
    pub fn has_all<R: AsRef<str>>(&self, required: &[R]) -> bool {
        !required.is_empty() && required.iter().all(|r| self.contains(r.as_ref()))
    }

    pub fn is_admin(&self) -> bool {
        self.contains(ADMIN)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.0.iter()
    }

    /// Role names in sorted order, the shape they are persisted in.
    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().map(|r| r.as_str().to_string()).collect()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_vec().join(","))
    }
}
