//! Access grants and the two-level permission hierarchy.
//!
//! Access names are either flat tokens (`reports`) or compound tokens
//! (`billing::view`). A grant on the parent scope (`billing`) covers every
//! action beneath it, and a grant named [`ROOT_ACCESS`] covers everything.
//!
//! ```
//! use warden_core::domain::{AccessName, AccessSet};
//!
//! let granted = AccessSet::from_names(["billing"]);
//! assert!(granted.grants(&AccessName::parse("billing::view")));
//! assert!(!granted.grants(&AccessName::parse("reports")));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// Access name that grants every permission.
pub const ROOT_ACCESS: &str = "root";

/// Separator between the parent scope and the action of a compound name.
pub const SCOPE_DELIMITER: &str = "::";

/// A named permission grant owned by a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct Access {
    pub id: Uuid,
    pub name: String,
}

/// A required permission, split into its parent scope when compound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessName<'a> {
    full: &'a str,
    parent: Option<&'a str>,
}

impl<'a> AccessName<'a> {
    /// Split `name` once on the first `::`. Everything before it is the
    /// parent scope; an empty prefix yields no parent.
    pub fn parse(name: &'a str) -> Self {
        let parent = name
            .split_once(SCOPE_DELIMITER)
            .map(|(parent, _)| parent)
            .filter(|parent| !parent.is_empty());

        Self { full: name, parent }
    }

    pub fn full(&self) -> &'a str {
        self.full
    }

    pub fn parent(&self) -> Option<&'a str> {
        self.parent
    }

    pub fn is_compound(&self) -> bool {
        self.parent.is_some()
    }
}

impl fmt::Display for AccessName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full)
    }
}

/// The set of access names a group holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessSet {
    names: HashSet<String>,
}

impl AccessSet {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn is_root(&self) -> bool {
        self.contains(ROOT_ACCESS)
    }

    /// Whether this set authorizes `required`: a `root` grant, a grant on its
    /// parent scope, or a grant on the exact name.
    pub fn grants(&self, required: &AccessName<'_>) -> bool {
        self.is_root()
            || required.parent().is_some_and(|parent| self.contains(parent))
            || self.contains(required.full())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<'a> FromIterator<&'a Access> for AccessSet {
    fn from_iter<T: IntoIterator<Item = &'a Access>>(iter: T) -> Self {
        Self::from_names(iter.into_iter().map(|access| access.name.clone()))
    }
}
