//! Identifiers and identifier sets

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque, globally unique entity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a valid identifier")]
pub struct ParseIdError {
    pub value: String,
}

impl EntityId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(value: &str) -> Result<Self, ParseIdError> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|_| ParseIdError {
                value: value.to_string(),
            })
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for EntityId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<EntityId> for Uuid {
    fn from(value: EntityId) -> Self {
        value.0
    }
}

impl FromStr for EntityId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Set of identifiers with value semantics.
///
/// Iteration order is ascending by identifier, which keeps serialized output
/// stable; callers must not attach meaning to that order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdSet(BTreeSet<EntityId>);

impl IdSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn single(id: EntityId) -> Self {
        let mut set = Self::new();
        set.insert(id);
        set
    }

    /// Returns `true` when the id was not present before.
    pub fn insert(&mut self, id: EntityId) -> bool {
        self.0.insert(id)
    }

    /// Returns `true` when the id was present.
    pub fn remove(&mut self, id: &EntityId) -> bool {
        self.0.remove(id)
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityId> + '_ {
        self.0.iter()
    }

    pub fn union(&self, other: &IdSet) -> IdSet {
        Self(self.0.union(&other.0).copied().collect())
    }

    pub fn difference(&self, other: &IdSet) -> IdSet {
        Self(self.0.difference(&other.0).copied().collect())
    }

    /// Add every id of `other` (add-to-set). Returns `true` if anything changed.
    pub fn add_all(&mut self, other: &IdSet) -> bool {
        let before = self.0.len();
        self.0.extend(other.0.iter().copied());
        self.0.len() != before
    }

    /// Remove every id of `other` (pull). Returns `true` if anything changed.
    pub fn pull_all(&mut self, other: &IdSet) -> bool {
        let before = self.0.len();
        self.0.retain(|id| !other.0.contains(id));
        self.0.len() != before
    }

    pub fn to_uuids(&self) -> Vec<Uuid> {
        self.0.iter().map(EntityId::as_uuid).collect()
    }
}

impl FromIterator<EntityId> for IdSet {
    fn from_iter<T: IntoIterator<Item = EntityId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<EntityId> for IdSet {
    fn extend<T: IntoIterator<Item = EntityId>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl IntoIterator for IdSet {
    type Item = EntityId;
    type IntoIter = std::collections::btree_set::IntoIter<EntityId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a IdSet {
    type Item = &'a EntityId;
    type IntoIter = std::collections::btree_set::Iter<'a, EntityId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<Uuid>> for IdSet {
    fn from(value: Vec<Uuid>) -> Self {
        value.into_iter().map(EntityId::from).collect()
    }
}
