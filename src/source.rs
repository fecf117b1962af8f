//! Name Source Module
//!
//! The backing store contract the name cache fetches ID ranges from, and an
//! in-memory implementation that can be seeded from a JSON file.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::{Result, UrlError};

// == Entity Kind ==
/// Forum entities whose names appear in rewritten URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Forum,
    Topic,
    Category,
    /// Rows map a message ID to the ID of the topic it belongs to
    Message,
    Profile,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Forum,
        EntityKind::Topic,
        EntityKind::Category,
        EntityKind::Message,
        EntityKind::Profile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Forum => "forum",
            EntityKind::Topic => "topic",
            EntityKind::Category => "category",
            EntityKind::Message => "message",
            EntityKind::Profile => "profile",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UrlError::InvalidRequest(format!("Unknown entity kind: {}", s)))
    }
}

// == Name Row ==
/// One `(id, name)` row returned by a range fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRow {
    pub id: u64,
    pub name: String,
}

impl NameRow {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

// == Name Source ==
/// Backing store of entity display names.
///
/// Fetches are synchronous and may block; the HTTP layer calls them off the
/// async workers.
pub trait NameSource: Send + Sync {
    /// Returns the rows with IDs in `[low, low + count)`, ordered by ID.
    ///
    /// Fewer than `count` rows is normal; IDs are allocated sparsely.
    fn fetch_range(&self, kind: EntityKind, low: u64, count: u64) -> Result<Vec<NameRow>>;
}

// == Name Seed ==
/// JSON layout accepted by [`MemoryNameSource::from_json`].
///
/// ```json
/// { "forums": { "12": "General Discussion" }, "messages": { "40": 7 } }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NameSeed {
    #[serde(default)]
    pub forums: BTreeMap<u64, String>,
    #[serde(default)]
    pub topics: BTreeMap<u64, String>,
    #[serde(default)]
    pub categories: BTreeMap<u64, String>,
    /// Message ID to owning topic ID
    #[serde(default)]
    pub messages: BTreeMap<u64, u64>,
    #[serde(default)]
    pub profiles: BTreeMap<u64, String>,
}

// == Memory Name Source ==
/// In-process name store with range queries.
#[derive(Debug, Default)]
pub struct MemoryNameSource {
    tables: RwLock<HashMap<EntityKind, BTreeMap<u64, String>>>,
    fetches: AtomicU64,
}

impl MemoryNameSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store holding every row of the seed.
    pub fn from_seed(seed: NameSeed) -> Self {
        let source = Self::new();
        {
            let mut tables = source.tables.write().unwrap_or_else(PoisonError::into_inner);
            tables.insert(EntityKind::Forum, seed.forums);
            tables.insert(EntityKind::Topic, seed.topics);
            tables.insert(EntityKind::Category, seed.categories);
            tables.insert(EntityKind::Profile, seed.profiles);
            tables.insert(
                EntityKind::Message,
                seed.messages
                    .into_iter()
                    .map(|(message, topic)| (message, topic.to_string()))
                    .collect(),
            );
        }
        source
    }

    /// Parses a JSON seed document.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let seed: NameSeed = serde_json::from_str(json)?;
        Ok(Self::from_seed(seed))
    }

    /// Inserts or renames a row.
    pub fn insert(&self, kind: EntityKind, id: u64, name: impl Into<String>) {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        tables.entry(kind).or_default().insert(id, name.into());
    }

    /// Deletes a row, returning true if it existed.
    pub fn remove(&self, kind: EntityKind, id: u64) -> bool {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        tables
            .get_mut(&kind)
            .map(|table| table.remove(&id).is_some())
            .unwrap_or(false)
    }

    /// Number of range fetches served so far.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }
}

impl NameSource for MemoryNameSource {
    fn fetch_range(&self, kind: EntityKind, low: u64, count: u64) -> Result<Vec<NameRow>> {
        self.fetches.fetch_add(1, Ordering::Relaxed);

        let tables = self
            .tables
            .read()
            .map_err(|_| UrlError::Source("name table lock poisoned".to_string()))?;

        let high = low.saturating_add(count);
        Ok(tables
            .get(&kind)
            .map(|table| {
                table
                    .range(low..high)
                    .map(|(id, name)| NameRow::new(*id, name.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_from_str() {
        assert_eq!("forum".parse::<EntityKind>().unwrap(), EntityKind::Forum);
        assert_eq!("Topic".parse::<EntityKind>().unwrap(), EntityKind::Topic);
        assert!("board".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_fetch_range_bounds() {
        let source = MemoryNameSource::new();
        source.insert(EntityKind::Forum, 499, "Last");
        source.insert(EntityKind::Forum, 500, "Next");
        source.insert(EntityKind::Forum, 3, "Third");

        let rows = source.fetch_range(EntityKind::Forum, 0, 500).unwrap();
        assert_eq!(rows, vec![NameRow::new(3, "Third"), NameRow::new(499, "Last")]);
        assert_eq!(source.fetch_count(), 1);
    }

    #[test]
    fn test_fetch_range_unknown_kind_is_empty() {
        let source = MemoryNameSource::new();
        let rows = source.fetch_range(EntityKind::Profile, 0, 500).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_from_json_seed() {
        let json = r#"{
            "forums": { "12": "General Discussion" },
            "messages": { "40": 7 }
        }"#;
        let source = MemoryNameSource::from_json(json).unwrap();

        let forums = source.fetch_range(EntityKind::Forum, 0, 500).unwrap();
        assert_eq!(forums, vec![NameRow::new(12, "General Discussion")]);

        let messages = source.fetch_range(EntityKind::Message, 0, 500).unwrap();
        assert_eq!(messages, vec![NameRow::new(40, "7")]);
    }

    #[test]
    fn test_remove_row() {
        let source = MemoryNameSource::new();
        source.insert(EntityKind::Topic, 5, "Hello");
        assert!(source.remove(EntityKind::Topic, 5));
        assert!(!source.remove(EntityKind::Topic, 5));
        assert!(source.fetch_range(EntityKind::Topic, 0, 500).unwrap().is_empty());
    }
}
