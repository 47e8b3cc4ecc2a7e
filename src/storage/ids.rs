//! Name -> row id tables built during one write transaction

use std::collections::{HashMap, HashSet};

/// Ordered `name -> id` lookup.
///
/// Keeps first-insertion order for iteration; re-inserting a name updates its
/// id in place.
#[derive(Debug, Clone, Default)]
pub struct IdTable {
    entries: Vec<(String, i64)>,
    index: HashMap<String, usize>,
}

impl IdTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, id: i64) {
        match self.index.get(name) {
            Some(&pos) => self.entries[pos].1 = id,
            None => {
                self.index.insert(name.to_string(), self.entries.len());
                self.entries.push((name.to_string(), id));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.index.get(name).map(|&pos| self.entries[pos].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Number of distinct row ids; aliases of one row count once
    pub fn row_count(&self) -> usize {
        self.entries.iter().map(|(_, id)| *id).collect::<HashSet<_>>().len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.entries.iter().map(|(name, id)| (name.as_str(), *id))
    }
}
