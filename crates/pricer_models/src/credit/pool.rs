//! Name registry shared by baskets and loss models.

use std::collections::HashMap;

use super::issuer::{DefaultProbKey, Issuer};

#[derive(Debug, Clone)]
struct PoolEntry {
    name: String,
    issuer: Issuer,
    key: DefaultProbKey,
}

/// Ordered map from name to issuer and the credit key used for it.
///
/// Built once and then shared read-only, typically behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Pool {
    entries: Vec<PoolEntry>,
    index: HashMap<String, usize>,
}

impl Pool {
    /// Empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name`. Re-adding a name replaces its issuer and key in place.
    pub fn add(&mut self, name: &str, issuer: Issuer, key: DefaultProbKey) {
        let entry = PoolEntry {
            name: name.to_string(),
            issuer,
            key,
        };
        match self.index.get(name) {
            Some(&i) => self.entries[i] = entry,
            None => {
                self.index.insert(name.to_string(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Issuer registered for `name`.
    pub fn get(&self, name: &str) -> Option<&Issuer> {
        self.index.get(name).map(|&i| &self.entries[i].issuer)
    }

    /// Credit key registered for `name`.
    pub fn default_key(&self, name: &str) -> Option<&DefaultProbKey> {
        self.index.get(name).map(|&i| &self.entries[i].key)
    }

    /// Names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Number of registered names.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// True when `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }
}
