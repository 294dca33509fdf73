//! Implements TabStorage in process memory.
//!
//! Nothing is written to disk: the storage dies with the process, which is
//! this client's equivalent of closing the tab.

use crate::domain::DomainError;
use crate::ports::TabStorage;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// In-memory tab storage. One map behind one lock.
#[derive(Debug, Default)]
pub struct MemoryTabStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryTabStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with `items`. Used to simulate leftovers from
    /// another writer.
    pub fn with_items(items: &[(&str, &str)]) -> Self {
        let map = items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            items: RwLock::new(map),
        }
    }

    pub fn len(&self) -> usize {
        self.items.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: PoisonError<T>) -> DomainError {
    DomainError::Storage("tab storage lock poisoned".into())
}

impl TabStorage for MemoryTabStorage {
    fn get_items(&self, keys: &[&str]) -> Result<Vec<Option<String>>, DomainError> {
        let map = self.items.read().map_err(poisoned)?;
        Ok(keys.iter().map(|k| map.get(*k).cloned()).collect())
    }

    fn set_items(&self, items: &[(&str, &str)]) -> Result<(), DomainError> {
        let mut map = self.items.write().map_err(poisoned)?;
        for (k, v) in items {
            map.insert(k.to_string(), v.to_string());
        }
        Ok(())
    }

    fn remove_items(&self, keys: &[&str]) -> Result<(), DomainError> {
        let mut map = self.items.write().map_err(poisoned)?;
        for k in keys {
            map.remove(*k);
        }
        Ok(())
    }
}
