use std::collections::HashMap;

use crate::StateValue;

/// Key -> current value. Keys are never removed.
#[derive(Default)]
pub(crate) struct Store {
    entries: HashMap<String, StateValue>,
}

impl Store {
    /// First writer wins: returns `false` and leaves the entry alone if `key` exists.
    pub fn insert_if_absent(&mut self, key: &str, value: StateValue) -> bool {
        if self.entries.contains_key(key) {
            return false;
        }
        self.entries.insert(key.to_string(), value);
        true
    }

    pub fn get(&self, key: &str) -> Option<StateValue> {
        self.entries.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Overwrite an existing entry, returning the previous value.
    pub fn replace(&mut self, key: &str, value: StateValue) -> Option<StateValue> {
        self.entries
            .get_mut(key)
            .map(|slot| std::mem::replace(slot, value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }
}
