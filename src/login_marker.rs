use std::collections::HashMap;

/// Storage key the login flow writes before navigating away from the login screen.
pub const CAME_FROM_LOGIN: &str = "cameFromLogin";

/// TabStorage
///
/// Per-tab ephemeral key/value storage, the counterpart of the browser's `sessionStorage`.
/// It outlives individual mounts of the shell but not the tab itself.
pub trait TabStorage: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str) -> Option<String>;
}

/// MemoryTabStorage
///
/// In-process `TabStorage`, one per registered tab.
#[derive(Debug, Default, Clone)]
pub struct MemoryTabStorage {
    entries: HashMap<String, String>,
}

impl MemoryTabStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TabStorage for MemoryTabStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }
}

/// mark
///
/// Called by the login flow: the next mount in this tab should play the post-login transition.
pub fn mark(storage: &mut impl TabStorage) {
    storage.set(CAME_FROM_LOGIN, "true".to_string());
}

/// take
///
/// Reads and clears the marker in a single step. Returns true only if the stored value was
/// exactly `"true"`. The key is removed regardless of its value, so a marker can be consumed
/// at most once.
pub fn take(storage: &mut impl TabStorage) -> bool {
    storage
        .remove(CAME_FROM_LOGIN)
        .is_some_and(|value| value == "true")
}
