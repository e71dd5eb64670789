use std::collections::HashMap;

/// Durable key/value string storage (browser `localStorage` in the client).
pub trait StateStorage {
    fn read(&self, key: &str) -> Result<Option<String>, String>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), String>;
}

/// In-process storage for tests and non-browser hosts.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    writes: usize,
    unavailable: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut storage = Self::new();
        storage.entries.insert(key.to_string(), value.to_string());
        storage
    }

    /// Successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Make every read and write fail, like disabled or full storage.
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl StateStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, String> {
        if self.unavailable {
            return Err("storage unavailable".to_string());
        }
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), String> {
        if self.unavailable {
            return Err("storage unavailable".to_string());
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryStorage, StateStorage};

    #[test]
    fn counts_successful_writes() {
        let mut storage = MemoryStorage::new();
        storage.write("a", "1").expect("write");
        storage.write("a", "2").expect("write");
        assert_eq!(storage.writes(), 2);
        assert_eq!(storage.read("a"), Ok(Some("2".to_string())));
    }

    #[test]
    fn unavailable_storage_fails_without_counting() {
        let mut storage = MemoryStorage::with_entry("a", "1");
        storage.set_unavailable(true);
        assert!(storage.write("a", "2").is_err());
        assert!(storage.read("a").is_err());
        assert_eq!(storage.writes(), 0);
        storage.set_unavailable(false);
        assert_eq!(storage.get("a"), Some("1"));
    }
}
