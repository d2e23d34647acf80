//! Key-value storage backends

use std::collections::BTreeMap;

use super::PersistenceError;

/// A string key-value store
pub trait Storage {
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn store(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
    fn remove(&mut self, key: &str) -> Result<(), PersistenceError>;
}

/// In-process storage for native runs and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
    failing: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with one entry
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut storage = Self::new();
        storage.entries.insert(key.to_string(), value.to_string());
        storage
    }

    /// Make every read and write fail, as a full or blocked browser store would
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    fn check(&self) -> Result<(), PersistenceError> {
        if self.failing {
            return Err(PersistenceError::Storage("quota exceeded".to_string()));
        }
        Ok(())
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.check()?;
        Ok(self.entries.get(key).cloned())
    }

    fn store(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.check()?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.check()?;
        self.entries.remove(key);
        Ok(())
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    inner: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    pub fn open() -> Result<Self, PersistenceError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .map(|inner| Self { inner })
            .ok_or(PersistenceError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
fn js_error(e: wasm_bindgen::JsValue) -> PersistenceError {
    PersistenceError::Storage(format!("{:?}", e))
}

#[cfg(target_arch = "wasm32")]
impl Storage for LocalStorage {
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.inner.get_item(key).map_err(js_error)
    }

    fn store(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.inner.set_item(key, value).map_err(js_error)
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.inner.remove_item(key).map_err(js_error)
    }
}
