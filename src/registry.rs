use crate::error::MapperError;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::RwLock;

/// A thread-safe map shared by the mapping registry and the profile cache
///
/// Readers clone values out and release the lock before using them, so
/// nothing stored here is ever borrowed across a conversion.
#[derive(Debug)]
pub(crate) struct Registry<K, V>
where
    K: Eq + Hash + Debug,
    V: Send + Sync,
{
    items: RwLock<HashMap<K, V>>,
}

impl<K, V> Registry<K, V>
where
    K: Eq + Hash + Debug,
    V: Send + Sync,
{
    /// Creates a new, empty Registry
    pub(crate) fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }

    /// Stores a value, replacing any previous one
    ///
    /// # Errors
    ///
    /// Returns `MapperError::LockError` if the internal lock cannot be acquired.
    pub(crate) fn insert(&self, key: K, value: V) -> Result<(), MapperError> {
        let mut store = self.items.write().map_err(|_| MapperError::LockError)?;
        store.insert(key, value);
        Ok(())
    }

    /// Retrieves a clone of a value, `None` when the key is absent
    ///
    /// # Errors
    ///
    /// Returns `MapperError::LockError` if the internal lock cannot be acquired.
    pub(crate) fn get(&self, key: &K) -> Result<Option<V>, MapperError>
    where
        V: Clone,
    {
        let store = self.items.read().map_err(|_| MapperError::LockError)?;
        Ok(store.get(key).cloned())
    }

    /// Returns true if the map contains the specified key
    ///
    /// # Errors
    ///
    /// Returns `MapperError::LockError` if the internal lock cannot be acquired.
    pub(crate) fn contains_key(&self, key: &K) -> Result<bool, MapperError> {
        let store = self.items.read().map_err(|_| MapperError::LockError)?;
        Ok(store.contains_key(key))
    }

    /// Returns the number of entries in the map
    ///
    /// # Errors
    ///
    /// Returns `MapperError::LockError` if the internal lock cannot be acquired.
    pub(crate) fn len(&self) -> Result<usize, MapperError> {
        let store = self.items.read().map_err(|_| MapperError::LockError)?;
        Ok(store.len())
    }

    /// Removes every entry
    ///
    /// # Errors
    ///
    /// Returns `MapperError::LockError` if the internal lock cannot be acquired.
    pub(crate) fn clear(&self) -> Result<(), MapperError> {
        let mut store = self.items.write().map_err(|_| MapperError::LockError)?;
        store.clear();
        Ok(())
    }
}

impl<K, V> Default for Registry<K, V>
where
    K: Eq + Hash + Debug,
    V: Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}
