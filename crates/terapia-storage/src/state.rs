use serde::{Serialize, de::DeserializeOwned};

use crate::error::StorageError;
use crate::kv::KeyValueStore;

/// Load a JSON value from a slot. Returns `Ok(None)` if the slot is empty.
pub fn load_state<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serialize a value into its slot representation, for use in a batch.
pub fn encode_state<T: Serialize>(value: &T) -> Result<String, StorageError> {
    Ok(serde_json::to_string(value)?)
}

/// Serialize a value into a single slot.
pub fn save_state<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    store.set(key, &encode_state(value)?)
}
