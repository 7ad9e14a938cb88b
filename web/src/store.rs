use gloo::storage::errors::StorageError;
use gloo::storage::{LocalStorage, Storage};
use ppt_core::{Slot, SlotStore, StoreError};
use serde_json::Value;

/// Browser storage handle, or [`StoreError::Unavailable`] when the page has none (private mode, sandboxed iframe).
pub(crate) fn local_storage() -> Result<web_sys::Storage, StoreError> {
    gloo::utils::window()
        .local_storage()
        .ok()
        .flatten()
        .ok_or(StoreError::Unavailable)
}

/// [`SlotStore`] backed by the page's `localStorage`.
#[derive(Copy, Clone, Debug, Default)]
pub struct LocalStore;

impl SlotStore for LocalStore {
    fn read(&self, slot: Slot) -> Result<Option<Value>, StoreError> {
        local_storage()?;
        match LocalStorage::get::<Value>(slot.key()) {
            Ok(value) => Ok(Some(value)),
            Err(StorageError::KeyNotFound(_)) => Ok(None),
            Err(StorageError::SerdeError(err)) => {
                log::warn!("{} holds invalid json: {}", slot.key(), err);
                Err(StoreError::Corrupted)
            }
            Err(err) => {
                log::warn!("reading {} failed: {:?}", slot.key(), err);
                Err(StoreError::Unavailable)
            }
        }
    }

    fn write(&mut self, slot: Slot, value: &Value) -> Result<(), StoreError> {
        local_storage()?;
        LocalStorage::set(slot.key(), value).map_err(|err| {
            log::warn!("writing {} failed: {:?}", slot.key(), err);
            StoreError::Unavailable
        })
    }

    fn remove(&mut self, slot: Slot) -> Result<(), StoreError> {
        local_storage()?.remove_item(slot.key()).map_err(|err| {
            log::warn!("removing {} failed: {:?}", slot.key(), err);
            StoreError::Unavailable
        })
    }
}
