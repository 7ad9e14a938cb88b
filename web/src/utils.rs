use gloo::storage::{LocalStorage, Storage};
use serde::{Serialize, de::DeserializeOwned};

/// Local storage key a type is saved under.
pub(crate) trait StorageKey {
    const KEY: &'static str;
}

pub(crate) trait LocalOrDefault: Sized {
    /// Load from local storage, falling back to the default on any error.
    fn local_or_default() -> Self;

    fn local_save(&self);
}

impl<T> LocalOrDefault for T
where
    T: StorageKey + Default + Serialize + DeserializeOwned,
{
    fn local_or_default() -> Self {
        if crate::store::local_storage().is_err() {
            return T::default();
        }
        LocalStorage::get(T::KEY).unwrap_or_default()
    }

    fn local_save(&self) {
        if crate::store::local_storage().is_err() {
            return;
        }
        if let Err(err) = LocalStorage::set(T::KEY, self) {
            log::error!("could not save {}: {:?}", T::KEY, err);
        }
    }
}

/// Helper function to use JavaScript's Math.random
pub(crate) fn js_random_seed() -> u64 {
    use js_sys::Math::random;
    u64::from_be_bytes([
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
    ])
}

/// Milliseconds since the epoch, used to id history entries.
pub(crate) fn now_millis() -> u64 {
    js_sys::Date::now() as u64
}
