//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time (save timestamps)
//! - Storage (LocalStorage on web)

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageBackend;

#[cfg(target_arch = "wasm32")]
mod local_storage {
    use crate::persistence::{SaveBackend, StorageError, StorageResult};

    /// Save record in browser LocalStorage
    #[derive(Debug, Clone, Copy, Default)]
    pub struct LocalStorageBackend;

    impl LocalStorageBackend {
        /// LocalStorage key
        pub const STORAGE_KEY: &'static str = "infiniteRebirthBreaker_saveData";

        fn storage() -> StorageResult<web_sys::Storage> {
            web_sys::window()
                .and_then(|w| w.local_storage().ok())
                .flatten()
                .ok_or(StorageError::Unavailable)
        }
    }

    fn rejected(e: wasm_bindgen::JsValue) -> StorageError {
        StorageError::Rejected(format!("{e:?}"))
    }

    impl SaveBackend for LocalStorageBackend {
        fn read(&self) -> StorageResult<Option<String>> {
            Self::storage()?
                .get_item(Self::STORAGE_KEY)
                .map_err(rejected)
        }

        fn write(&mut self, data: &str) -> StorageResult<()> {
            Self::storage()?
                .set_item(Self::STORAGE_KEY, data)
                .map_err(rejected)
        }

        fn remove(&mut self) -> StorageResult<()> {
            Self::storage()?
                .remove_item(Self::STORAGE_KEY)
                .map_err(rejected)
        }
    }
}
