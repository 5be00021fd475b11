//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`KeyValueStore`] on one NVS namespace. On ESP-IDF the
//! namespace handle is opened once and kept for the life of the adapter;
//! `set_i32` stages the value and `commit` makes it durable. If flash or the
//! namespace cannot be opened the adapter still exists but every call fails
//! with [`StoreError::Io`], so the lamp runs on defaults without persistence.
//!
//! The host backend keeps staged and committed values apart so tests can
//! check what survives a reboot.

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::app::ports::KeyValueStore;
use crate::error::StoreError;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// NVS keys and namespaces are limited to 15 bytes plus NUL.
const NVS_NAME_MAX: usize = 15;

pub struct NvsStore {
    #[cfg(target_os = "espidf")]
    handle: Option<nvs_handle_t>,
    #[cfg(not(target_os = "espidf"))]
    staged: HashMap<String, i32>,
    #[cfg(not(target_os = "espidf"))]
    committed: HashMap<String, i32>,
}

#[cfg(target_os = "espidf")]
fn c_name(name: &str) -> [u8; NVS_NAME_MAX + 1] {
    let mut buf = [0u8; NVS_NAME_MAX + 1];
    let bytes = name.as_bytes();
    let len = bytes.len().min(NVS_NAME_MAX);
    buf[..len].copy_from_slice(&bytes[..len]);
    buf
}

#[cfg(target_os = "espidf")]
fn map_esp_err(ret: esp_err_t) -> StoreError {
    if ret == ESP_ERR_NVS_NOT_ENOUGH_SPACE as esp_err_t {
        StoreError::Full
    } else if ret == ESP_ERR_NVS_TYPE_MISMATCH as esp_err_t {
        StoreError::Corrupted
    } else {
        StoreError::Io
    }
}

impl NvsStore {
    /// Initialise NVS flash (erasing it on layout mismatch) and open
    /// `namespace` read-write.
    #[cfg(target_os = "espidf")]
    pub fn open(namespace: &str) -> Self {
        debug_assert!(namespace.len() <= NVS_NAME_MAX);

        // SAFETY: called once from the main task before any other NVS user.
        let mut ret = unsafe { nvs_flash_init() };
        if ret == ESP_ERR_NVS_NO_FREE_PAGES as esp_err_t
            || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as esp_err_t
        {
            warn!("NVS: erasing and re-initialising flash partition");
            // SAFETY: as above.
            ret = unsafe { nvs_flash_erase() };
            if ret == ESP_OK as esp_err_t {
                ret = unsafe { nvs_flash_init() };
            }
        }
        if ret != ESP_OK as esp_err_t {
            warn!("NVS: flash init failed ({}), persistence disabled", ret);
            return Self { handle: None };
        }

        let ns = c_name(namespace);
        let mut handle: nvs_handle_t = 0;
        // SAFETY: `ns` is NUL-terminated and outlives the call.
        let ret = unsafe {
            nvs_open(
                ns.as_ptr().cast(),
                nvs_open_mode_t_NVS_READWRITE,
                &mut handle,
            )
        };
        if ret != ESP_OK as esp_err_t {
            warn!("NVS: open '{}' failed ({}), persistence disabled", namespace, ret);
            return Self { handle: None };
        }
        info!("NVS: namespace '{}' open", namespace);
        Self {
            handle: Some(handle),
        }
    }

    /// In-memory simulation backend.
    #[cfg(not(target_os = "espidf"))]
    pub fn open(namespace: &str) -> Self {
        debug_assert!(namespace.len() <= NVS_NAME_MAX);
        info!("NVS(sim): namespace '{}' open", namespace);
        Self {
            staged: HashMap::new(),
            committed: HashMap::new(),
        }
    }

    /// What a fresh boot would see: committed values only.
    #[cfg(not(target_os = "espidf"))]
    pub fn reopen(&self) -> Self {
        Self {
            staged: self.committed.clone(),
            committed: self.committed.clone(),
        }
    }

    #[cfg(target_os = "espidf")]
    fn handle(&self) -> Result<nvs_handle_t, StoreError> {
        self.handle.ok_or(StoreError::Io)
    }
}

#[cfg(target_os = "espidf")]
impl Drop for NvsStore {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            // SAFETY: handle came from nvs_open and is closed exactly once.
            unsafe { nvs_close(handle) };
        }
    }
}

impl KeyValueStore for NvsStore {
    fn get_i32(&self, key: &str) -> Result<Option<i32>, StoreError> {
        #[cfg(not(target_os = "espidf"))]
        {
            Ok(self.staged.get(key).copied())
        }

        #[cfg(target_os = "espidf")]
        {
            let handle = self.handle()?;
            let k = c_name(key);
            let mut value: i32 = 0;
            // SAFETY: `k` is NUL-terminated; `value` is a valid out-pointer.
            let ret = unsafe { nvs_get_i32(handle, k.as_ptr().cast(), &mut value) };
            if ret == ESP_OK as esp_err_t {
                Ok(Some(value))
            } else if ret == ESP_ERR_NVS_NOT_FOUND as esp_err_t {
                Ok(None)
            } else {
                Err(map_esp_err(ret))
            }
        }
    }

    fn set_i32(&mut self, key: &str, value: i32) -> Result<(), StoreError> {
        #[cfg(not(target_os = "espidf"))]
        {
            self.staged.insert(key.to_owned(), value);
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let handle = self.handle()?;
            let k = c_name(key);
            // SAFETY: `k` is NUL-terminated and outlives the call.
            let ret = unsafe { nvs_set_i32(handle, k.as_ptr().cast(), value) };
            if ret == ESP_OK as esp_err_t {
                Ok(())
            } else {
                Err(map_esp_err(ret))
            }
        }
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        #[cfg(not(target_os = "espidf"))]
        {
            self.committed.clone_from(&self.staged);
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let handle = self.handle()?;
            // SAFETY: handle is open for read-write.
            let ret = unsafe { nvs_commit(handle) };
            if ret == ESP_OK as esp_err_t {
                Ok(())
            } else {
                Err(map_esp_err(ret))
            }
        }
    }
}
