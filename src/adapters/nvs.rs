//! NVS storage adapter and the persistent config store built on it.
//!
//! `NvsStorage` implements the raw [`StoragePort`]: namespaced key-value
//! blobs in the ESP-IDF NVS partition on device, an in-memory map on the
//! host. `ConfigStore` layers [`ConfigPort`] on top of any storage port,
//! persisting the monitor configuration as a postcard blob and validating
//! every save.
//!
//! NVS writes are atomic at the API level, so a power cut mid-save leaves
//! the previous config intact.

use core::cell::RefCell;

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort, StorageError, StoragePort};
use crate::config::MonitorConfig;

const CONFIG_NAMESPACE: &str = "monitor";
const CONFIG_KEY: &str = "cfg";

/// Upper bound for stored blobs; the config blob is well under this.
const MAX_BLOB_SIZE: usize = 512;

// ───────────────────────────────────────────────────────────────
// NvsStorage
// ───────────────────────────────────────────────────────────────

/// Key-value blob storage: NVS on device, in-memory map on host.
pub struct NvsStorage {
    #[cfg(not(target_os = "espidf"))]
    store: RefCell<std::collections::HashMap<String, Vec<u8>>>,
}

impl NvsStorage {
    /// Initialise the backing store. On device this initialises the NVS
    /// flash partition, erasing and retrying once if the partition was
    /// truncated or written by a newer layout.
    pub fn new() -> Result<Self, StorageError> {
        #[cfg(target_os = "espidf")]
        {
            use esp_idf_svc::sys::*;
            let mut ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS partition needs erase (rc={}), erasing", ret);
                let erase_ret = unsafe { nvs_flash_erase() };
                if erase_ret != ESP_OK as i32 {
                    return Err(StorageError::IoError);
                }
                ret = unsafe { nvs_flash_init() };
            }
            if ret != ESP_OK as i32 {
                return Err(StorageError::IoError);
            }
            Ok(Self {})
        }

        #[cfg(not(target_os = "espidf"))]
        {
            Ok(Self {
                store: RefCell::new(std::collections::HashMap::new()),
            })
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    /// Open an NVS namespace, run `f` with the handle, then commit (on
    /// writes) and close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(namespace: &str, write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(esp_idf_svc::sys::nvs_handle_t) -> Result<T, i32>,
    {
        use esp_idf_svc::sys::*;

        let mut ns = [0u8; 16];
        let n = namespace.len().min(ns.len() - 1);
        ns[..n].copy_from_slice(&namespace.as_bytes()[..n]);

        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let mut handle: nvs_handle_t = 0;
        let ret = unsafe { nvs_open(ns.as_ptr().cast(), mode, &mut handle) };
        if ret != ESP_OK as i32 {
            return Err(ret);
        }

        let result = f(handle);

        if write && result.is_ok() {
            let _ = unsafe { nvs_commit(handle) };
        }
        unsafe { nvs_close(handle) };
        result
    }

    #[cfg(target_os = "espidf")]
    fn key_cstr(key: &str) -> [u8; 16] {
        let mut buf = [0u8; 16];
        let n = key.len().min(buf.len() - 1);
        buf[..n].copy_from_slice(&key.as_bytes()[..n]);
        buf
    }
}

impl StoragePort for NvsStorage {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            match self.store.borrow().get(&composite) {
                Some(v) => {
                    let len = v.len().min(buf.len());
                    buf[..len].copy_from_slice(&v[..len]);
                    Ok(len)
                }
                None => Err(StorageError::NotFound),
            }
        }

        #[cfg(target_os = "espidf")]
        {
            use esp_idf_svc::sys::*;
            let key_c = Self::key_cstr(key);
            let result = Self::with_nvs_handle(namespace, false, |handle| {
                let mut size: usize = 0;
                let ret = unsafe {
                    nvs_get_blob(handle, key_c.as_ptr().cast(), core::ptr::null_mut(), &mut size)
                };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                if size == 0 || size > MAX_BLOB_SIZE || size > buf.len() {
                    return Err(ESP_ERR_NVS_INVALID_LENGTH);
                }
                let ret = unsafe {
                    nvs_get_blob(handle, key_c.as_ptr().cast(), buf.as_mut_ptr().cast(), &mut size)
                };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                Ok(size)
            });
            result.map_err(|e| {
                if e == ESP_ERR_NVS_NOT_FOUND {
                    StorageError::NotFound
                } else {
                    StorageError::IoError
                }
            })
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        if data.len() > MAX_BLOB_SIZE {
            return Err(StorageError::Full);
        }

        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.borrow_mut().insert(composite, data.to_vec());
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            use esp_idf_svc::sys::*;
            let key_c = Self::key_cstr(key);
            Self::with_nvs_handle(namespace, true, |handle| {
                let ret = unsafe {
                    nvs_set_blob(handle, key_c.as_ptr().cast(), data.as_ptr().cast(), data.len())
                };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                Ok(())
            })
            .map_err(|e| {
                if e == ESP_ERR_NVS_NOT_ENOUGH_SPACE {
                    StorageError::Full
                } else {
                    StorageError::IoError
                }
            })
        }
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.borrow_mut().remove(&composite);
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            use esp_idf_svc::sys::*;
            let key_c = Self::key_cstr(key);
            let result = Self::with_nvs_handle(namespace, true, |handle| {
                let ret = unsafe { nvs_erase_key(handle, key_c.as_ptr().cast()) };
                // Absent keys are fine: delete is idempotent.
                if ret != ESP_OK as i32 && ret != ESP_ERR_NVS_NOT_FOUND {
                    return Err(ret);
                }
                Ok(())
            });
            result.map_err(|_| StorageError::IoError)
        }
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        let mut probe = [0u8; MAX_BLOB_SIZE];
        self.read(namespace, key, &mut probe).is_ok()
    }
}

// ───────────────────────────────────────────────────────────────
// ConfigStore
// ───────────────────────────────────────────────────────────────

/// [`ConfigPort`] over any [`StoragePort`]: postcard blob, validated on
/// every save, defaults on first boot.
pub struct ConfigStore<S: StoragePort> {
    storage: RefCell<S>,
}

impl<S: StoragePort> ConfigStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage: RefCell::new(storage),
        }
    }
}

impl<S: StoragePort> ConfigPort for ConfigStore<S> {
    fn load(&self) -> Result<MonitorConfig, ConfigError> {
        let mut buf = [0u8; MAX_BLOB_SIZE];
        match self.storage.borrow().read(CONFIG_NAMESPACE, CONFIG_KEY, &mut buf) {
            Ok(len) => {
                let cfg: MonitorConfig =
                    postcard::from_bytes(&buf[..len]).map_err(|_| ConfigError::Corrupted)?;
                info!("config loaded from storage ({} bytes)", len);
                Ok(cfg)
            }
            Err(StorageError::NotFound) => {
                info!("no stored config, using defaults");
                Ok(MonitorConfig::default())
            }
            Err(e) => {
                warn!("config read error ({}), using defaults", e);
                Ok(MonitorConfig::default())
            }
        }
    }

    fn save(&self, config: &MonitorConfig) -> Result<(), ConfigError> {
        config.validate().map_err(ConfigError::ValidationFailed)?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        self.storage
            .borrow_mut()
            .write(CONFIG_NAMESPACE, CONFIG_KEY, &bytes)
            .map_err(|e| match e {
                StorageError::Full => ConfigError::StorageFull,
                _ => ConfigError::IoError,
            })
    }

    fn reset(&self) -> Result<(), ConfigError> {
        self.storage
            .borrow_mut()
            .delete(CONFIG_NAMESPACE, CONFIG_KEY)
            .map_err(|_| ConfigError::IoError)
    }
}
