//! NVS-backed persistent configuration area.
//!
//! Implements [`PersistentStore`] as a 256-byte image.  Reads are served
//! from RAM; every write or erase is committed to flash immediately.
//!
//! - **`target_os = "espidf"`** — the image is one NVS blob in the
//!   `rfbrick` namespace.  A missing blob reads as an erased area.
//! - **`not(target_os = "espidf")`** — RAM only (dev/test).

use log::{info, warn};

use crate::app::ports::{PERSISTENT_AREA_SIZE, PersistentStore, StorageError};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// Value of an erased byte.
pub const ERASED: u8 = 0xFF;

#[cfg(target_os = "espidf")]
const NAMESPACE: &[u8] = b"rfbrick\0";
#[cfg(target_os = "espidf")]
const AREA_KEY: &[u8] = b"persist\0";

pub struct NvsArea {
    image: [u8; PERSISTENT_AREA_SIZE],
    /// `false` for a RAM-only stand-in whose commits always fail.
    backed: bool,
}

impl NvsArea {
    /// Initialise NVS flash and load the stored image, if any.
    #[cfg(target_os = "espidf")]
    pub fn new() -> Result<Self, StorageError> {
        // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
        // single main-task context before any concurrent NVS access.
        let ret = unsafe { nvs_flash_init() };
        if ret == ESP_ERR_NVS_NO_FREE_PAGES as i32 || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as i32 {
            warn!("NvsArea: erasing and re-initialising flash partition");
            if unsafe { nvs_flash_erase() } != ESP_OK as i32 || unsafe { nvs_flash_init() } != ESP_OK as i32 {
                return Err(StorageError::IoError);
            }
        } else if ret != ESP_OK as i32 {
            return Err(StorageError::IoError);
        }

        let mut image = [ERASED; PERSISTENT_AREA_SIZE];
        let loaded = Self::with_nvs_handle(false, |handle| {
            let mut size = image.len();
            // SAFETY: buffer and size describe `image`.
            let ret = unsafe {
                nvs_get_blob(
                    handle,
                    AREA_KEY.as_ptr().cast(),
                    image.as_mut_ptr().cast(),
                    &mut size,
                )
            };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            Ok(size)
        });

        match loaded {
            Ok(size) => info!("NvsArea: loaded {} bytes", size),
            Err(e) if e == ESP_ERR_NVS_NOT_FOUND as i32 => info!("NvsArea: no stored area"),
            Err(e) => {
                warn!("NvsArea: read error {}, treating area as erased", e);
                image = [ERASED; PERSISTENT_AREA_SIZE];
            }
        }
        Ok(Self {
            image,
            backed: true,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Result<Self, StorageError> {
        info!("NvsArea: simulation backend");
        Ok(Self {
            image: [ERASED; PERSISTENT_AREA_SIZE],
            backed: true,
        })
    }

    /// An erased area with no flash behind it.  Reads work; every write
    /// or erase reports [`StorageError::IoError`].
    pub fn erased() -> Self {
        Self {
            image: [ERASED; PERSISTENT_AREA_SIZE],
            backed: false,
        }
    }

    /// Open the namespace, run `f` with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };
        // SAFETY: NUL-terminated namespace constant; handle is an out-param.
        let ret = unsafe { nvs_open(NAMESPACE.as_ptr().cast(), mode, &mut handle) };
        if ret != ESP_OK as i32 {
            return Err(ret);
        }
        let result = f(handle);
        // SAFETY: handle was opened above.
        unsafe { nvs_close(handle) };
        result
    }

    #[cfg(target_os = "espidf")]
    fn commit(&self) -> Result<(), StorageError> {
        if !self.backed {
            return Err(StorageError::IoError);
        }
        let result = Self::with_nvs_handle(true, |handle| {
            // SAFETY: blob pointer/length describe `self.image`.
            let ret = unsafe {
                nvs_set_blob(
                    handle,
                    AREA_KEY.as_ptr().cast(),
                    self.image.as_ptr().cast(),
                    self.image.len(),
                )
            };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            // SAFETY: handle open for writing.
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            Ok(())
        });
        result.map_err(|e| {
            warn!("NvsArea: NVS write error {}", e);
            StorageError::IoError
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn commit(&self) -> Result<(), StorageError> {
        if self.backed {
            Ok(())
        } else {
            Err(StorageError::IoError)
        }
    }
}

impl PersistentStore for NvsArea {
    fn erase(&mut self) -> Result<(), StorageError> {
        self.image = [ERASED; PERSISTENT_AREA_SIZE];
        self.commit()
    }

    fn write_at(&mut self, offset: usize, bytes: &[u8]) -> Result<(), StorageError> {
        let end = offset
            .checked_add(bytes.len())
            .filter(|&end| end <= PERSISTENT_AREA_SIZE)
            .ok_or(StorageError::OutOfRange)?;
        self.image[offset..end].copy_from_slice(bytes);
        self.commit()
    }

    fn read_at(&self, offset: usize) -> u8 {
        self.image.get(offset).copied().unwrap_or(ERASED)
    }
}
