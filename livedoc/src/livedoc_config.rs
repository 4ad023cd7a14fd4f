//! Configuration of a livedoc store.

use crate::common::{atomic, Atomic, ReadExecutor, WriteExecutor, DEFAULT_REFRESH_WINDOW};
use crate::errors::{ErrorKind, LiveDocError, LiveDocResult};
use crate::store::memory::MemoryStorage;
use crate::store::{Storage, StorageProvider};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Settings shared by a store and all of its collections.
///
/// Settings can only change until the store is opened, afterwards every
/// setter fails with [ErrorKind::InvalidOperation].
#[derive(Clone)]
pub struct LiveDocConfig {
    inner: Arc<LiveDocConfigInner>,
}

impl Default for LiveDocConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveDocConfig {
    pub fn new() -> Self {
        LiveDocConfig {
            inner: Arc::new(LiveDocConfigInner::new()),
        }
    }

    pub fn name(&self) -> String {
        self.inner.name.read_with(|name| name.clone())
    }

    pub fn set_name(&self, name: &str) -> LiveDocResult<()> {
        self.inner.check_mutable("name")?;
        if name.trim().is_empty() {
            log::error!("Store name cannot be empty");
            return Err(LiveDocError::new(
                "Store name cannot be empty",
                ErrorKind::ValidationError,
            ));
        }
        self.inner.name.write_with(|it| *it = name.to_string());
        Ok(())
    }

    /// Whether wildcard path resolutions are cached per document for every
    /// query, not only for reactive ones.
    pub fn dynamic_indexes(&self) -> bool {
        self.inner.dynamic_indexes.load(Ordering::Relaxed)
    }

    pub fn set_dynamic_indexes(&self, enabled: bool) -> LiveDocResult<()> {
        self.inner.check_mutable("dynamic indexes")?;
        self.inner.dynamic_indexes.store(enabled, Ordering::Relaxed);
        Ok(())
    }

    /// How long writes to a document must settle before reactive indexes
    /// are refreshed. Zero refreshes on every write.
    pub fn refresh_window(&self) -> Duration {
        self.inner.refresh_window.read_with(|window| *window)
    }

    pub fn set_refresh_window(&self, window: Duration) -> LiveDocResult<()> {
        self.inner.check_mutable("refresh window")?;
        if chrono::Duration::from_std(window).is_err() {
            log::error!("Refresh window {:?} is out of range", window);
            return Err(LiveDocError::new(
                &format!("Refresh window {:?} is out of range", window),
                ErrorKind::ValidationError,
            ));
        }
        self.inner.refresh_window.write_with(|it| *it = window);
        Ok(())
    }

    pub fn storage(&self) -> Storage {
        self.inner.storage.read_with(|storage| storage.clone())
    }

    pub fn set_storage<T: StorageProvider + 'static>(&self, provider: T) -> LiveDocResult<()> {
        self.inner.check_mutable("storage")?;
        self.inner.storage.write_with(|it| *it = Storage::new(provider));
        Ok(())
    }

    pub(crate) fn freeze(&self) {
        self.inner.configured.store(true, Ordering::Relaxed);
    }

    pub fn is_configured(&self) -> bool {
        self.inner.configured.load(Ordering::Relaxed)
    }
}

struct LiveDocConfigInner {
    configured: AtomicBool,
    name: Atomic<String>,
    dynamic_indexes: AtomicBool,
    refresh_window: Atomic<Duration>,
    storage: Atomic<Storage>,
}

impl LiveDocConfigInner {
    fn new() -> Self {
        LiveDocConfigInner {
            configured: AtomicBool::new(false),
            name: atomic("livedoc".to_string()),
            dynamic_indexes: AtomicBool::new(true),
            refresh_window: atomic(DEFAULT_REFRESH_WINDOW),
            storage: atomic(Storage::new(MemoryStorage::new())),
        }
    }

    fn check_mutable(&self, setting: &str) -> LiveDocResult<()> {
        if self.configured.load(Ordering::Relaxed) {
            log::error!("The {} cannot be changed after the store is opened", setting);
            return Err(LiveDocError::new(
                &format!("The {} cannot be changed after the store is opened", setting),
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(())
    }
}
