use crate::errors::{LiveDocError, LiveDocResult};
use crate::livedoc::LiveDoc;
use crate::livedoc_config::LiveDocConfig;
use crate::store::StorageProvider;
use std::time::Duration;

/// Builder for a [LiveDoc] store.
///
/// The first invalid setting is remembered and returned by
/// [LiveDocBuilder::open], later settings are ignored.
///
/// ```rust,ignore
/// let db = LiveDoc::builder()
///     .name("app")
///     .refresh_window(Duration::from_millis(50))
///     .open()?;
/// ```
#[derive(Default)]
pub struct LiveDocBuilder {
    error: Option<LiveDocError>,
    config: LiveDocConfig,
}

impl LiveDocBuilder {
    pub fn new() -> Self {
        LiveDocBuilder {
            error: None,
            config: LiveDocConfig::new(),
        }
    }

    pub fn name(self, name: &str) -> Self {
        self.apply(|config| config.set_name(name))
    }

    /// Enables or disables caching of wildcard path resolutions for
    /// non-reactive queries. Enabled by default.
    pub fn dynamic_indexes(self, enabled: bool) -> Self {
        self.apply(|config| config.set_dynamic_indexes(enabled))
    }

    /// Sets how long document writes must settle before reactive indexes are
    /// refreshed. Defaults to 25 ms, zero refreshes synchronously.
    pub fn refresh_window(self, window: Duration) -> Self {
        self.apply(|config| config.set_refresh_window(window))
    }

    /// Replaces the default in-memory storage.
    pub fn storage<T: StorageProvider + 'static>(self, provider: T) -> Self {
        self.apply(|config| config.set_storage(provider))
    }

    pub fn open(self) -> LiveDocResult<LiveDoc> {
        if let Some(error) = self.error {
            return Err(error);
        }
        self.config.freeze();
        log::debug!("Opening livedoc store {}", self.config.name());
        Ok(LiveDoc::new(self.config))
    }

    fn apply<F>(mut self, setting: F) -> Self
    where
        F: FnOnce(&LiveDocConfig) -> LiveDocResult<()>,
    {
        if self.error.is_none() {
            if let Err(e) = setting(&self.config) {
                self.error = Some(e);
            }
        }
        self
    }
}
