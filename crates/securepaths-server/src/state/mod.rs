//! Shared application state.

pub mod store;

use securepaths_maps::MapsProvider;
use std::sync::Arc;

use crate::config::Config;
pub use store::Storage;

/// State injected into every handler.
pub struct AppState {
    config: Config,
    storage: Storage,
    maps: Arc<dyn MapsProvider>,
}

impl AppState {
    pub fn new(config: Config, maps: Arc<dyn MapsProvider>) -> Self {
        Self::with_storage(config, Storage::in_memory(), maps)
    }

    pub fn with_storage(config: Config, storage: Storage, maps: Arc<dyn MapsProvider>) -> Self {
        Self {
            config,
            storage,
            maps,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn maps(&self) -> &dyn MapsProvider {
        self.maps.as_ref()
    }
}
