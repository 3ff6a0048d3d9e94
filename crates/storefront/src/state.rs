//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::repository::PhoneRepository;
use crate::upstream::UpstreamClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the upstream client and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    phones: PhoneRepository,
}

impl AppState {
    /// Create a new application state with a default upstream client.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let phones = PhoneRepository::new(UpstreamClient::new(), config.upstream.clone());
        Self::from_parts(config, phones)
    }

    /// Create application state around an existing repository.
    #[must_use]
    pub fn from_parts(config: StorefrontConfig, phones: PhoneRepository) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, phones }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the phone repository.
    #[must_use]
    pub fn phones(&self) -> &PhoneRepository {
        &self.inner.phones
    }
}
