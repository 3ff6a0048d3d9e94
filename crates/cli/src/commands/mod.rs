//! Command implementations.
//!
//! Commands return rendered text; `main` decides where it goes.

pub mod cart;
pub mod phones;

use mobile_shop_core::{PhoneDetail, PhoneListItem, PhoneQuery};
use mobile_shop_storefront::config::UpstreamConfig;
use mobile_shop_storefront::repository::PhoneRepository;
use mobile_shop_storefront::services::{
    PhoneDataSource, ProxySource, RepositorySource, ServiceError,
};
use mobile_shop_storefront::upstream::UpstreamClient;

/// Catalog source chosen from the command line.
#[derive(Debug, Clone)]
pub enum CatalogSource {
    /// Through a running storefront's `/api/phones` routes.
    Proxy(ProxySource),
    /// Straight to the upstream API with credentials from the environment.
    Direct(RepositorySource),
}

impl CatalogSource {
    /// Proxy through the storefront at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidOrigin` if `base_url` is not usable.
    pub fn proxy(base_url: &str) -> Result<Self, ServiceError> {
        Ok(Self::Proxy(ProxySource::new(base_url)?))
    }

    /// Call the upstream API directly using `PHONES_API_BASE_URL` and
    /// `PHONES_API_KEY`.
    #[must_use]
    pub fn direct() -> Self {
        let repository = PhoneRepository::new(UpstreamClient::new(), UpstreamConfig::from_env());
        Self::Direct(RepositorySource::new(repository))
    }
}

impl PhoneDataSource for CatalogSource {
    async fn list_phones(&self, query: &PhoneQuery) -> Result<Vec<PhoneListItem>, ServiceError> {
        match self {
            Self::Proxy(source) => source.list_phones(query).await,
            Self::Direct(source) => source.list_phones(query).await,
        }
    }

    async fn get_phone(&self, id: &str) -> Result<PhoneDetail, ServiceError> {
        match self {
            Self::Proxy(source) => source.get_phone(id).await,
            Self::Direct(source) => source.get_phone(id).await,
        }
    }
}
