//! Phone catalog access for presentation code.
//!
//! Presentation code calls one interface, [`PhoneDataSource`], regardless of
//! where it runs. The host picks the implementation when it starts:
//!
//! - [`RepositorySource`] - in-process, calls the repository directly
//! - [`ProxySource`] - remote clients, calls the storefront's `/api/phones`
//!   routes over HTTP

use std::future::Future;

use mobile_shop_core::{PhoneDetail, PhoneListItem, PhoneQuery};
use reqwest::header::CACHE_CONTROL;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, instrument};
use url::Url;

use crate::repository::{PhoneRepository, RepositoryError};

/// Page size requested by [`ProxySource`] when the caller sets none.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Errors returned by a [`PhoneDataSource`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// In-process repository call failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Proxy route answered with a non-success status.
    #[error("Failed to fetch {resource} ({status})")]
    Status { resource: &'static str, status: u16 },

    /// Proxy route answered with an unexpected body.
    #[error("Invalid response structure: expected {0}")]
    InvalidResponse(&'static str),

    /// Transport failure talking to the proxy route.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Storefront origin cannot be used as a base URL.
    #[error("Invalid storefront URL: {0}")]
    InvalidOrigin(String),
}

impl ServiceError {
    /// HTTP status carried by the error, when there is one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Repository(err) => Some(err.status()),
            Self::Status { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            Self::InvalidResponse(_) | Self::InvalidOrigin(_) => None,
        }
    }
}

/// Source of phone catalog data.
pub trait PhoneDataSource: Send + Sync {
    /// List phones matching `query`.
    fn list_phones(
        &self,
        query: &PhoneQuery,
    ) -> impl Future<Output = Result<Vec<PhoneListItem>, ServiceError>> + Send;

    /// Fetch one phone by ID.
    fn get_phone(&self, id: &str) -> impl Future<Output = Result<PhoneDetail, ServiceError>> + Send;
}

// =============================================================================
// RepositorySource
// =============================================================================

/// Data source that calls the repository in-process.
#[derive(Debug, Clone)]
pub struct RepositorySource {
    repository: PhoneRepository,
}

impl RepositorySource {
    #[must_use]
    pub const fn new(repository: PhoneRepository) -> Self {
        Self { repository }
    }
}

impl PhoneDataSource for RepositorySource {
    async fn list_phones(&self, query: &PhoneQuery) -> Result<Vec<PhoneListItem>, ServiceError> {
        Ok(self.repository.list_phones(query).await?)
    }

    async fn get_phone(&self, id: &str) -> Result<PhoneDetail, ServiceError> {
        Ok(self.repository.get_phone(id).await?)
    }
}

// =============================================================================
// ProxySource
// =============================================================================

/// Data source that calls the storefront's proxy routes.
#[derive(Debug, Clone)]
pub struct ProxySource {
    client: reqwest::Client,
    origin: Url,
}

impl ProxySource {
    /// Create a source for the storefront at `origin` (e.g. `http://127.0.0.1:3000`).
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidOrigin` if `origin` is not an absolute
    /// http(s) URL.
    pub fn new(origin: &str) -> Result<Self, ServiceError> {
        let origin = Url::parse(origin).map_err(|e| ServiceError::InvalidOrigin(e.to_string()))?;
        if origin.cannot_be_a_base() {
            return Err(ServiceError::InvalidOrigin(origin.to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            origin,
        })
    }

    /// URL of the phone listing route.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidOrigin` if the route cannot be joined.
    pub fn phones_url(&self, query: &PhoneQuery) -> Result<Url, ServiceError> {
        let mut url = self.route("/api/phones")?;

        {
            let mut pairs = url.query_pairs_mut();
            if let Some(search) = query.search_term() {
                pairs.append_pair("search", search);
            }
            if let Some(limit) = query.limit.or(Some(DEFAULT_PAGE_SIZE)).filter(|&n| n != 0) {
                pairs.append_pair("limit", &limit.to_string());
            }
            if let Some(offset) = query.effective_offset() {
                pairs.append_pair("offset", &offset.to_string());
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        Ok(url)
    }

    /// URL of the phone detail route.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidOrigin` if the route cannot be joined.
    pub fn phone_url(&self, id: &str) -> Result<Url, ServiceError> {
        let mut url = self.route("/api/phones")?;
        url.path_segments_mut()
            .map_err(|()| ServiceError::InvalidOrigin(self.origin.to_string()))?
            .push(id);
        Ok(url)
    }

    fn route(&self, path: &str) -> Result<Url, ServiceError> {
        self.origin
            .join(path)
            .map_err(|e| ServiceError::InvalidOrigin(e.to_string()))
    }

    async fn get_json(&self, url: Url, resource: &'static str) -> Result<Value, ServiceError> {
        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                resource,
                status: status.as_u16(),
            });
        }

        Ok(response.json::<Value>().await?)
    }

    async fn fetch_phones(&self, query: &PhoneQuery) -> Result<Vec<PhoneListItem>, ServiceError> {
        let body = self.get_json(self.phones_url(query)?, "phones").await?;
        if !body.is_array() {
            return Err(ServiceError::InvalidResponse("array"));
        }
        serde_json::from_value(body).map_err(|_| ServiceError::InvalidResponse("array of phones"))
    }

    async fn fetch_phone(&self, id: &str) -> Result<PhoneDetail, ServiceError> {
        let body = self.get_json(self.phone_url(id)?, "phone detail").await?;
        if !body.is_object() {
            return Err(ServiceError::InvalidResponse("object"));
        }
        serde_json::from_value(body).map_err(|_| ServiceError::InvalidResponse("phone object"))
    }
}

impl PhoneDataSource for ProxySource {
    #[instrument(skip(self))]
    async fn list_phones(&self, query: &PhoneQuery) -> Result<Vec<PhoneListItem>, ServiceError> {
        self.fetch_phones(query).await.inspect_err(|e| {
            error!(error = %e, "Error fetching phones");
        })
    }

    #[instrument(skip(self))]
    async fn get_phone(&self, id: &str) -> Result<PhoneDetail, ServiceError> {
        self.fetch_phone(id).await.inspect_err(|e| {
            error!(error = %e, "Error fetching phone detail");
        })
    }
}
