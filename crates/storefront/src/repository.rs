//! Phone repository backed by the upstream product API.
//!
//! Turns domain requests into upstream calls and upstream payloads into
//! domain types. Validation runs in a fixed order before any network call:
//!
//! 1. upstream configuration (base URL and API key present)
//! 2. caller input (non-blank phone ID)
//!
//! Response bodies are then shape-checked (array for lists, object for
//! details) before being mapped to [`PhoneListItem`] / [`PhoneDetail`].

use std::collections::HashSet;

use mobile_shop_core::{PhoneDetail, PhoneId, PhoneListItem, PhoneQuery};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use thiserror::Error;
use tracing::{instrument, warn};
use url::Url;

use crate::config::{API_KEY_VAR, BASE_URL_VAR, ConfigError, UpstreamConfig};
use crate::upstream::{UpstreamClient, UpstreamError};

/// Errors returned by [`PhoneRepository`].
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Upstream configuration is missing or unusable.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Blank phone ID.
    #[error("Invalid phone ID")]
    InvalidId,

    /// Upstream answered with an unexpected shape.
    #[error("Invalid upstream response")]
    InvalidResponse,

    /// Upstream call failed.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl RepositoryError {
    /// HTTP-equivalent status for this error.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::Config(_) | Self::InvalidResponse => 500,
            Self::InvalidId => 400,
            Self::Upstream(err) => err.status,
        }
    }
}

/// Read-only access to the phone catalog.
#[derive(Debug, Clone)]
pub struct PhoneRepository {
    client: UpstreamClient,
    config: UpstreamConfig,
}

impl PhoneRepository {
    /// Create a repository using the given client and configuration.
    #[must_use]
    pub const fn new(client: UpstreamClient, config: UpstreamConfig) -> Self {
        Self { client, config }
    }

    /// List phones, deduplicated by ID.
    ///
    /// When the upstream returns the same ID more than once, the first
    /// occurrence is kept (both its position and its contents).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if configuration is missing, the upstream
    /// call fails, or the response is not an array of phones.
    #[instrument(skip(self))]
    pub async fn list_phones(&self, query: &PhoneQuery) -> Result<Vec<PhoneListItem>, RepositoryError> {
        let (base_url, api_key) = self.credentials()?;
        let url = phones_url(base_url, query)?;

        let response = self.client.fetch(&url, api_key, "Phones").await?;
        if !response.body.is_array() {
            warn!(is_json = response.is_json, "Phones response is not an array");
            return Err(RepositoryError::InvalidResponse);
        }

        let phones: Vec<PhoneListItem> = map_body(response.body)?;
        Ok(dedupe_by_id(phones))
    }

    /// Fetch one phone by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if configuration is missing, the ID is blank,
    /// the upstream call fails, or the response is not a phone object.
    #[instrument(skip(self))]
    pub async fn get_phone(&self, id: &str) -> Result<PhoneDetail, RepositoryError> {
        let (base_url, api_key) = self.credentials()?;
        let id = PhoneId::new(id);
        if id.is_blank() {
            return Err(RepositoryError::InvalidId);
        }
        let url = phone_url(base_url, &id)?;

        let response = self.client.fetch(&url, api_key, "PhoneDetail").await?;
        if !response.body.is_object() {
            warn!(is_json = response.is_json, "Phone detail response is not an object");
            return Err(RepositoryError::InvalidResponse);
        }

        map_body(response.body)
    }

    fn credentials(&self) -> Result<(&str, &SecretString), RepositoryError> {
        let base_url = self
            .config
            .base_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(BASE_URL_VAR.to_string()))?;
        let api_key = self
            .config
            .api_key
            .as_ref()
            .filter(|key| !key.expose_secret().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(API_KEY_VAR.to_string()))?;
        Ok((base_url, api_key))
    }
}

// =============================================================================
// URL Construction
// =============================================================================

/// Join `base_url` and `path`, dropping one trailing slash from the base.
///
/// # Errors
///
/// Returns `RepositoryError::Config` if the result is not a valid URL.
pub fn build_upstream_url(base_url: &str, path: &str) -> Result<Url, RepositoryError> {
    let base = base_url.strip_suffix('/').unwrap_or(base_url);
    Url::parse(&format!("{base}{path}")).map_err(|e| invalid_base_url(&e))
}

/// URL for the phone listing, with only the query parameters that are set.
///
/// # Errors
///
/// Returns `RepositoryError::Config` if the base URL is invalid.
pub fn phones_url(base_url: &str, query: &PhoneQuery) -> Result<Url, RepositoryError> {
    let mut url = build_upstream_url(base_url, "/products")?;

    {
        let mut pairs = url.query_pairs_mut();
        if let Some(search) = query.search_term() {
            pairs.append_pair("search", search);
        }
        if let Some(limit) = query.effective_limit() {
            pairs.append_pair("limit", &limit.to_string());
        }
        if let Some(offset) = query.effective_offset() {
            pairs.append_pair("offset", &offset.to_string());
        }
    }

    // `query_pairs_mut` leaves an empty `?` behind when nothing was appended
    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(url)
}

/// URL for a single phone; the ID is percent-encoded as one path segment.
///
/// # Errors
///
/// Returns `RepositoryError::Config` if the base URL is invalid.
pub fn phone_url(base_url: &str, id: &PhoneId) -> Result<Url, RepositoryError> {
    let mut url = build_upstream_url(base_url, "/products")?;
    url.path_segments_mut()
        .map_err(|()| {
            ConfigError::InvalidEnvVar(BASE_URL_VAR.to_string(), "cannot be a base URL".to_string())
        })?
        .push(id.as_str());
    Ok(url)
}

fn invalid_base_url(err: &url::ParseError) -> RepositoryError {
    ConfigError::InvalidEnvVar(BASE_URL_VAR.to_string(), err.to_string()).into()
}

// =============================================================================
// Response Mapping
// =============================================================================

fn map_body<T: serde::de::DeserializeOwned>(body: Value) -> Result<T, RepositoryError> {
    serde_json::from_value(body).map_err(|e| {
        warn!(error = %e, "Upstream payload does not match the expected shape");
        RepositoryError::InvalidResponse
    })
}

/// Drop later entries whose ID was already seen.
#[must_use]
pub fn dedupe_by_id(phones: Vec<PhoneListItem>) -> Vec<PhoneListItem> {
    let mut seen = HashSet::new();
    phones
        .into_iter()
        .filter(|phone| seen.insert(phone.id.clone()))
        .collect()
}
