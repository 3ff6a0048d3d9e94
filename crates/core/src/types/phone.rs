//! Phone catalog projections.
//!
//! These types mirror the JSON returned by the upstream product API. They are
//! read-only: nothing in Mobile Shop mutates catalog data locally.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::cart::NewCartItem;
use crate::types::PhoneId;

// =============================================================================
// Lenient Field Decoding
// =============================================================================

/// Read a field that may be `null`, falling back to its default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Read a JSON number price that may be `null`, falling back to zero.
fn decimal_or_default<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    rust_decimal::serde::float_option::deserialize(deserializer).map(Option::unwrap_or_default)
}

// =============================================================================
// Query Types
// =============================================================================

/// Parameters for listing phones.
///
/// Absent values are omitted from upstream requests. A `limit` or `offset` of
/// zero is treated the same as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneQuery {
    /// Free-text search filter.
    pub search: Option<String>,
    /// Maximum number of phones to return.
    pub limit: Option<u32>,
    /// Number of phones to skip.
    pub offset: Option<u32>,
}

impl PhoneQuery {
    /// Search term, if non-empty.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }

    /// Limit, if set and non-zero.
    #[must_use]
    pub fn effective_limit(&self) -> Option<u32> {
        self.limit.filter(|&n| n != 0)
    }

    /// Offset, if set and non-zero.
    #[must_use]
    pub fn effective_offset(&self) -> Option<u32> {
        self.offset.filter(|&n| n != 0)
    }
}

// =============================================================================
// Listing Types
// =============================================================================

/// Phone summary as shown in the catalog grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneListItem {
    pub id: PhoneId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub brand: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Lowest price across storage options.
    #[serde(
        default,
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "decimal_or_default"
    )]
    pub base_price: Decimal,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_url: String,
}

// =============================================================================
// Detail Types
// =============================================================================

/// Full phone record for the detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneDetail {
    pub id: PhoneId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub brand: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(
        default,
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "decimal_or_default"
    )]
    pub base_price: Decimal,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub specs: PhoneSpecs,
    #[serde(default, deserialize_with = "null_as_default")]
    pub color_options: Vec<ColorOption>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub storage_options: Vec<StorageOption>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub similar_products: Vec<SimilarProduct>,
}

/// Technical specifications.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhoneSpecs {
    #[serde(deserialize_with = "null_as_default")]
    pub screen: String,
    #[serde(deserialize_with = "null_as_default")]
    pub resolution: String,
    #[serde(deserialize_with = "null_as_default")]
    pub processor: String,
    #[serde(deserialize_with = "null_as_default")]
    pub main_camera: String,
    #[serde(deserialize_with = "null_as_default")]
    pub selfie_camera: String,
    #[serde(deserialize_with = "null_as_default")]
    pub battery: String,
    #[serde(deserialize_with = "null_as_default")]
    pub os: String,
    #[serde(deserialize_with = "null_as_default")]
    pub screen_refresh_rate: String,
}

/// A purchasable color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorOption {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hex_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_url: String,
}

/// A purchasable storage capacity and its price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageOption {
    /// Capacity label, e.g. `128GB`.
    pub capacity: String,
    #[serde(
        default,
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "decimal_or_default"
    )]
    pub price: Decimal,
}

/// Related phone shown under the detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarProduct {
    pub id: PhoneId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub brand: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(
        default,
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "decimal_or_default"
    )]
    pub base_price: Decimal,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_url: String,
}

/// Reasons a color/storage selection cannot be added to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Color or storage was left unselected.
    #[error("Select both a color and a storage capacity")]
    Incomplete,

    #[error("Unknown color: {0}")]
    UnknownColor(String),

    #[error("Unknown storage capacity: {0}")]
    UnknownStorage(String),
}

impl PhoneDetail {
    /// Price displayed for a storage capacity.
    ///
    /// Falls back to the first storage option when nothing is selected, and to
    /// `base_price` when the option is missing or priced at zero.
    #[must_use]
    pub fn price_for(&self, capacity: Option<&str>) -> Decimal {
        let option = match capacity {
            Some(capacity) => self.storage_option(capacity),
            None => self.storage_options.first(),
        };

        option
            .map(|o| o.price)
            .filter(|price| !price.is_zero())
            .unwrap_or(self.base_price)
    }

    /// Look up a storage option by capacity label.
    #[must_use]
    pub fn storage_option(&self, capacity: &str) -> Option<&StorageOption> {
        self.storage_options.iter().find(|o| o.capacity == capacity)
    }

    /// Look up a color option by name.
    #[must_use]
    pub fn color_option(&self, name: &str) -> Option<&ColorOption> {
        self.color_options.iter().find(|o| o.name == name)
    }

    /// Build an add-to-cart candidate for a fully configured phone.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError` if either choice is empty or does not match one
    /// of the phone's options.
    pub fn to_cart_item(&self, color: &str, capacity: &str) -> Result<NewCartItem, SelectionError> {
        if color.is_empty() || capacity.is_empty() {
            return Err(SelectionError::Incomplete);
        }

        let color_option = self
            .color_option(color)
            .ok_or_else(|| SelectionError::UnknownColor(color.to_string()))?;
        if self.storage_option(capacity).is_none() {
            return Err(SelectionError::UnknownStorage(capacity.to_string()));
        }

        Ok(NewCartItem {
            id: self.id.clone(),
            name: self.name.clone(),
            price: self.price_for(Some(capacity)),
            color: color_option.name.clone(),
            storage: capacity.to_string(),
            image_url: Some(color_option.image_url.clone()).filter(|url| !url.is_empty()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn sample_detail() -> PhoneDetail {
        serde_json::from_value(serde_json::json!({
            "id": "APL-IP15",
            "brand": "Apple",
            "name": "iPhone 15",
            "description": "The latest iPhone",
            "basePrice": 909,
            "rating": 4.6,
            "specs": { "screen": "6.1\"", "os": "iOS 17" },
            "colorOptions": [
                { "name": "Black", "hexCode": "#000000", "imageUrl": "http://img/black.png" },
                { "name": "Pink", "hexCode": "#f5c6d6", "imageUrl": "" }
            ],
            "storageOptions": [
                { "capacity": "128GB", "price": 909 },
                { "capacity": "256GB", "price": 1029.5 },
                { "capacity": "1TB", "price": 0 }
            ],
            "similarProducts": []
        }))
        .unwrap()
    }

    #[test]
    fn test_detail_parses_partial_specs() {
        let detail = sample_detail();
        assert_eq!(detail.specs.screen, "6.1\"");
        assert_eq!(detail.specs.battery, "");
        assert_eq!(detail.base_price, Decimal::from(909));
    }

    #[test]
    fn test_list_item_parses_numeric_id_and_price() {
        let item: PhoneListItem = serde_json::from_value(serde_json::json!({
            "id": 1, "brand": "Google", "name": "Pixel 8", "basePrice": 799.99, "imageUrl": "x"
        }))
        .unwrap();
        assert_eq!(item.id, PhoneId::new("1"));
        assert_eq!(item.base_price, Decimal::new(79999, 2));
    }

    #[test]
    fn test_list_item_null_fields_default() {
        let items: Vec<PhoneListItem> = serde_json::from_value(serde_json::json!([
            { "id": "1", "brand": "Google", "name": "Pixel 8", "basePrice": 699, "imageUrl": "i" },
            { "id": "2", "brand": null, "name": null, "basePrice": null, "imageUrl": null }
        ]))
        .unwrap();

        assert_eq!(items[0].image_url, "i");
        assert_eq!(items[1].brand, "");
        assert_eq!(items[1].image_url, "");
        assert_eq!(items[1].base_price, Decimal::ZERO);
    }

    #[test]
    fn test_detail_null_fields_default() {
        let detail: PhoneDetail = serde_json::from_value(serde_json::json!({
            "id": "APL-IP15",
            "rating": null,
            "description": null,
            "specs": { "screen": null, "os": "iOS 17" },
            "colorOptions": [{ "name": "Black", "hexCode": null, "imageUrl": null }],
            "storageOptions": [{ "capacity": "128GB", "price": null }],
            "similarProducts": null
        }))
        .unwrap();

        assert!(detail.rating.abs() < f64::EPSILON);
        assert_eq!(detail.description, "");
        assert_eq!(detail.specs.screen, "");
        assert_eq!(detail.specs.os, "iOS 17");
        assert_eq!(detail.color_options[0].image_url, "");
        assert_eq!(detail.storage_options[0].price, Decimal::ZERO);
        assert!(detail.similar_products.is_empty());
    }

    #[test]
    fn test_list_item_requires_id() {
        let result: Result<PhoneListItem, _> =
            serde_json::from_value(serde_json::json!({ "name": "No id" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_price_for_selected_storage() {
        let detail = sample_detail();
        assert_eq!(detail.price_for(Some("256GB")), Decimal::new(10295, 1));
    }

    #[test]
    fn test_price_for_defaults_to_first_option() {
        let detail = sample_detail();
        assert_eq!(detail.price_for(None), Decimal::from(909));
    }

    #[test]
    fn test_price_for_zero_price_falls_back_to_base() {
        let detail = sample_detail();
        assert_eq!(detail.price_for(Some("1TB")), detail.base_price);
        assert_eq!(detail.price_for(Some("64GB")), detail.base_price);
    }

    #[test]
    fn test_to_cart_item() {
        let detail = sample_detail();
        let item = detail.to_cart_item("Black", "256GB").unwrap();
        assert_eq!(item.id, PhoneId::new("APL-IP15"));
        assert_eq!(item.name, "iPhone 15");
        assert_eq!(item.price, Decimal::new(10295, 1));
        assert_eq!(item.color, "Black");
        assert_eq!(item.storage, "256GB");
        assert_eq!(item.image_url.as_deref(), Some("http://img/black.png"));
    }

    #[test]
    fn test_to_cart_item_without_color_image() {
        let detail = sample_detail();
        let item = detail.to_cart_item("Pink", "128GB").unwrap();
        assert_eq!(item.image_url, None);
    }

    #[test]
    fn test_to_cart_item_requires_full_selection() {
        let detail = sample_detail();
        assert_eq!(
            detail.to_cart_item("", "128GB").unwrap_err(),
            SelectionError::Incomplete
        );
        assert_eq!(
            detail.to_cart_item("Black", "").unwrap_err(),
            SelectionError::Incomplete
        );
    }

    #[test]
    fn test_to_cart_item_unknown_options() {
        let detail = sample_detail();
        assert_eq!(
            detail.to_cart_item("Green", "128GB").unwrap_err(),
            SelectionError::UnknownColor("Green".to_string())
        );
        assert_eq!(
            detail.to_cart_item("Black", "64GB").unwrap_err(),
            SelectionError::UnknownStorage("64GB".to_string())
        );
    }

    #[test]
    fn test_query_zero_values_are_absent() {
        let query = PhoneQuery {
            search: Some(String::new()),
            limit: Some(0),
            offset: Some(0),
        };
        assert_eq!(query.search_term(), None);
        assert_eq!(query.effective_limit(), None);
        assert_eq!(query.effective_offset(), None);

        let query = PhoneQuery {
            search: Some("pixel".to_string()),
            limit: Some(20),
            offset: Some(40),
        };
        assert_eq!(query.search_term(), Some("pixel"));
        assert_eq!(query.effective_limit(), Some(20));
        assert_eq!(query.effective_offset(), Some(40));
    }
}
