//! Catalog commands.
//!
//! # Usage
//!
//! ```bash
//! # First page of the catalog
//! mobile-shop phones list
//!
//! # Search, with paging
//! mobile-shop phones list --search galaxy --limit 10 --offset 10
//!
//! # Detail view
//! mobile-shop phones show SMG-S24
//! ```

use std::fmt::Write as _;

use mobile_shop_core::{PhoneDetail, PhoneListItem, PhoneQuery};
use mobile_shop_storefront::services::{PhoneDataSource, ServiceError};

/// List phones matching `query`.
///
/// # Errors
///
/// Returns `ServiceError` if the catalog cannot be fetched.
pub async fn list(
    source: &impl PhoneDataSource,
    query: &PhoneQuery,
) -> Result<Vec<PhoneListItem>, ServiceError> {
    tracing::debug!(?query, "Listing phones");
    source.list_phones(query).await
}

/// Fetch one phone.
///
/// # Errors
///
/// Returns `ServiceError` if the phone cannot be fetched.
pub async fn show(source: &impl PhoneDataSource, id: &str) -> Result<PhoneDetail, ServiceError> {
    tracing::debug!(id, "Fetching phone");
    source.get_phone(id).await
}

/// Render a catalog page as one line per phone.
#[must_use]
pub fn render_list(phones: &[PhoneListItem]) -> String {
    if phones.is_empty() {
        return "No phones found.\n".to_string();
    }

    let mut out = String::new();
    for phone in phones {
        let _ = writeln!(
            out,
            "{:<12} {:<10} {:<28} {:>10} EUR",
            phone.id, phone.brand, phone.name, phone.base_price
        );
    }
    let _ = writeln!(out, "{} results", phones.len());
    out
}

/// Render the detail view of a phone.
#[must_use]
pub fn render_detail(phone: &PhoneDetail) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {} ({})", phone.brand, phone.name, phone.id);
    let _ = writeln!(out, "From {} EUR", phone.price_for(None));
    if !phone.description.is_empty() {
        let _ = writeln!(out, "{}", phone.description);
    }

    let specs = [
        ("Screen", &phone.specs.screen),
        ("Resolution", &phone.specs.resolution),
        ("Processor", &phone.specs.processor),
        ("Main camera", &phone.specs.main_camera),
        ("Selfie camera", &phone.specs.selfie_camera),
        ("Battery", &phone.specs.battery),
        ("OS", &phone.specs.os),
        ("Refresh rate", &phone.specs.screen_refresh_rate),
    ];
    for (label, value) in specs.iter().filter(|(_, v)| !v.is_empty()) {
        let _ = writeln!(out, "  {label:<14} {value}");
    }

    if !phone.color_options.is_empty() {
        let colors: Vec<&str> = phone.color_options.iter().map(|c| c.name.as_str()).collect();
        let _ = writeln!(out, "Colors: {}", colors.join(", "));
    }
    for option in &phone.storage_options {
        let _ = writeln!(out, "  {:<8} {} EUR", option.capacity, option.price);
    }
    if !phone.similar_products.is_empty() {
        let similar: Vec<&str> = phone
            .similar_products
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        let _ = writeln!(out, "Similar: {}", similar.join(", "));
    }
    out
}
