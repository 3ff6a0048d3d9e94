//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! # Add a configured phone
//! mobile-shop cart add SMG-S24 --color "Onyx Black" --storage 128GB
//!
//! # Change or drop a line
//! mobile-shop cart update SMG-S24 --color "Onyx Black" --storage 128GB --quantity 3
//! mobile-shop cart remove SMG-S24 --color "Onyx Black" --storage 128GB
//!
//! # Inspect or empty the cart
//! mobile-shop cart show
//! mobile-shop cart clear
//! ```
//!
//! The cart lives in `<cart-dir>/zara_cart.json` and is rewritten after
//! every change.

use std::fmt::Write as _;

use mobile_shop_core::{CartItemKey, CartSnapshot, CartStorage, CartStore, SelectionError};
use mobile_shop_storefront::services::{PhoneDataSource, ServiceError};
use thiserror::Error;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartCommandError {
    /// Phone could not be fetched.
    #[error(transparent)]
    Catalog(#[from] ServiceError),

    /// Chosen color or storage does not exist for the phone.
    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// Fetch phone `id` and add the chosen configuration to the cart.
///
/// # Errors
///
/// Returns `CartCommandError` if the phone cannot be fetched or the
/// selection is not offered.
pub async fn add<S: CartStorage>(
    source: &impl PhoneDataSource,
    store: &mut CartStore<S>,
    id: &str,
    color: &str,
    storage: &str,
) -> Result<(), CartCommandError> {
    let phone = source.get_phone(id).await?;
    let item = phone.to_cart_item(color, storage)?;
    tracing::info!(id = %item.id, color, storage, price = %item.price, "Adding to cart");
    store.add_item(item);
    Ok(())
}

/// Remove one line.
pub fn remove<S: CartStorage>(store: &mut CartStore<S>, key: CartItemKey) {
    store.remove_item(key);
}

/// Set the quantity of one line; zero removes it.
pub fn update<S: CartStorage>(store: &mut CartStore<S>, key: CartItemKey, quantity: u32) {
    store.update_quantity(key, quantity);
}

/// Empty the cart.
pub fn clear<S: CartStorage>(store: &mut CartStore<S>) {
    store.clear();
}

/// Render the cart contents and totals.
#[must_use]
pub fn render(snapshot: &CartSnapshot) -> String {
    if snapshot.is_empty() {
        return "Your cart is empty.\n".to_string();
    }

    let mut out = String::new();
    for item in &snapshot.items {
        let _ = writeln!(
            out,
            "{} x {} ({}, {}) @ {} EUR = {} EUR",
            item.quantity,
            item.name,
            item.color,
            item.storage,
            item.price,
            item.line_total()
        );
    }
    let _ = writeln!(
        out,
        "{} item(s), total {} EUR",
        snapshot.total_item_count, snapshot.total_price
    );
    out
}
