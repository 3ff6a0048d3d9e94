//! Client-side shopping cart.
//!
//! The cart is a list of line items, each identified by the tuple
//! `(product id, color, storage)`. All mutation goes through [`CartAction`]s
//! applied by a single reducer, so the invariant "at most one line per
//! identity, quantity >= 1" is enforced in one place.
//!
//! [`CartStore`] wraps the reducer with hydration from, and write-through
//! persistence to, a [`CartStorage`] backend.

mod storage;
mod store;

pub use storage::{CartStorage, MemoryStorage, StorageError};
pub use store::{CartStore, ListenerId};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::PhoneId;

/// Storage key under which the serialized cart is kept.
pub const CART_STORAGE_KEY: &str = "zara_cart";

// =============================================================================
// Line Item Types
// =============================================================================

/// Identity of a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartItemKey {
    pub id: PhoneId,
    pub color: String,
    pub storage: String,
}

/// Candidate line supplied to [`CartAction::AddItem`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCartItem {
    pub id: PhoneId,
    pub name: String,
    /// Unit price.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub color: String,
    pub storage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// One entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub id: PhoneId,
    pub name: String,
    /// Unit price.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub color: String,
    pub storage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub quantity: u32,
}

impl CartLineItem {
    fn from_candidate(candidate: NewCartItem) -> Self {
        Self {
            id: candidate.id,
            name: candidate.name,
            price: candidate.price,
            color: candidate.color,
            storage: candidate.storage,
            image_url: candidate.image_url,
            quantity: 1,
        }
    }

    /// Identity of this line.
    #[must_use]
    pub fn key(&self) -> CartItemKey {
        CartItemKey {
            id: self.id.clone(),
            color: self.color.clone(),
            storage: self.storage.clone(),
        }
    }

    /// Unit price multiplied by quantity, saturating at the `Decimal` bounds.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Anything carrying a cart identity tuple.
pub trait CartIdentity {
    fn identity(&self) -> (&PhoneId, &str, &str);

    /// Returns `true` if both values refer to the same cart line.
    fn is_same_item(&self, other: &impl CartIdentity) -> bool {
        self.identity() == other.identity()
    }
}

impl CartIdentity for CartItemKey {
    fn identity(&self) -> (&PhoneId, &str, &str) {
        (&self.id, &self.color, &self.storage)
    }
}

impl CartIdentity for NewCartItem {
    fn identity(&self) -> (&PhoneId, &str, &str) {
        (&self.id, &self.color, &self.storage)
    }
}

impl CartIdentity for CartLineItem {
    fn identity(&self) -> (&PhoneId, &str, &str) {
        (&self.id, &self.color, &self.storage)
    }
}

// =============================================================================
// Actions & Reducer
// =============================================================================

/// A state transition of the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Add one unit; merges into an existing line with the same identity.
    AddItem(NewCartItem),
    /// Remove a line entirely. Unknown identities are ignored.
    RemoveItem(CartItemKey),
    /// Set a line's quantity. Zero removes the line.
    UpdateQuantity { key: CartItemKey, quantity: u32 },
    /// Remove every line.
    ClearCart,
    /// Replace the whole cart with persisted state.
    LoadFromStorage(Vec<CartLineItem>),
}

/// Apply an action to a list of line items.
pub fn apply(items: &mut Vec<CartLineItem>, action: CartAction) {
    match action {
        CartAction::AddItem(candidate) => {
            if let Some(existing) = items.iter_mut().find(|item| item.is_same_item(&candidate)) {
                existing.quantity = existing.quantity.saturating_add(1);
            } else {
                items.push(CartLineItem::from_candidate(candidate));
            }
        }
        CartAction::RemoveItem(key) => {
            items.retain(|item| !item.is_same_item(&key));
        }
        CartAction::UpdateQuantity { key, quantity: 0 } => {
            items.retain(|item| !item.is_same_item(&key));
        }
        CartAction::UpdateQuantity { key, quantity } => {
            if let Some(existing) = items.iter_mut().find(|item| item.is_same_item(&key)) {
                existing.quantity = quantity;
            }
        }
        CartAction::ClearCart => items.clear(),
        CartAction::LoadFromStorage(stored) => *items = stored,
    }
}

// =============================================================================
// Derived Values
// =============================================================================

/// Sum of quantities across all lines.
#[must_use]
pub fn total_items(items: &[CartLineItem]) -> u64 {
    items.iter().map(|item| u64::from(item.quantity)).sum()
}

/// Sum of unit price times quantity across all lines.
///
/// Saturates at the `Decimal` bounds instead of overflowing.
#[must_use]
pub fn total_price(items: &[CartLineItem]) -> Decimal {
    items
        .iter()
        .fold(Decimal::ZERO, |total, item| total.saturating_add(item.line_total()))
}

/// Point-in-time view of the cart with derived totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub items: Vec<CartLineItem>,
    pub total_item_count: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}

impl CartSnapshot {
    /// Build a snapshot, computing totals from the items.
    #[must_use]
    pub fn from_items(items: &[CartLineItem]) -> Self {
        Self {
            items: items.to_vec(),
            total_item_count: total_items(items),
            total_price: total_price(items),
        }
    }

    /// Returns `true` if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
