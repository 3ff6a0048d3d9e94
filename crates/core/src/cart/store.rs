//! Hydrating, persisting cart store.
//!
//! Construct one `CartStore` per client session and pass it by reference to
//! whatever needs the cart. The store starts empty and unhydrated; call
//! [`CartStore::hydrate`] once before reading totals or dispatching, otherwise
//! the transient empty state is what callers see.

use rust_decimal::Decimal;
use tracing::{debug, error, warn};

use super::{
    CART_STORAGE_KEY, CartAction, CartItemKey, CartLineItem, CartSnapshot, CartStorage,
    NewCartItem, apply, total_items, total_price,
};

type Listener = Box<dyn Fn(&CartSnapshot)>;

/// Handle returned by [`CartStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Reducer-driven cart backed by a [`CartStorage`].
pub struct CartStore<S> {
    storage: S,
    items: Vec<CartLineItem>,
    hydrated: bool,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl<S: CartStorage> CartStore<S> {
    /// Create an empty, unhydrated store.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            items: Vec::new(),
            hydrated: false,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// Create a store and hydrate it immediately.
    #[must_use]
    pub fn hydrated(storage: S) -> Self {
        let mut store = Self::new(storage);
        store.hydrate();
        store
    }

    /// Load persisted state. Runs at most once per store.
    ///
    /// A missing entry leaves the cart empty. An unreadable or unparseable
    /// entry is logged and also leaves the cart empty; it never fails.
    pub fn hydrate(&mut self) {
        if self.hydrated {
            return;
        }

        match self.storage.get_item(CART_STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<CartLineItem>>(&raw) {
                Ok(items) => {
                    debug!(lines = items.len(), "Loaded cart from storage");
                    apply(&mut self.items, CartAction::LoadFromStorage(items));
                }
                Err(e) => error!(error = %e, "Error loading cart"),
            },
            Ok(None) => debug!("No stored cart"),
            Err(e) => error!(error = %e, "Error loading cart"),
        }

        self.hydrated = true;
        self.after_change();
    }

    /// Returns `true` once [`hydrate`](Self::hydrate) has run.
    #[must_use]
    pub const fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// Apply an action, persist the result, and notify listeners.
    pub fn dispatch(&mut self, action: CartAction) {
        apply(&mut self.items, action);
        self.after_change();
    }

    /// Add one unit of `item`.
    pub fn add_item(&mut self, item: NewCartItem) {
        self.dispatch(CartAction::AddItem(item));
    }

    /// Remove the line matching `key`.
    pub fn remove_item(&mut self, key: CartItemKey) {
        self.dispatch(CartAction::RemoveItem(key));
    }

    /// Set the quantity of the line matching `key`.
    pub fn update_quantity(&mut self, key: CartItemKey, quantity: u32) {
        self.dispatch(CartAction::UpdateQuantity { key, quantity });
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.dispatch(CartAction::ClearCart);
    }

    /// Current lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Sum of quantities.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        total_items(&self.items)
    }

    /// Sum of unit price times quantity.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        total_price(&self.items)
    }

    /// Lines plus derived totals.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot::from_items(&self.items)
    }

    /// Register a callback invoked with a fresh snapshot after every change.
    pub fn subscribe(&mut self, listener: impl Fn(&CartSnapshot) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a previously registered callback.
    pub fn unsubscribe(&mut self, id: ListenerId) {
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
    }

    /// Borrow the storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Consume the store, returning its storage backend.
    #[must_use]
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn after_change(&mut self) {
        if self.hydrated {
            self.persist();
        }

        if !self.listeners.is_empty() {
            let snapshot = self.snapshot();
            for (_, listener) in &self.listeners {
                listener(&snapshot);
            }
        }
    }

    fn persist(&mut self) {
        let serialized = match serde_json::to_string(&self.items) {
            Ok(serialized) => serialized,
            Err(e) => {
                error!(error = %e, "Failed to serialize cart");
                return;
            }
        };

        if let Err(e) = self.storage.set_item(CART_STORAGE_KEY, &serialized) {
            warn!(error = %e, "Failed to persist cart");
        }
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("storage", &self.storage)
            .field("items", &self.items)
            .field("hydrated", &self.hydrated)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::cart::{MemoryStorage, StorageError};
    use crate::types::PhoneId;

    fn iphone() -> NewCartItem {
        NewCartItem {
            id: PhoneId::new("1"),
            name: "iPhone".to_string(),
            price: Decimal::from(1000),
            color: "black".to_string(),
            storage: "128GB".to_string(),
            image_url: Some("img".to_string()),
        }
    }

    fn stored_pixel() -> String {
        r#"[{"id":"2","name":"Pixel","price":900,"color":"white","storage":"256GB","imageUrl":"img","quantity":2}]"#
            .to_string()
    }

    /// Storage that refuses every operation.
    #[derive(Debug, Default)]
    struct BrokenStorage {
        writes: usize,
    }

    impl CartStorage for BrokenStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("denied".to_string()))
        }

        fn set_item(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            self.writes += 1;
            Err(StorageError::Unavailable("denied".to_string()))
        }
    }

    #[test]
    fn test_new_store_is_empty_and_unhydrated() {
        let store = CartStore::new(MemoryStorage::new());
        assert!(!store.is_hydrated());
        assert!(store.items().is_empty());
        assert_eq!(store.total_items(), 0);
        assert_eq!(store.total_price(), Decimal::ZERO);
    }

    #[test]
    fn test_hydrate_from_valid_storage() {
        let store = CartStore::hydrated(MemoryStorage::with_item(CART_STORAGE_KEY, stored_pixel()));

        assert!(store.is_hydrated());
        let expected: Vec<CartLineItem> = serde_json::from_str(&stored_pixel()).unwrap();
        assert_eq!(store.items(), expected.as_slice());
        assert_eq!(store.total_items(), 2);
        assert_eq!(store.total_price(), Decimal::from(1800));
    }

    #[test]
    fn test_hydrate_with_corrupt_storage() {
        let store = CartStore::hydrated(MemoryStorage::with_item(CART_STORAGE_KEY, "{not json"));

        assert!(store.is_hydrated());
        assert!(store.items().is_empty());
        // The corrupt entry is replaced by the empty cart.
        assert_eq!(store.storage().raw(CART_STORAGE_KEY), Some("[]"));
    }

    #[test]
    fn test_hydrate_with_wrong_shape() {
        let store = CartStore::hydrated(MemoryStorage::with_item(CART_STORAGE_KEY, "{\"id\":1}"));
        assert!(store.is_hydrated());
        assert!(store.items().is_empty());
    }

    #[test]
    fn test_hydrate_with_unreadable_storage() {
        let store = CartStore::hydrated(BrokenStorage::default());
        assert!(store.is_hydrated());
        assert!(store.items().is_empty());
    }

    #[test]
    fn test_hydrate_with_huge_price_keeps_totals_bounded() {
        let stored = r#"[{"id":"1","name":"Gold","price":50000000000000000000000000000,"color":"gold","storage":"1TB","quantity":2}]"#;
        let store = CartStore::hydrated(MemoryStorage::with_item(CART_STORAGE_KEY, stored));

        assert!(store.is_hydrated());
        assert_eq!(store.items().len(), 1);
        assert_eq!(store.total_price(), Decimal::MAX);
        assert_eq!(store.snapshot().total_item_count, 2);
    }

    #[test]
    fn test_hydrate_runs_once() {
        let mut store =
            CartStore::hydrated(MemoryStorage::with_item(CART_STORAGE_KEY, stored_pixel()));
        store.add_item(iphone());
        store.hydrate();

        assert_eq!(store.items().len(), 2);
    }

    #[test]
    fn test_no_persistence_before_hydration() {
        let mut store = CartStore::new(MemoryStorage::with_item(CART_STORAGE_KEY, stored_pixel()));
        store.add_item(iphone());

        assert_eq!(store.storage().raw(CART_STORAGE_KEY), Some(stored_pixel().as_str()));
    }

    #[test]
    fn test_dispatch_persists_after_hydration() {
        let mut store = CartStore::hydrated(MemoryStorage::new());
        store.add_item(iphone());

        let stored: Vec<CartLineItem> =
            serde_json::from_str(store.storage().raw(CART_STORAGE_KEY).unwrap()).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].quantity, 1);
    }

    #[test]
    fn test_add_twice_scenario() {
        let mut store = CartStore::hydrated(MemoryStorage::new());
        store.add_item(iphone());
        store.add_item(iphone());

        let snapshot = store.snapshot();
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].quantity, 2);
        assert_eq!(snapshot.total_item_count, 2);
        assert_eq!(snapshot.total_price, Decimal::from(2000));
    }

    #[test]
    fn test_remove_then_totals_are_zero() {
        let mut store = CartStore::hydrated(MemoryStorage::new());
        store.add_item(iphone());
        store.remove_item(CartItemKey {
            id: PhoneId::new("1"),
            color: "black".to_string(),
            storage: "128GB".to_string(),
        });

        assert_eq!(store.total_items(), 0);
        assert_eq!(store.total_price(), Decimal::ZERO);
        assert_eq!(store.storage().raw(CART_STORAGE_KEY), Some("[]"));
    }

    #[test]
    fn test_write_failures_do_not_block_state_changes() {
        let mut store = CartStore::hydrated(BrokenStorage::default());
        store.add_item(iphone());
        store.add_item(iphone());

        assert_eq!(store.total_items(), 2);
        // One write after hydration, one per dispatch.
        assert_eq!(store.storage().writes, 3);
    }

    #[test]
    fn test_listeners_receive_snapshots() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = CartStore::hydrated(MemoryStorage::new());

        let sink = Rc::clone(&seen);
        let id = store.subscribe(move |snapshot| sink.borrow_mut().push(snapshot.total_item_count));

        store.add_item(iphone());
        store.add_item(iphone());
        store.unsubscribe(id);
        store.clear();

        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_listener_notified_on_hydration() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = CartStore::new(MemoryStorage::with_item(CART_STORAGE_KEY, stored_pixel()));

        let sink = Rc::clone(&seen);
        store.subscribe(move |snapshot| sink.borrow_mut().push(snapshot.total_price));
        store.hydrate();

        assert_eq!(*seen.borrow(), vec![Decimal::from(1800)]);
    }
}
