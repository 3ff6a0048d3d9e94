//! Mobile Shop Core - Shared types and client-side cart state.
//!
//! This crate provides the pieces shared by every Mobile Shop component:
//! - `storefront` - Proxy server in front of the upstream product API
//! - `cli` - Client that browses phones and owns the shopping cart
//!
//! # Architecture
//!
//! The core crate performs no network I/O. Cart persistence goes through the
//! [`cart::CartStorage`] trait so that hosts decide where the cart lives
//! (in memory for tests, a directory on disk for the CLI).
//!
//! # Modules
//!
//! - [`types`] - Phone projections and the type-safe `PhoneId`
//! - [`cart`] - Line items, the cart reducer, and the hydrating `CartStore`

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{
    CART_STORAGE_KEY, CartAction, CartItemKey, CartLineItem, CartSnapshot, CartStorage, CartStore,
    MemoryStorage, NewCartItem, StorageError,
};
pub use types::*;
