//! Core types for Mobile Shop.
//!
//! Read-only projections of upstream product data plus type-safe identifiers.

pub mod id;
pub mod phone;

pub use id::*;
pub use phone::{
    ColorOption, PhoneDetail, PhoneListItem, PhoneQuery, PhoneSpecs, SelectionError,
    SimilarProduct, StorageOption,
};
