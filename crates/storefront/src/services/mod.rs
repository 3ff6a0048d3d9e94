//! Business logic services for storefront.
//!
//! # Services
//!
//! - `phones` - Phone catalog access with interchangeable data sources

pub mod phones;

pub use phones::{PhoneDataSource, ProxySource, RepositorySource, ServiceError};
