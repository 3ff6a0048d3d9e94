//! Mobile Shop Storefront library.
//!
//! Proxy in front of the upstream phone catalog API. The binary in `main.rs`
//! serves [`routes::router`]; other crates reuse the repository and the
//! [`services::PhoneDataSource`] implementations directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;
pub mod upstream;

#[cfg(test)]
mod test_support;
