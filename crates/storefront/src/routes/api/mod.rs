//! JSON API route handlers.

use axum::extract::{FromRequestParts, Path, Query};

use crate::error::AppError;

pub mod phones;

/// `Query` that rejects with the JSON error envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// `Path` that rejects with the JSON error envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);
