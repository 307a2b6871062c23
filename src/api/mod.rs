//! API routes and handlers
pub mod accounts;
pub mod media;
pub mod transactions;

use crate::{context::AppContext, error::FareboxError};
use axum::extract::{FromRequest, FromRequestParts};
use axum::Router;

/// JSON body extractor that reports malformed bodies in the uniform
/// `{"error": ...}` shape instead of axum's default rejection
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(FareboxError))]
pub struct AppJson<T>(pub T);

/// Path extractor with the same uniform rejection shape
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(FareboxError))]
pub struct AppPath<T>(pub T);

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(accounts::routes())
        .merge(media::routes())
        .merge(transactions::routes())
}
