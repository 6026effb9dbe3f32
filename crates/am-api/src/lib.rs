//! # am-api
//!
//! HTTP surface of Asset Management RS: request extractors, error mapping,
//! handlers and the `/asset-management` router.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;

pub use error::{ApiError, ApiResult};
pub use extractors::{AppState, AuthenticatedUser, Filters, QueryParams, ValidatedJson};
pub use routes::router;
