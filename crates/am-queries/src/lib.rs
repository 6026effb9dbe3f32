//! # am-queries
//!
//! Builds the single round-trip listing queries behind the asset list, employee
//! list and dashboard endpoints.
//!
//! - `filters`: the per-request filter specification and its parsing
//! - `predicates`: the predicate catalog and the placeholder binder
//! - `composer`: listing modes, clause planning and SQL rendering
//! - `dashboard`: the per-type quantity aggregate
//!
//! Everything here is synchronous and side-effect free; execution lives in `am-db`.

pub mod composer;
pub mod dashboard;
pub mod filters;
pub mod predicates;

pub use composer::*;
pub use dashboard::*;
pub use filters::*;
pub use predicates::*;
