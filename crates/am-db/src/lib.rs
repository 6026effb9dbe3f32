//! # am-db
//!
//! Database layer for Asset Management RS.
//!
//! This crate provides PostgreSQL database access using SQLx, including:
//!
//! - Connection pool management and migrations
//! - Repositories for assets, employees and users
//! - The listing executor running the composed filter queries
//!
//! ## Example
//!
//! ```ignore
//! use am_db::{Database, DatabaseConfig, ListingExecutor, PgListingStore};
//!
//! let db = Database::connect(&DatabaseConfig::with_url(url)).await?;
//! let listings = ListingExecutor::new(PgListingStore::new(db.pool().clone()));
//! let page = listings.list_employees(&spec).await?;
//! ```

pub mod assets;
pub mod employees;
pub mod listing;
pub mod pool;
pub mod repository;
pub mod users;

// Re-exports
pub use assets::{AssetDetails, AssetRepository, AvailabilityFilter, AvailableAsset, EmployeeHistoryRow};
pub use employees::{AssetHistoryRow, EmployeeRepository};
pub use listing::{
    AssetQuantitySummary, AssetRow, EmployeeRow, ListingExecutor, ListingStore, PgListingStore,
};
pub use pool::{Database, DatabaseConfig, PoolStats};
pub use repository::{CountedRow, RepositoryError, RepositoryResult, ResultPage};
pub use users::{AccessState, AccessedByRow, UserCredentials, UserDetails, UserRepository};
