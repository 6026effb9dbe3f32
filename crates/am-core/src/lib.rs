//! # am-core
//!
//! Core types and utilities for Asset Management RS.
//!
//! This crate provides the building blocks shared by the other crates:
//! - Common error types
//! - Domain enums (asset types, asset/employee/user statuses)
//! - Request models with validation rules
//! - Configuration types

pub mod config;
pub mod error;
pub mod models;
pub mod types;

pub use error::*;
pub use types::*;
