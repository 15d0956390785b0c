//! DineHub Core - Shared domain types.
//!
//! This crate provides the types shared by every DineHub component:
//! - `api` - REST service for restaurant owners and user profiles
//! - `cli` - Command-line tools for migrations and development seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. Postgres encoding is available behind the `postgres`
//! feature so the types can be bound directly in queries.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, prices and order statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
