//! DineHub API library.
//!
//! REST API for the signed-in side of the DineHub food-ordering app: a
//! diner's own profile, a restaurant owner's restaurant, and the status of the
//! orders placed with it. Exposed as a library so the router can be built
//! against in-memory repositories in tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
