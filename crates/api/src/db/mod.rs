//! Persistence for users, restaurants and orders.
//!
//! # Tables
//!
//! - `users` - Profiles keyed by auth provider subject (`auth0_id`, unique)
//! - `restaurants` - One per owner (`user_id`, unique); cuisines as `TEXT[]`,
//!   menu items as `JSONB`
//! - `orders` - Written by checkout, status updated here; delivery details
//!   and cart items as `JSONB`
//!
//! # Repositories
//!
//! Handlers talk to the traits below, never to `sqlx` directly. The Postgres
//! implementations live in the submodules; the integration tests provide
//! in-memory ones.
//!
//! Every `save` overwrites all mutable columns of the record it is given.
//! There is no version column and no transaction around a load-modify-save
//! sequence, so concurrent writers to the same record race and the last
//! write wins.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p dinehub-cli -- migrate
//! ```

pub mod health;
pub mod orders;
pub mod restaurants;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use dinehub_core::{OrderId, RestaurantId, UserId};

use crate::models::{NewOrder, NewRestaurant, NewUser, Order, OrderDetails, Restaurant, User};

pub use health::PgHealthCheckRepository;
pub use orders::PgOrderRepository;
pub use restaurants::PgRestaurantRepository;
pub use users::PgUserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The record to save no longer exists.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., a second restaurant for the same owner).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map unique violations to [`RepositoryError::Conflict`].
    pub(crate) fn from_insert(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(err)
    }
}

/// User storage.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    async fn find_by_auth0_id(&self, auth0_id: &str) -> Result<Option<User>, RepositoryError>;

    /// Insert a user. Fails with `Conflict` if the `auth0_id` is taken.
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// Overwrite the profile fields of an existing user.
    async fn save(&self, user: &User) -> Result<User, RepositoryError>;
}

/// Restaurant storage.
#[async_trait]
pub trait RestaurantRepository: Send + Sync {
    async fn find_by_owner(&self, owner: UserId) -> Result<Option<Restaurant>, RepositoryError>;

    async fn find_by_id(&self, id: RestaurantId) -> Result<Option<Restaurant>, RepositoryError>;

    /// Insert a restaurant. Fails with `Conflict` if the owner already has one.
    async fn create(&self, restaurant: NewRestaurant) -> Result<Restaurant, RepositoryError>;

    /// Overwrite every mutable field of an existing restaurant.
    async fn save(&self, restaurant: &Restaurant) -> Result<Restaurant, RepositoryError>;
}

/// Order storage.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// All orders for `restaurant`, newest first, each joined with the
    /// restaurant and the ordering user.
    async fn list_for_restaurant(
        &self,
        restaurant: &Restaurant,
    ) -> Result<Vec<OrderDetails>, RepositoryError>;

    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError>;

    /// Overwrite the status of an existing order.
    async fn save(&self, order: &Order) -> Result<Order, RepositoryError>;
}

/// Database liveness probe.
#[async_trait]
pub trait HealthCheckRepository: Send + Sync {
    async fn check(&self) -> bool;
}

/// The repositories handlers depend on.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub restaurants: Arc<dyn RestaurantRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub health: Arc<dyn HealthCheckRepository>,
}

impl Repositories {
    /// Postgres-backed repositories sharing one pool.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            restaurants: Arc::new(PgRestaurantRepository::new(pool.clone())),
            orders: Arc::new(PgOrderRepository::new(pool.clone())),
            health: Arc::new(PgHealthCheckRepository::new(pool)),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Migrations embedded from `crates/api/migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
