//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AuthConfig;
use crate::db::{
    HealthCheckRepository, OrderRepository, Repositories, RestaurantRepository, UserRepository,
};
use crate::services::media::ImageUploader;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Storage and image hosting sit behind trait
/// objects so the router can run against in-memory implementations.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    repositories: Repositories,
    images: Arc<dyn ImageUploader>,
    auth: AuthConfig,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(repositories: Repositories, images: Arc<dyn ImageUploader>, auth: AuthConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                repositories,
                images,
                auth,
            }),
        }
    }

    #[must_use]
    pub fn users(&self) -> &dyn UserRepository {
        self.inner.repositories.users.as_ref()
    }

    #[must_use]
    pub fn restaurants(&self) -> &dyn RestaurantRepository {
        self.inner.repositories.restaurants.as_ref()
    }

    #[must_use]
    pub fn orders(&self) -> &dyn OrderRepository {
        self.inner.repositories.orders.as_ref()
    }

    #[must_use]
    pub fn health(&self) -> &dyn HealthCheckRepository {
        self.inner.repositories.health.as_ref()
    }

    /// Get the image host used for restaurant photos.
    #[must_use]
    pub fn images(&self) -> &dyn ImageUploader {
        self.inner.images.as_ref()
    }

    /// Get the caller identification settings.
    #[must_use]
    pub fn auth(&self) -> &AuthConfig {
        &self.inner.auth
    }
}
