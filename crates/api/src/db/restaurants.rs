//! Postgres restaurant repository.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use dinehub_core::{RestaurantId, UserId};

use super::{RepositoryError, RestaurantRepository};
use crate::models::{NewRestaurant, Restaurant};

const RESTAURANT_COLUMNS: &str = r"
    id, user_id AS owner, restaurant_name, address, city, country, delivery_price,
    estimated_delivery_time, cuisines, menu_items, image_url, last_updated
";

/// Restaurants stored in the `restaurants` table.
#[derive(Clone)]
pub struct PgRestaurantRepository {
    pool: PgPool,
}

impl PgRestaurantRepository {
    /// Create a new restaurant repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RestaurantRepository for PgRestaurantRepository {
    #[instrument(skip(self))]
    async fn find_by_owner(&self, owner: UserId) -> Result<Option<Restaurant>, RepositoryError> {
        let restaurant = sqlx::query_as::<_, Restaurant>(&format!(
            "SELECT {RESTAURANT_COLUMNS} FROM restaurants WHERE user_id = $1"
        ))
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(restaurant)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: RestaurantId) -> Result<Option<Restaurant>, RepositoryError> {
        let restaurant = sqlx::query_as::<_, Restaurant>(&format!(
            "SELECT {RESTAURANT_COLUMNS} FROM restaurants WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(restaurant)
    }

    #[instrument(skip(self, restaurant), fields(owner = %restaurant.owner))]
    async fn create(&self, restaurant: NewRestaurant) -> Result<Restaurant, RepositoryError> {
        let NewRestaurant {
            owner,
            details,
            image_url,
            last_updated,
        } = restaurant;

        sqlx::query_as::<_, Restaurant>(&format!(
            r"
            INSERT INTO restaurants (
                user_id, restaurant_name, address, city, country, delivery_price,
                estimated_delivery_time, cuisines, menu_items, image_url, last_updated
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {RESTAURANT_COLUMNS}
            "
        ))
        .bind(owner)
        .bind(details.restaurant_name)
        .bind(details.address)
        .bind(details.city)
        .bind(details.country)
        .bind(details.delivery_price)
        .bind(details.estimated_delivery_time)
        .bind(details.cuisines)
        .bind(Json(details.menu_items))
        .bind(image_url)
        .bind(last_updated)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "restaurant"))
    }

    #[instrument(skip(self, restaurant), fields(restaurant_id = %restaurant.id))]
    async fn save(&self, restaurant: &Restaurant) -> Result<Restaurant, RepositoryError> {
        sqlx::query_as::<_, Restaurant>(&format!(
            r"
            UPDATE restaurants
            SET restaurant_name = $2,
                address = $3,
                city = $4,
                country = $5,
                delivery_price = $6,
                estimated_delivery_time = $7,
                cuisines = $8,
                menu_items = $9,
                image_url = $10,
                last_updated = $11
            WHERE id = $1
            RETURNING {RESTAURANT_COLUMNS}
            "
        ))
        .bind(restaurant.id)
        .bind(&restaurant.restaurant_name)
        .bind(&restaurant.address)
        .bind(&restaurant.city)
        .bind(&restaurant.country)
        .bind(restaurant.delivery_price)
        .bind(restaurant.estimated_delivery_time)
        .bind(&restaurant.cuisines)
        .bind(Json(&restaurant.menu_items))
        .bind(&restaurant.image_url)
        .bind(restaurant.last_updated)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
