//! Postgres order repository.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use dinehub_core::OrderId;

use super::{OrderRepository, RepositoryError};
use crate::models::{NewOrder, Order, OrderDetails, Restaurant, User};

const ORDER_COLUMNS: &str = r"
    id, restaurant_id, user_id, delivery_details, cart_items, total_amount, status, created_at
";

/// Orders stored in the `orders` table.
#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    #[instrument(skip(self, restaurant), fields(restaurant_id = %restaurant.id))]
    async fn list_for_restaurant(
        &self,
        restaurant: &Restaurant,
    ) -> Result<Vec<OrderDetails>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            r"
            SELECT {ORDER_COLUMNS} FROM orders
            WHERE restaurant_id = $1
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(restaurant.id)
        .fetch_all(&self.pool)
        .await?;

        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let mut user_ids: Vec<i32> = orders.iter().map(|o| o.user_id.as_i32()).collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let users: HashMap<_, _> = sqlx::query_as::<_, User>(
            r"
            SELECT id, auth0_id, email, name, address_line1, city, country
            FROM users
            WHERE id = ANY($1)
            ",
        )
        .bind(&user_ids)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|user| (user.id, user))
        .collect();

        orders
            .into_iter()
            .map(|order| {
                let user = users.get(&order.user_id).cloned().ok_or_else(|| {
                    RepositoryError::DataCorruption(format!(
                        "order {} references missing user {}",
                        order.id, order.user_id
                    ))
                })?;
                Ok(OrderDetails::join(order, restaurant.clone(), user))
            })
            .collect()
    }

    #[instrument(skip(self, order), fields(restaurant_id = %order.restaurant_id))]
    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let NewOrder {
            restaurant_id,
            user_id,
            delivery_details,
            cart_items,
            total_amount,
            status,
        } = order;

        let order = sqlx::query_as::<_, Order>(&format!(
            r"
            INSERT INTO orders (
                restaurant_id, user_id, delivery_details, cart_items, total_amount, status
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(restaurant_id)
        .bind(user_id)
        .bind(Json(delivery_details))
        .bind(Json(cart_items))
        .bind(total_amount)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(order)
    }

    #[instrument(skip(self, order), fields(order_id = %order.id, status = %order.status))]
    async fn save(&self, order: &Order) -> Result<Order, RepositoryError> {
        sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET status = $2 WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order.id)
        .bind(order.status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
