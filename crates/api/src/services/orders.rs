//! Order status operations for restaurant owners.

use tracing::{info, instrument};

use dinehub_core::{OrderId, OrderStatus, UserId};

use crate::db::{OrderRepository, RestaurantRepository};
use crate::error::{AppError, Result};
use crate::models::{Order, OrderDetails};

use super::restaurants::get_my_restaurant;

/// List the orders placed with the caller's restaurant, newest first.
///
/// # Errors
///
/// Returns `NotFound` if the caller owns no restaurant.
pub async fn list_my_restaurant_orders(
    restaurants: &dyn RestaurantRepository,
    orders: &dyn OrderRepository,
    owner: UserId,
) -> Result<Vec<OrderDetails>> {
    let restaurant = get_my_restaurant(restaurants, owner).await?;
    Ok(orders.list_for_restaurant(&restaurant).await?)
}

/// Move an order to `status`.
///
/// Only the owner of the restaurant the order was placed with may do this.
///
/// # Errors
///
/// Returns `NotFound` if the order does not exist and `Unauthorized` if the
/// caller does not own its restaurant.
#[instrument(skip(restaurants, orders))]
pub async fn update_order_status(
    restaurants: &dyn RestaurantRepository,
    orders: &dyn OrderRepository,
    caller: UserId,
    order_id: OrderId,
    status: OrderStatus,
) -> Result<Order> {
    let mut order = orders
        .find_by_id(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("order not found".to_string()))?;

    let owner = restaurants
        .find_by_id(order.restaurant_id)
        .await?
        .map(|restaurant| restaurant.owner);
    if owner != Some(caller) {
        return Err(AppError::Unauthorized(
            "not the owner of this order's restaurant".to_string(),
        ));
    }

    let previous = order.status;
    order.status = status;
    let order = orders.save(&order).await?;

    info!(from = %previous, to = %order.status, "Order status updated");
    Ok(order)
}
