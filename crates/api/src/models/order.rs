//! Order domain types.
//!
//! Orders are created by the checkout flow; this service only reads them and
//! changes their status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dinehub_core::{OrderId, OrderStatus, Price, RestaurantId, UserId};

use super::{Restaurant, User};

/// Where and to whom an order is delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryDetails {
    pub email: String,
    pub name: String,
    pub address_line1: String,
    pub city: String,
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub menu_item_id: String,
    pub name: String,
    pub quantity: u32,
}

/// An order placed with a restaurant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(rename = "restaurant")]
    pub restaurant_id: RestaurantId,
    #[serde(rename = "user")]
    pub user_id: UserId,
    #[sqlx(json)]
    pub delivery_details: DeliveryDetails,
    #[sqlx(json)]
    pub cart_items: Vec<CartItem>,
    /// Set once checkout has priced the order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Price>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// An order with its restaurant and customer expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    #[serde(rename = "_id")]
    pub id: OrderId,
    pub restaurant: Restaurant,
    pub user: User,
    pub delivery_details: DeliveryDetails,
    pub cart_items: Vec<CartItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Price>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl OrderDetails {
    /// Join an order with its restaurant and customer.
    ///
    /// The caller is responsible for passing the records the order references.
    #[must_use]
    pub fn join(order: Order, restaurant: Restaurant, user: User) -> Self {
        debug_assert_eq!(order.restaurant_id, restaurant.id);
        debug_assert_eq!(order.user_id, user.id);
        Self {
            id: order.id,
            restaurant,
            user,
            delivery_details: order.delivery_details,
            cart_items: order.cart_items,
            total_amount: order.total_amount,
            status: order.status,
            created_at: order.created_at,
        }
    }
}

/// Parameters for creating an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub restaurant_id: RestaurantId,
    pub user_id: UserId,
    pub delivery_details: DeliveryDetails,
    pub cart_items: Vec<CartItem>,
    pub total_amount: Option<Price>,
    pub status: OrderStatus,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_order_serializes_references() {
        let order = Order {
            id: OrderId::new(5),
            restaurant_id: RestaurantId::new(2),
            user_id: UserId::new(3),
            delivery_details: DeliveryDetails {
                email: "diner@example.com".to_owned(),
                name: "Ada".to_owned(),
                address_line1: "1 Main St".to_owned(),
                city: "London".to_owned(),
            },
            cart_items: vec![CartItem {
                menu_item_id: "0".to_owned(),
                name: "Korma".to_owned(),
                quantity: 2,
            }],
            total_amount: None,
            status: OrderStatus::InProgress,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["_id"], 5);
        assert_eq!(json["restaurant"], 2);
        assert_eq!(json["user"], 3);
        assert_eq!(json["status"], "inProgress");
        assert_eq!(json["deliveryDetails"]["addressLine1"], "1 Main St");
        assert_eq!(json["cartItems"][0]["menuItemId"], "0");
        assert!(json.get("totalAmount").is_none());
    }
}
