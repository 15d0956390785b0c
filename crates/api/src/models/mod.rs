//! Domain models.
//!
//! These are the records persisted by the repositories in [`crate::db`] and
//! serialized to JSON by the route handlers. Field names follow the wire
//! contract of the web frontend: camelCase, with record IDs as `_id` and
//! owner references as `user` / `restaurant`.

pub mod order;
pub mod restaurant;
pub mod user;

pub use order::{CartItem, DeliveryDetails, NewOrder, Order, OrderDetails};
pub use restaurant::{FormError, MenuItem, NewRestaurant, Restaurant, RestaurantDetails};
pub use user::{CurrentUser, NewUser, User, UserProfile};
