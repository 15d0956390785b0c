//! Postgres repository tests.
//!
//! These tests require a disposable `PostgreSQL` database:
//!
//! ```bash
//! DINEHUB_TEST_DATABASE_URL=postgres://localhost/dinehub_test \
//!     cargo test -p dinehub-integration-tests -- --ignored
//! ```

use secrecy::SecretString;

use dinehub_api::db::{
    self, OrderRepository, PgOrderRepository, PgRestaurantRepository, PgUserRepository,
    RepositoryError, RestaurantRepository, UserRepository,
};
use dinehub_api::models::{
    CartItem, DeliveryDetails, MenuItem, NewOrder, NewRestaurant, NewUser, RestaurantDetails,
    User, UserProfile,
};
use dinehub_core::{Email, OrderStatus, Price};

async fn pool() -> sqlx::PgPool {
    let url = std::env::var("DINEHUB_TEST_DATABASE_URL")
        .expect("DINEHUB_TEST_DATABASE_URL must be set");
    let pool = db::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to test database");
    db::MIGRATOR
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// A subject no earlier run has used.
fn unique_subject(prefix: &str) -> String {
    let nanos = chrono::Utc::now()
        .timestamp_nanos_opt()
        .expect("timestamp in range");
    format!("test|{prefix}-{nanos}")
}

async fn create_user(users: &PgUserRepository, prefix: &str) -> User {
    users
        .create(NewUser {
            auth0_id: unique_subject(prefix),
            email: Email::parse("test@dinehub.test").expect("valid email"),
            profile: UserProfile::default(),
        })
        .await
        .expect("Failed to create user")
}

fn details(name: &str) -> RestaurantDetails {
    RestaurantDetails {
        restaurant_name: name.to_owned(),
        address: None,
        city: "Leeds".to_owned(),
        country: "United Kingdom".to_owned(),
        delivery_price: Price::new(250).expect("valid price"),
        estimated_delivery_time: 30,
        cuisines: vec!["Indian".to_owned(), "Thai".to_owned()],
        menu_items: vec![MenuItem {
            name: "Korma".to_owned(),
            price: Price::new(899).expect("valid price"),
        }],
    }
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL test database"]
async fn test_user_unique_subject_conflicts() {
    let users = PgUserRepository::new(pool().await);
    let user = create_user(&users, "dup").await;

    let result = users
        .create(NewUser {
            auth0_id: user.auth0_id.clone(),
            email: user.email.clone(),
            profile: UserProfile::default(),
        })
        .await;

    assert!(matches!(result, Err(RepositoryError::Conflict(_))));
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL test database"]
async fn test_restaurant_round_trips_lists() {
    let pool = pool().await;
    let users = PgUserRepository::new(pool.clone());
    let restaurants = PgRestaurantRepository::new(pool);
    let owner = create_user(&users, "owner").await;

    let created = restaurants
        .create(NewRestaurant {
            owner: owner.id,
            details: details("Curry Corner"),
            image_url: "https://images.test/1.png".to_owned(),
            last_updated: chrono::Utc::now(),
        })
        .await
        .expect("Failed to create restaurant");

    let found = restaurants
        .find_by_owner(owner.id)
        .await
        .expect("query")
        .expect("restaurant exists");
    assert_eq!(found.id, created.id);
    assert_eq!(found.cuisines, vec!["Indian", "Thai"]);
    assert_eq!(found.menu_items.len(), 1);

    let second = restaurants
        .create(NewRestaurant {
            owner: owner.id,
            details: details("Second"),
            image_url: "https://images.test/2.png".to_owned(),
            last_updated: chrono::Utc::now(),
        })
        .await;
    assert!(matches!(second, Err(RepositoryError::Conflict(_))));
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL test database"]
async fn test_order_status_round_trips() {
    let pool = pool().await;
    let users = PgUserRepository::new(pool.clone());
    let restaurants = PgRestaurantRepository::new(pool.clone());
    let orders = PgOrderRepository::new(pool);

    let owner = create_user(&users, "owner").await;
    let diner = create_user(&users, "diner").await;
    let restaurant = restaurants
        .create(NewRestaurant {
            owner: owner.id,
            details: details("Curry Corner"),
            image_url: "https://images.test/1.png".to_owned(),
            last_updated: chrono::Utc::now(),
        })
        .await
        .expect("Failed to create restaurant");

    let mut order = orders
        .create(NewOrder {
            restaurant_id: restaurant.id,
            user_id: diner.id,
            delivery_details: DeliveryDetails {
                email: "test@dinehub.test".to_owned(),
                name: "Diner".to_owned(),
                address_line1: "1 Test Street".to_owned(),
                city: "Leeds".to_owned(),
            },
            cart_items: vec![CartItem {
                menu_item_id: "0".to_owned(),
                name: "Korma".to_owned(),
                quantity: 2,
            }],
            total_amount: None,
            status: OrderStatus::Paid,
        })
        .await
        .expect("Failed to create order");

    order.status = OrderStatus::OutForDelivery;
    let saved = orders.save(&order).await.expect("Failed to save order");
    assert_eq!(saved.status, OrderStatus::OutForDelivery);

    let listed = orders
        .list_for_restaurant(&restaurant)
        .await
        .expect("Failed to list orders");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed.first().map(|o| o.user.id), Some(diner.id));
}
