//! Service behaviour when records appear or vanish between a read and the
//! write that follows it.

#![allow(clippy::indexing_slicing)]

use async_trait::async_trait;

use dinehub_api::db::{RepositoryError, RestaurantRepository, UserRepository};
use dinehub_api::error::AppError;
use dinehub_api::models::{NewRestaurant, NewUser, Restaurant, RestaurantDetails, User, UserProfile};
use dinehub_api::services::ImageFile;
use dinehub_api::services::{orders, restaurants, users};
use dinehub_core::{Email, OrderStatus, RestaurantId, UserId};
use dinehub_integration_tests::{FakeImageHost, InMemoryStore, PNG_BYTES};

/// Lookups miss as if another request had not committed yet (or had just
/// deleted the record); writes go through to the store.
struct StaleReads(InMemoryStore);

#[async_trait]
impl UserRepository for StaleReads {
    async fn find_by_id(&self, _id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(None)
    }

    async fn find_by_auth0_id(&self, _auth0_id: &str) -> Result<Option<User>, RepositoryError> {
        Ok(None)
    }

    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        UserRepository::create(&self.0, user).await
    }

    async fn save(&self, user: &User) -> Result<User, RepositoryError> {
        UserRepository::save(&self.0, user).await
    }
}

#[async_trait]
impl RestaurantRepository for StaleReads {
    async fn find_by_owner(&self, _owner: UserId) -> Result<Option<Restaurant>, RepositoryError> {
        Ok(None)
    }

    async fn find_by_id(&self, _id: RestaurantId) -> Result<Option<Restaurant>, RepositoryError> {
        Ok(None)
    }

    async fn create(&self, restaurant: NewRestaurant) -> Result<Restaurant, RepositoryError> {
        RestaurantRepository::create(&self.0, restaurant).await
    }

    async fn save(&self, restaurant: &Restaurant) -> Result<Restaurant, RepositoryError> {
        RestaurantRepository::save(&self.0, restaurant).await
    }
}

fn new_user(auth0_id: &str) -> NewUser {
    NewUser {
        auth0_id: auth0_id.to_owned(),
        email: Email::parse("ada@example.com").expect("valid email"),
        profile: UserProfile::default(),
    }
}

fn details(name: &str) -> RestaurantDetails {
    RestaurantDetails::from_fields([
        ("restaurantName".to_owned(), name.to_owned()),
        ("city".to_owned(), "Leeds".to_owned()),
        ("country".to_owned(), "United Kingdom".to_owned()),
        ("deliveryPrice".to_owned(), "250".to_owned()),
        ("estimatedDeliveryTime".to_owned(), "30".to_owned()),
        ("cuisines[0]".to_owned(), "Indian".to_owned()),
        ("menuItems[0][name]".to_owned(), "Korma".to_owned()),
        ("menuItems[0][price]".to_owned(), "899".to_owned()),
    ])
    .expect("valid restaurant fields")
}

fn image() -> ImageFile {
    ImageFile {
        content_type: "image/png".to_owned(),
        bytes: PNG_BYTES.to_vec(),
    }
}

#[tokio::test]
async fn test_create_user_unique_clash_counts_as_existing() {
    let store = InMemoryStore::new();
    let stale = StaleReads(store.clone());

    let first = users::create_user(&stale, new_user("auth0|ada"))
        .await
        .expect("first create");
    assert!(matches!(first, users::CreateUser::Created(_)));

    let second = users::create_user(&stale, new_user("auth0|ada"))
        .await
        .expect("second create");
    assert!(matches!(second, users::CreateUser::AlreadyExists));
    assert_eq!(store.users().len(), 1);
}

#[tokio::test]
async fn test_update_user_that_vanished_is_not_found() {
    let store = InMemoryStore::new();
    let user = store.insert_user("auth0|ada", "ada@example.com");
    let stale = StaleReads(store.clone());

    let profile = UserProfile {
        name: Some("Ada".to_owned()),
        ..UserProfile::default()
    };
    let result = users::update_user(&stale, user.id, profile).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(store.users()[0].name, None);
}

#[tokio::test]
async fn test_create_restaurant_unique_clash_is_conflict() {
    let store = InMemoryStore::new();
    let owner = store.insert_user("auth0|owner", "owner@example.com");
    let images = FakeImageHost::new();

    restaurants::create_my_restaurant(
        &store,
        &images,
        owner.id,
        details("Curry Corner"),
        image(),
        chrono::Utc::now(),
    )
    .await
    .expect("first restaurant");

    let stale = StaleReads(store.clone());
    let result = restaurants::create_my_restaurant(
        &stale,
        &images,
        owner.id,
        details("Second Helping"),
        image(),
        chrono::Utc::now(),
    )
    .await;

    let Err(err) = result else {
        panic!("second restaurant was created");
    };
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(err.status(), axum::http::StatusCode::CONFLICT);
    assert_eq!(
        store
            .restaurant_of(owner.id)
            .expect("restaurant kept")
            .restaurant_name,
        "Curry Corner"
    );
}

#[tokio::test]
async fn test_status_update_for_order_without_restaurant_is_unauthorized() {
    let store = InMemoryStore::new();
    let owner = store.insert_user("auth0|owner", "owner@example.com");
    let diner = store.insert_user("auth0|diner", "diner@example.com");
    let order = store.insert_order(RestaurantId::new(999), &diner, OrderStatus::Paid);

    let result = orders::update_order_status(
        &store,
        &store,
        owner.id,
        order.id,
        OrderStatus::Delivered,
    )
    .await;

    assert!(matches!(result, Err(AppError::Unauthorized(_))));
    assert_eq!(
        store.order(order.id).expect("order kept").status,
        OrderStatus::Paid
    );
}
