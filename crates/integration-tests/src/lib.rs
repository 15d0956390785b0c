//! Integration test support for DineHub.
//!
//! Builds the real API router over in-memory repositories and a fake image
//! host, so end-to-end behaviour can be checked without Postgres or
//! Cloudinary.
//!
//! # Running Tests
//!
//! ```bash
//! # Router tests (no external services)
//! cargo test -p dinehub-integration-tests
//!
//! # Postgres repository tests
//! DINEHUB_TEST_DATABASE_URL=postgres://... cargo test -p dinehub-integration-tests -- --ignored
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;

use dinehub_api::config::AuthConfig;
use dinehub_api::db::{
    HealthCheckRepository, OrderRepository, Repositories, RepositoryError, RestaurantRepository,
    UserRepository,
};
use dinehub_api::models::{
    CartItem, DeliveryDetails, NewOrder, NewRestaurant, NewUser, Order, OrderDetails, Restaurant,
    User,
};
use dinehub_api::routes::{self, HttpSettings};
use dinehub_api::services::{ImageFile, ImageUploader, MediaError};
use dinehub_api::state::AppState;
use dinehub_core::{Email, OrderId, OrderStatus, RestaurantId, UserId};

/// Header the test gateway uses for the caller's subject.
pub const SUBJECT_HEADER: &str = "x-auth-subject";

// ============================================================================
// In-memory repositories
// ============================================================================

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    restaurants: Vec<Restaurant>,
    orders: Vec<Order>,
    next_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Shared in-memory storage implementing every repository trait.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Repositories backed by this store.
    #[must_use]
    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(self.clone()),
            restaurants: Arc::new(self.clone()),
            orders: Arc::new(self.clone()),
            health: Arc::new(self.clone()),
        }
    }

    /// All stored users.
    #[must_use]
    pub fn users(&self) -> Vec<User> {
        self.lock().users.clone()
    }

    /// The stored restaurant owned by `owner`, if any.
    #[must_use]
    pub fn restaurant_of(&self, owner: UserId) -> Option<Restaurant> {
        self.lock()
            .restaurants
            .iter()
            .find(|r| r.owner == owner)
            .cloned()
    }

    /// The stored order with `id`, if any.
    #[must_use]
    pub fn order(&self, id: OrderId) -> Option<Order> {
        self.lock().orders.iter().find(|o| o.id == id).cloned()
    }

    /// Insert a user directly, as if created on an earlier login.
    ///
    /// # Panics
    ///
    /// Panics if `email` is not a valid address.
    #[must_use]
    pub fn insert_user(&self, auth0_id: &str, email: &str) -> User {
        let mut tables = self.lock();
        let user = User {
            id: UserId::new(tables.next_id()),
            auth0_id: auth0_id.to_owned(),
            email: Email::parse(email).expect("valid test email"),
            name: None,
            address_line1: None,
            city: None,
            country: None,
        };
        tables.users.push(user.clone());
        user
    }

    /// Insert an order directly, as if written by checkout.
    #[must_use]
    pub fn insert_order(&self, restaurant: RestaurantId, diner: &User, status: OrderStatus) -> Order {
        let mut tables = self.lock();
        let order = Order {
            id: OrderId::new(tables.next_id()),
            restaurant_id: restaurant,
            user_id: diner.id,
            delivery_details: DeliveryDetails {
                email: diner.email.to_string(),
                name: "Test Diner".to_owned(),
                address_line1: "1 Test Street".to_owned(),
                city: "Testville".to_owned(),
            },
            cart_items: vec![CartItem {
                menu_item_id: "0".to_owned(),
                name: "Korma".to_owned(),
                quantity: 1,
            }],
            total_amount: None,
            status,
            created_at: Utc::now(),
        };
        tables.orders.push(order.clone());
        order
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_auth0_id(&self, auth0_id: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.auth0_id == auth0_id)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut tables = self.lock();
        if tables.users.iter().any(|u| u.auth0_id == user.auth0_id) {
            return Err(RepositoryError::Conflict("user already exists".to_owned()));
        }
        let created = User {
            id: UserId::new(tables.next_id()),
            auth0_id: user.auth0_id,
            email: user.email,
            name: user.profile.name,
            address_line1: user.profile.address_line1,
            city: user.profile.city,
            country: user.profile.country,
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn save(&self, user: &User) -> Result<User, RepositoryError> {
        let mut tables = self.lock();
        let stored = tables
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(RepositoryError::NotFound)?;
        *stored = user.clone();
        Ok(user.clone())
    }
}

#[async_trait]
impl RestaurantRepository for InMemoryStore {
    async fn find_by_owner(&self, owner: UserId) -> Result<Option<Restaurant>, RepositoryError> {
        Ok(self.restaurant_of(owner))
    }

    async fn find_by_id(&self, id: RestaurantId) -> Result<Option<Restaurant>, RepositoryError> {
        Ok(self
            .lock()
            .restaurants
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn create(&self, restaurant: NewRestaurant) -> Result<Restaurant, RepositoryError> {
        let mut tables = self.lock();
        if tables.restaurants.iter().any(|r| r.owner == restaurant.owner) {
            return Err(RepositoryError::Conflict(
                "restaurant already exists".to_owned(),
            ));
        }
        let NewRestaurant {
            owner,
            details,
            image_url,
            last_updated,
        } = restaurant;
        let created = Restaurant {
            id: RestaurantId::new(tables.next_id()),
            owner,
            restaurant_name: details.restaurant_name,
            address: details.address,
            city: details.city,
            country: details.country,
            delivery_price: details.delivery_price,
            estimated_delivery_time: details.estimated_delivery_time,
            cuisines: details.cuisines,
            menu_items: details.menu_items,
            image_url,
            last_updated,
        };
        tables.restaurants.push(created.clone());
        Ok(created)
    }

    async fn save(&self, restaurant: &Restaurant) -> Result<Restaurant, RepositoryError> {
        let mut tables = self.lock();
        let stored = tables
            .restaurants
            .iter_mut()
            .find(|r| r.id == restaurant.id)
            .ok_or(RepositoryError::NotFound)?;
        *stored = restaurant.clone();
        Ok(restaurant.clone())
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.order(id))
    }

    async fn list_for_restaurant(
        &self,
        restaurant: &Restaurant,
    ) -> Result<Vec<OrderDetails>, RepositoryError> {
        let tables = self.lock();
        let mut orders: Vec<Order> = tables
            .orders
            .iter()
            .filter(|o| o.restaurant_id == restaurant.id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        orders
            .into_iter()
            .map(|order| {
                let user = tables
                    .users
                    .iter()
                    .find(|u| u.id == order.user_id)
                    .cloned()
                    .ok_or_else(|| {
                        RepositoryError::DataCorruption(format!(
                            "order {} references missing user {}",
                            order.id, order.user_id
                        ))
                    })?;
                Ok(OrderDetails::join(order, restaurant.clone(), user))
            })
            .collect()
    }

    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let mut tables = self.lock();
        let created = Order {
            id: OrderId::new(tables.next_id()),
            restaurant_id: order.restaurant_id,
            user_id: order.user_id,
            delivery_details: order.delivery_details,
            cart_items: order.cart_items,
            total_amount: order.total_amount,
            status: order.status,
            created_at: Utc::now(),
        };
        tables.orders.push(created.clone());
        Ok(created)
    }

    async fn save(&self, order: &Order) -> Result<Order, RepositoryError> {
        let mut tables = self.lock();
        let stored = tables
            .orders
            .iter_mut()
            .find(|o| o.id == order.id)
            .ok_or(RepositoryError::NotFound)?;
        stored.status = order.status;
        Ok(stored.clone())
    }
}

#[async_trait]
impl HealthCheckRepository for InMemoryStore {
    async fn check(&self) -> bool {
        true
    }
}

// ============================================================================
// Fake image host
// ============================================================================

/// Image host that records uploads and hands out predictable URLs.
#[derive(Debug, Default)]
pub struct FakeImageHost {
    uploads: Mutex<Vec<ImageFile>>,
    fail: bool,
}

impl FakeImageHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A host that rejects every upload.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Every image uploaded so far, in order.
    #[must_use]
    pub fn uploads(&self) -> Vec<ImageFile> {
        self.uploads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ImageUploader for FakeImageHost {
    async fn upload(&self, image: ImageFile) -> Result<String, MediaError> {
        if self.fail {
            return Err(MediaError::Api("upload rejected".to_owned()));
        }
        let mut uploads = self.uploads.lock().unwrap_or_else(PoisonError::into_inner);
        uploads.push(image);
        Ok(format!("https://images.test/{}.png", uploads.len()))
    }
}

// ============================================================================
// Test application
// ============================================================================

/// The API router wired to in-memory collaborators.
pub struct TestApp {
    pub store: InMemoryStore,
    pub images: Arc<FakeImageHost>,
    router: Router,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        Self::build(FakeImageHost::new(), &HttpSettings::default())
    }

    /// A test app whose image host rejects every upload.
    #[must_use]
    pub fn with_failing_images() -> Self {
        Self::build(FakeImageHost::failing(), &HttpSettings::default())
    }

    /// A test app with a custom request body limit.
    #[must_use]
    pub fn with_upload_limit(max_upload_bytes: usize) -> Self {
        let settings = HttpSettings {
            max_upload_bytes,
            ..HttpSettings::default()
        };
        Self::build(FakeImageHost::new(), &settings)
    }

    /// A test app restricting CORS to `origin`.
    #[must_use]
    pub fn with_allowed_origin(origin: &str) -> Self {
        let settings = HttpSettings {
            allowed_origin: Some(origin.to_owned()),
            ..HttpSettings::default()
        };
        Self::build(FakeImageHost::new(), &settings)
    }

    fn build(images: FakeImageHost, settings: &HttpSettings) -> Self {
        let store = InMemoryStore::new();
        let images = Arc::new(images);
        let state = AppState::new(store.repositories(), images.clone(), AuthConfig::default());
        Self {
            store,
            images,
            router: routes::app(state, settings),
        }
    }

    /// Send a request through the router.
    ///
    /// # Panics
    ///
    /// Panics if the response body cannot be read.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let Ok(response) = self.router.clone().oneshot(request).await;
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read response body");
        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    /// Parse the body as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not valid JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }
}

// ============================================================================
// Request builders
// ============================================================================

/// Build a request with an optional caller subject and JSON body.
///
/// # Panics
///
/// Panics if the request cannot be built.
#[must_use]
pub fn json_request(method: Method, uri: &str, subject: Option<&str>, body: Option<&Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(subject) = subject {
        builder = builder.header(SUBJECT_HEADER, subject);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    };
    request.expect("valid request")
}

/// A `multipart/form-data` body under construction.
#[derive(Debug, Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    const BOUNDARY: &'static str = "dinehub-test-boundary";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text field.
    #[must_use]
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n",
                Self::BOUNDARY
            )
            .as_bytes(),
        );
        self
    }

    /// Add a file field.
    #[must_use]
    pub fn file(mut self, name: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n",
                Self::BOUNDARY
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Finish the form into a request.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    #[must_use]
    pub fn into_request(mut self, method: Method, uri: &str, subject: Option<&str>) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", Self::BOUNDARY).as_bytes());

        let mut builder = Request::builder().method(method).uri(uri).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", Self::BOUNDARY),
        );
        if let Some(subject) = subject {
            builder = builder.header(SUBJECT_HEADER, subject);
        }
        builder.body(Body::from(self.body)).expect("valid request")
    }
}

/// The text fields of a valid restaurant form.
#[must_use]
pub fn restaurant_form(name: &str) -> MultipartForm {
    MultipartForm::new()
        .text("restaurantName", name)
        .text("city", "Leeds")
        .text("country", "United Kingdom")
        .text("deliveryPrice", "250")
        .text("estimatedDeliveryTime", "30")
        .text("cuisines[0]", "Indian")
        .text("cuisines[1]", "Thai")
        .text("menuItems[0][name]", "Korma")
        .text("menuItems[0][price]", "899")
}

/// A tiny PNG-typed payload.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-a-png";
