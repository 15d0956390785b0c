//! Development seeding.
//!
//! Orders are normally written by the checkout flow, which runs elsewhere.
//! `seed orders` stands in for it so the restaurant order screens have data.

use thiserror::Error;

use dinehub_api::db::{
    self, OrderRepository, PgOrderRepository, PgRestaurantRepository, PgUserRepository,
    RepositoryError, RestaurantRepository, UserRepository,
};
use dinehub_api::models::{CartItem, DeliveryDetails, NewOrder, NewUser, User, UserProfile};
use dinehub_core::{Email, EmailError, OrderStatus, Price};

/// Demo diners that place the seeded orders.
const DINERS: [(&str, &str, &str); 3] = [
    ("seed|diner-1", "ada@dinehub.test", "Ada Lovelace"),
    ("seed|diner-2", "alan@dinehub.test", "Alan Turing"),
    ("seed|diner-3", "grace@dinehub.test", "Grace Hopper"),
];

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("No user with auth0 id: {0}")]
    UserNotFound(String),

    #[error("User {0} has no restaurant")]
    RestaurantNotFound(String),

    #[error("Invalid demo email: {0}")]
    InvalidEmail(#[from] EmailError),
}

/// Create `count` orders against the restaurant owned by `owner_auth0_id`.
///
/// Orders cycle through the demo diners, the restaurant's menu and every
/// order status.
///
/// # Errors
///
/// Returns an error if the owner or their restaurant does not exist, or a
/// database operation fails.
pub async fn orders(owner_auth0_id: &str, count: u32) -> Result<u32, SeedError> {
    let database_url =
        super::database_url().ok_or(SeedError::MissingEnvVar("DINEHUB_DATABASE_URL"))?;
    let pool = db::create_pool(&database_url).await?;

    let users = PgUserRepository::new(pool.clone());
    let restaurants = PgRestaurantRepository::new(pool.clone());
    let orders = PgOrderRepository::new(pool);

    let owner = users
        .find_by_auth0_id(owner_auth0_id)
        .await?
        .ok_or_else(|| SeedError::UserNotFound(owner_auth0_id.to_owned()))?;
    let restaurant = restaurants
        .find_by_owner(owner.id)
        .await?
        .ok_or_else(|| SeedError::RestaurantNotFound(owner_auth0_id.to_owned()))?;

    let mut diners = Vec::with_capacity(DINERS.len());
    for (auth0_id, email, name) in DINERS {
        diners.push(demo_diner(&users, auth0_id, email, name, &restaurant.city).await?);
    }

    tracing::info!(
        restaurant_id = %restaurant.id,
        count,
        "Seeding orders for {}",
        restaurant.restaurant_name
    );

    let mut menu = restaurant.menu_items.iter().enumerate().cycle();
    let mut statuses = OrderStatus::ALL.iter().copied().cycle();
    let mut created = 0;

    for (n, diner) in (0..count).zip(diners.iter().cycle()) {
        let cart_items: Vec<CartItem> = menu
            .next()
            .map(|(index, item)| CartItem {
                menu_item_id: index.to_string(),
                name: item.name.clone(),
                quantity: n % 3 + 1,
            })
            .into_iter()
            .collect();

        let total = cart_items
            .iter()
            .filter_map(|line| {
                let index: usize = line.menu_item_id.parse().ok()?;
                let item = restaurant.menu_items.get(index)?;
                Some(item.price.times(line.quantity))
            })
            .fold(restaurant.delivery_price, Price::saturating_add);

        let order = orders
            .create(NewOrder {
                restaurant_id: restaurant.id,
                user_id: diner.id,
                delivery_details: DeliveryDetails {
                    email: diner.email.to_string(),
                    name: diner.name.clone().unwrap_or_default(),
                    address_line1: diner.address_line1.clone().unwrap_or_default(),
                    city: diner.city.clone().unwrap_or_default(),
                },
                cart_items,
                total_amount: Some(total),
                status: statuses.next().unwrap_or_default(),
            })
            .await?;

        tracing::debug!(order_id = %order.id, status = %order.status, "Order created");
        created += 1;
    }

    Ok(created)
}

async fn demo_diner(
    users: &PgUserRepository,
    auth0_id: &str,
    email: &str,
    name: &str,
    city: &str,
) -> Result<User, SeedError> {
    if let Some(user) = users.find_by_auth0_id(auth0_id).await? {
        return Ok(user);
    }

    let user = users
        .create(NewUser {
            auth0_id: auth0_id.to_owned(),
            email: Email::parse(email)?,
            profile: UserProfile {
                name: Some(name.to_owned()),
                address_line1: Some("1 Demo Street".to_owned()),
                city: Some(city.to_owned()),
                country: None,
            },
        })
        .await?;

    tracing::info!(user_id = %user.id, "Created demo diner {auth0_id}");
    Ok(user)
}
