//! Restaurant profile operations.

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use dinehub_core::UserId;

use super::media::{ImageFile, ImageUploader};
use crate::db::RestaurantRepository;
use crate::error::{AppError, Result};
use crate::models::{NewRestaurant, Restaurant, RestaurantDetails};

/// Load the restaurant owned by `owner`.
///
/// # Errors
///
/// Returns `NotFound` if the caller owns no restaurant.
pub async fn get_my_restaurant(
    restaurants: &dyn RestaurantRepository,
    owner: UserId,
) -> Result<Restaurant> {
    restaurants
        .find_by_owner(owner)
        .await?
        .ok_or_else(|| AppError::NotFound("restaurant not found".to_string()))
}

/// Create the caller's restaurant.
///
/// The image is uploaded before anything is written.
///
/// # Errors
///
/// Returns `Conflict` if the caller already owns a restaurant, or an upload
/// or database error.
#[instrument(skip(restaurants, images, details, image))]
pub async fn create_my_restaurant(
    restaurants: &dyn RestaurantRepository,
    images: &dyn ImageUploader,
    owner: UserId,
    details: RestaurantDetails,
    image: ImageFile,
    now: DateTime<Utc>,
) -> Result<Restaurant> {
    if restaurants.find_by_owner(owner).await?.is_some() {
        return Err(AppError::Conflict("User restaurant already exists".to_string()));
    }

    let image_url = images.upload(image).await?;

    let restaurant = restaurants
        .create(NewRestaurant {
            owner,
            details,
            image_url,
            last_updated: now,
        })
        .await?;

    info!(restaurant_id = %restaurant.id, "Restaurant created");
    Ok(restaurant)
}

/// Replace the caller's restaurant details, and its image when one is given.
///
/// # Errors
///
/// Returns `NotFound` if the caller owns no restaurant, or an upload or
/// database error.
#[instrument(skip(restaurants, images, details, image), fields(new_image = image.is_some()))]
pub async fn update_my_restaurant(
    restaurants: &dyn RestaurantRepository,
    images: &dyn ImageUploader,
    owner: UserId,
    details: RestaurantDetails,
    image: Option<ImageFile>,
    now: DateTime<Utc>,
) -> Result<Restaurant> {
    let mut restaurant = get_my_restaurant(restaurants, owner).await?;

    restaurant.apply_details(details, now);
    if let Some(image) = image {
        restaurant.image_url = images.upload(image).await?;
    }

    Ok(restaurants.save(&restaurant).await?)
}
