//! `/api/my/restaurant` handlers.

use axum::{
    Json,
    extract::{
        Multipart, Path, State,
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;

use dinehub_core::{OrderId, OrderStatus};

use super::json_body;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::{FormError, Order, OrderDetails, Restaurant, RestaurantDetails};
use crate::services::media::ImageFile;
use crate::services::{orders, restaurants};
use crate::state::AppState;

/// Name of the file part in restaurant forms.
const IMAGE_FIELD: &str = "imageFile";

/// Body of `PATCH /api/my/restaurant/order/{orderId}/status`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

/// Return the caller's restaurant.
pub async fn get_my_restaurant(
    State(state): State<AppState>,
    RequireUser(caller): RequireUser,
) -> Result<Json<Restaurant>> {
    let restaurant = restaurants::get_my_restaurant(state.restaurants(), caller.id).await?;
    Ok(Json(restaurant))
}

/// Create the caller's restaurant from a multipart form.
pub async fn create_my_restaurant(
    State(state): State<AppState>,
    RequireUser(caller): RequireUser,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Restaurant>)> {
    let (details, image) = read_restaurant_form(multipart).await?;
    let image = image.ok_or(FormError::MissingImage)?;

    let restaurant = restaurants::create_my_restaurant(
        state.restaurants(),
        state.images(),
        caller.id,
        details,
        image,
        Utc::now(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(restaurant)))
}

/// Replace the caller's restaurant from a multipart form.
pub async fn update_my_restaurant(
    State(state): State<AppState>,
    RequireUser(caller): RequireUser,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<Restaurant>> {
    let (details, image) = read_restaurant_form(multipart).await?;

    let restaurant = restaurants::update_my_restaurant(
        state.restaurants(),
        state.images(),
        caller.id,
        details,
        image,
        Utc::now(),
    )
    .await?;

    Ok(Json(restaurant))
}

/// List orders placed with the caller's restaurant, newest first.
pub async fn list_my_restaurant_orders(
    State(state): State<AppState>,
    RequireUser(caller): RequireUser,
) -> Result<Json<Vec<OrderDetails>>> {
    let orders =
        orders::list_my_restaurant_orders(state.restaurants(), state.orders(), caller.id).await?;
    Ok(Json(orders))
}

/// Change the status of an order placed with the caller's restaurant.
pub async fn update_order_status(
    State(state): State<AppState>,
    RequireUser(caller): RequireUser,
    Path(order_id): Path<String>,
    payload: std::result::Result<Json<UpdateOrderStatusRequest>, JsonRejection>,
) -> Result<Json<Order>> {
    let status = json_body(payload)?
        .status
        .parse::<OrderStatus>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    // IDs that cannot be parsed cannot exist either.
    let order_id: OrderId = order_id
        .parse()
        .map_err(|_| AppError::NotFound("order not found".to_string()))?;

    let order = orders::update_order_status(
        state.restaurants(),
        state.orders(),
        caller.id,
        order_id,
        status,
    )
    .await?;

    Ok(Json(order))
}

/// Read a restaurant form into validated details and the optional image.
///
/// An `imageFile` part with no content counts as absent, which is what
/// browsers send when no file was chosen.
async fn read_restaurant_form(
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(RestaurantDetails, Option<ImageFile>)> {
    let mut multipart = multipart.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let mut fields = Vec::new();
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_owned) else {
            return Err(AppError::BadRequest("form field without a name".to_string()));
        };

        if name == IMAGE_FIELD {
            let content_type = field.content_type().unwrap_or_default().to_owned();
            let bytes = field.bytes().await.map_err(multipart_error)?;
            if bytes.is_empty() {
                continue;
            }
            if image.is_some() {
                return Err(AppError::BadRequest("only one imageFile is allowed".to_string()));
            }
            if !content_type.starts_with("image/") {
                return Err(FormError::NotAnImage(content_type).into());
            }
            image = Some(ImageFile {
                content_type,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            fields.push((name, value));
        }
    }

    let details = RestaurantDetails::from_fields(fields)?;
    Ok((details, image))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}
