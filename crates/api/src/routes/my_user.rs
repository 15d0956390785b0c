//! `/api/my/user` handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use dinehub_core::Email;

use super::json_body;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::{NewUser, User, UserProfile};
use crate::services::users::{self, CreateUser};
use crate::state::AppState;

/// Body of `POST /api/my/user`, sent by the frontend after login.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateUserRequest {
    pub auth0_id: String,
    pub email: Email,
    pub name: Option<String>,
    pub address_line1: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl CreateUserRequest {
    fn into_new_user(self) -> Result<NewUser> {
        let auth0_id = self.auth0_id.trim().to_string();
        if auth0_id.is_empty() {
            return Err(AppError::BadRequest("auth0Id is required".to_string()));
        }
        Ok(NewUser {
            auth0_id,
            email: self.email,
            profile: UserProfile {
                name: self.name,
                address_line1: self.address_line1,
                city: self.city,
                country: self.country,
            },
        })
    }
}

/// Create the user on first login.
///
/// Responds 201 with the user when created, or 200 with an empty body when a
/// user with this `auth0Id` already exists.
pub async fn create_user(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Response> {
    let new_user = json_body(payload)?.into_new_user()?;

    match users::create_user(state.users(), new_user).await? {
        CreateUser::Created(user) => Ok((StatusCode::CREATED, Json(user)).into_response()),
        CreateUser::AlreadyExists => Ok(StatusCode::OK.into_response()),
    }
}

/// Return the caller's user record.
pub async fn get_current_user(
    State(state): State<AppState>,
    RequireUser(caller): RequireUser,
) -> Result<Json<User>> {
    let user = users::get_user(state.users(), caller.id).await?;
    Ok(Json(user))
}

/// Replace the caller's profile fields.
pub async fn update_user(
    State(state): State<AppState>,
    RequireUser(caller): RequireUser,
    payload: std::result::Result<Json<UserProfile>, JsonRejection>,
) -> Result<Json<User>> {
    let profile = json_body(payload)?;
    let user = users::update_user(state.users(), caller.id, profile).await?;
    Ok(Json(user))
}
