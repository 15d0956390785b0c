//! User profile operations.

use tracing::{info, instrument};

use dinehub_core::UserId;

use crate::db::{RepositoryError, UserRepository};
use crate::error::{AppError, Result};
use crate::models::{NewUser, User, UserProfile};

/// Result of [`create_user`].
#[derive(Debug)]
pub enum CreateUser {
    /// A new user was stored.
    Created(User),
    /// A user with this `auth0_id` already existed; nothing was written.
    AlreadyExists,
}

/// Create a user on first login.
///
/// Idempotent on `auth0_id`: an existing user, including one inserted by a
/// concurrent request, is reported as [`CreateUser::AlreadyExists`].
///
/// # Errors
///
/// Returns an error if the database is unavailable.
#[instrument(skip(users, new_user), fields(auth0_id = %new_user.auth0_id))]
pub async fn create_user(users: &dyn UserRepository, new_user: NewUser) -> Result<CreateUser> {
    if users.find_by_auth0_id(&new_user.auth0_id).await?.is_some() {
        return Ok(CreateUser::AlreadyExists);
    }

    match users.create(new_user).await {
        Ok(user) => {
            info!(user_id = %user.id, "User created");
            Ok(CreateUser::Created(user))
        }
        Err(RepositoryError::Conflict(_)) => Ok(CreateUser::AlreadyExists),
        Err(e) => Err(e.into()),
    }
}

/// Load the caller's user record.
///
/// # Errors
///
/// Returns `NotFound` if the user no longer exists.
pub async fn get_user(users: &dyn UserRepository, id: UserId) -> Result<User> {
    users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Replace the caller's profile fields.
///
/// All four fields are overwritten; absent fields are cleared.
///
/// # Errors
///
/// Returns `NotFound` if the user no longer exists.
#[instrument(skip(users, profile))]
pub async fn update_user(
    users: &dyn UserRepository,
    id: UserId,
    profile: UserProfile,
) -> Result<User> {
    let mut user = get_user(users, id).await?;
    user.apply_profile(profile);
    Ok(users.save(&user).await?)
}
