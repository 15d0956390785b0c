//! Caller identification.
//!
//! Access tokens are verified by the auth gateway in front of this service,
//! which forwards the verified subject in a header (see
//! [`AuthConfig`](crate::config::AuthConfig)). This module maps that subject
//! to a local user.

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::Span;

use crate::error::{AppError, set_sentry_user};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Extractor that requires an identified caller with a local user record.
///
/// Rejects with 401 when the subject header is missing or empty, or when no
/// user has been created for that subject yet.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireUser(user): RequireUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.auth0_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireUser(pub CurrentUser);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(Self(user.clone()));
        }

        let subject = parts
            .headers
            .get(&state.auth().subject_header)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|subject| !subject.is_empty())
            .ok_or_else(|| AppError::Unauthorized("missing caller identity".to_string()))?;

        let user = state
            .users()
            .find_by_auth0_id(subject)
            .await?
            .ok_or_else(|| AppError::Unauthorized("unknown user".to_string()))?;

        let current = CurrentUser::from(&user);
        Span::current().record("user_id", current.id.as_i32());
        set_sentry_user(&current.id, &current.auth0_id);
        parts.extensions.insert(current.clone());

        Ok(Self(current))
    }
}
