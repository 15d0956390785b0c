//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET   /health                                  - Liveness
//! GET   /health/ready                            - Readiness (database ping)
//!
//! # User profile
//! POST  /api/my/user                             - Create user on first login (idempotent)
//! GET   /api/my/user                             - Current user (auth)
//! PUT   /api/my/user                             - Replace profile fields (auth)
//!
//! # Restaurant profile (auth)
//! GET   /api/my/restaurant                       - Caller's restaurant
//! POST  /api/my/restaurant                       - Create (multipart, image required)
//! PUT   /api/my/restaurant                       - Replace (multipart, image optional)
//!
//! # Orders (auth)
//! GET   /api/my/restaurant/order                 - Orders for the caller's restaurant
//! PATCH /api/my/restaurant/order/{orderId}/status - Change order status
//! ```

pub mod health;
pub mod my_restaurant;
pub mod my_user;

use std::time::Duration;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, rejection::JsonRejection},
    http::{HeaderValue, Request, Response},
    middleware,
    routing::{get, patch},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::{Span, warn};

use crate::config::{ApiConfig, DEFAULT_MAX_UPLOAD_BYTES};
use crate::error::AppError;
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// HTTP-level settings for [`app`].
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Maximum accepted request body size in bytes.
    pub max_upload_bytes: usize,
    /// Origin allowed by CORS; `None` allows any origin.
    pub allowed_origin: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_origin: None,
        }
    }
}

impl From<&ApiConfig> for HttpSettings {
    fn from(config: &ApiConfig) -> Self {
        Self {
            max_upload_bytes: config.max_upload_bytes,
            allowed_origin: config.frontend_origin(),
        }
    }
}

/// The `/api/my` routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/user",
            get(my_user::get_current_user)
                .post(my_user::create_user)
                .put(my_user::update_user),
        )
        .route(
            "/restaurant",
            get(my_restaurant::get_my_restaurant)
                .post(my_restaurant::create_my_restaurant)
                .put(my_restaurant::update_my_restaurant),
        )
        .route(
            "/restaurant/order",
            get(my_restaurant::list_my_restaurant_orders),
        )
        .route(
            "/restaurant/order/{order_id}/status",
            patch(my_restaurant::update_order_status),
        )
}

/// Build the full application router.
///
/// Sentry layers are added by the binary, outside this router.
pub fn app(state: AppState, settings: &HttpSettings) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/my", routes())
        .layer(DefaultBodyLimit::max(settings.max_upload_bytes))
        .layer(cors_layer(settings.allowed_origin.as_deref()))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .with_state(state)
}

/// Permissive when no origin is configured. An origin that is not a valid
/// header value allows no cross-origin requests at all.
fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    let Some(origin) = origin else {
        return layer.allow_origin(Any);
    };
    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(value),
        Err(e) => {
            warn!(origin, error = %e, "Invalid CORS origin, cross-origin requests disabled");
            layer
        }
    }
}

/// Unwrap a JSON body, turning extractor rejections into `{"message"}` errors.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}
