//! Roost API service library
//!
//! Exposes the desk and reservation services over HTTP with JWT
//! authentication. Admin-only operations are still enforced by the
//! grants evaluator inside the booking services; the HTTP layer only
//! establishes who the caller is.

pub mod auth;
pub mod routes;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::info;

use booking::{
    clock::{Clock, SystemClock},
    error::{CoreError, ErrorKind},
    DeskService, ReservationService, Store,
};
use grants::Evaluator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub desks: DeskService,
    pub reservations: ReservationService,
    pub store: Store,
    pub jwt: auth::JwtConfig,
}

impl AppState {
    /// Build state from process environment.
    ///
    /// Reads `ROOST_DB_PATH` (default `roost.db`), `ROOST_ROLE_GRANTS`
    /// and the JWT settings. Panics via [`auth::JwtConfig::from_env`]
    /// when `ROOST_JWT_SECRET` is unset, matching service startup
    /// expectations.
    pub fn from_env() -> Result<Self> {
        let db_path =
            std::env::var("ROOST_DB_PATH").unwrap_or_else(|_| "roost.db".to_string());
        let store = Store::open(&db_path)
            .with_context(|| format!("failed to open reservation store at {db_path}"))?;
        let jwt = auth::JwtConfig::from_env();
        info!(db = %db_path, "Initialized roost-api state");
        Ok(Self::with_parts(
            store,
            Arc::new(Evaluator::new(grants::load_from_env())),
            Arc::new(SystemClock),
            jwt,
        ))
    }

    /// Build state from explicit parts. Used by tests to avoid
    /// touching process environment.
    pub fn with_parts(
        store: Store,
        evaluator: Arc<Evaluator>,
        clock: Arc<dyn Clock>,
        jwt: auth::JwtConfig,
    ) -> Self {
        let desks = DeskService::new(store.clone(), Arc::clone(&evaluator), Arc::clone(&clock));
        let reservations = ReservationService::new(store.clone(), evaluator, clock);
        Self {
            desks,
            reservations,
            store,
            jwt,
        }
    }
}

/// Application error type
#[derive(Debug)]
pub struct AppError {
    pub status_code: StatusCode,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message
        }));
        (self.status_code, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let status_code = match err.kind() {
            ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status_code,
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self {
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("Internal server error: {}", err),
        }
    }
}

/// Result type for handlers
pub type AppResult<T> = Result<T, AppError>;

/// Health check endpoint
async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "roost-api"
        })),
    )
}

/// Create the application router with all routes
pub fn create_app(state: AppState) -> Router {
    // Browsing desks and per-desk occupancy needs no identity. Every
    // route that acts on behalf of a caller sits behind the JWT layer.
    let public = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/desk/available", get(routes::list_available_desks))
        .route("/api/desk/:desk_id", get(routes::get_desk))
        .route(
            "/api/reservation/:desk_id",
            get(routes::list_desk_reservations),
        );

    let authed = Router::new()
        .route("/api/desk", get(routes::list_desks))
        .route("/api/desk/admin/create", post(routes::create_desk))
        .route("/api/desk/admin/:desk_id", delete(routes::remove_desk))
        .route("/api/desk/admin/update/:desk_id", put(routes::update_desk))
        .route("/api/desk/admin/toggle/:desk_id", put(routes::toggle_desk))
        .route("/api/reservation/mine", get(routes::list_my_reservations))
        .route("/api/reservation/reserve", post(routes::reserve))
        .route("/api/reservation/unreserve", post(routes::unreserve))
        .route(
            "/api/reservation/admin/future",
            get(routes::list_future_reservations),
        )
        .route(
            "/api/reservation/admin/past",
            get(routes::list_past_reservations),
        )
        .route(
            "/api/reservation/admin/older-than/:days",
            delete(routes::purge_reservations),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::jwt_middleware,
        ));

    // Avoid logging request headers so Authorization tokens never
    // reach the logs.
    public
        .merge(authed)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
