//! API route handlers
//!
//! Handlers stay thin: decode the request, hop onto the blocking pool
//! for the synchronous booking services, and shape the response. All
//! permission checks happen inside the services.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use booking::{CoreResult, DeskDraft, DeskPatch};

use crate::auth::AuthActor;
use crate::{AppError, AppResult, AppState};

/// Request body for creating a reservation
#[derive(Debug, Deserialize)]
pub struct ReserveRequest {
    pub desk_id: i64,
    pub date: DateTime<Utc>,
}

/// Request body for cancelling a reservation
#[derive(Debug, Deserialize)]
pub struct UnreserveRequest {
    pub reservation_id: i64,
}

/// Run a synchronous booking call on the blocking pool.
async fn run_blocking<T, F>(task: F) -> AppResult<T>
where
    F: FnOnce() -> CoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(result) => result.map_err(AppError::from),
        Err(e) => {
            error!("Blocking task failed: {}", e);
            Err(AppError {
                status_code: StatusCode::INTERNAL_SERVER_ERROR,
                message: "Internal server error".to_string(),
            })
        }
    }
}

/// GET /api/desk - list every desk (admin)
pub async fn list_desks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthActor>,
) -> AppResult<Json<Value>> {
    debug!("Handling GET /api/desk");

    let desks = state.desks.clone();
    let actor = auth.actor.clone();
    let list = run_blocking(move || desks.list_all(&actor)).await?;

    Ok(Json(json!({ "desks": list })))
}

/// GET /api/desk/available - list desks open for booking
pub async fn list_available_desks(State(state): State<AppState>) -> AppResult<Json<Value>> {
    debug!("Handling GET /api/desk/available");

    let desks = state.desks.clone();
    let list = run_blocking(move || desks.list_available()).await?;

    Ok(Json(json!({ "desks": list })))
}

/// GET /api/desk/:desk_id - fetch one desk
pub async fn get_desk(
    State(state): State<AppState>,
    Path(desk_id): Path<i64>,
) -> AppResult<Json<Value>> {
    debug!("Handling GET /api/desk/{}", desk_id);

    let desks = state.desks.clone();
    let desk = run_blocking(move || desks.get(desk_id)).await?;

    Ok(Json(json!(desk)))
}

/// POST /api/desk/admin/create - register a new desk (admin)
pub async fn create_desk(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthActor>,
    Json(draft): Json<DeskDraft>,
) -> AppResult<Json<Value>> {
    debug!("Handling POST /api/desk/admin/create");

    let desks = state.desks.clone();
    let actor = auth.actor.clone();
    let desk = run_blocking(move || desks.create(&actor, draft)).await?;

    Ok(Json(json!(desk)))
}

/// DELETE /api/desk/admin/:desk_id - remove a desk (admin)
pub async fn remove_desk(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthActor>,
    Path(desk_id): Path<i64>,
) -> AppResult<Json<Value>> {
    debug!("Handling DELETE /api/desk/admin/{}", desk_id);

    let desks = state.desks.clone();
    let actor = auth.actor.clone();
    let desk = run_blocking(move || desks.remove(&actor, desk_id)).await?;

    Ok(Json(json!(desk)))
}

/// PUT /api/desk/admin/update/:desk_id - patch desk fields (admin)
pub async fn update_desk(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthActor>,
    Path(desk_id): Path<i64>,
    Json(patch): Json<DeskPatch>,
) -> AppResult<Json<Value>> {
    debug!("Handling PUT /api/desk/admin/update/{}", desk_id);

    let desks = state.desks.clone();
    let actor = auth.actor.clone();
    let desk = run_blocking(move || desks.update(&actor, desk_id, patch)).await?;

    Ok(Json(json!(desk)))
}

/// PUT /api/desk/admin/toggle/:desk_id - flip desk availability (admin)
pub async fn toggle_desk(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthActor>,
    Path(desk_id): Path<i64>,
) -> AppResult<Json<Value>> {
    debug!("Handling PUT /api/desk/admin/toggle/{}", desk_id);

    let desks = state.desks.clone();
    let actor = auth.actor.clone();
    let desk = run_blocking(move || desks.toggle_availability(&actor, desk_id)).await?;

    Ok(Json(json!(desk)))
}

/// GET /api/reservation/:desk_id - upcoming occupancy of one desk
pub async fn list_desk_reservations(
    State(state): State<AppState>,
    Path(desk_id): Path<i64>,
) -> AppResult<Json<Value>> {
    debug!("Handling GET /api/reservation/{}", desk_id);

    let reservations = state.reservations.clone();
    let list = run_blocking(move || reservations.list_by_desk(desk_id)).await?;

    Ok(Json(json!({ "reservations": list })))
}

/// GET /api/reservation/mine - the caller's upcoming reservations
pub async fn list_my_reservations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthActor>,
) -> AppResult<Json<Value>> {
    debug!("Handling GET /api/reservation/mine");

    let reservations = state.reservations.clone();
    let actor = auth.actor.clone();
    let list = run_blocking(move || reservations.list_by_actor(&actor)).await?;

    let entries: Vec<Value> = list
        .into_iter()
        .map(|(reservation, desk)| {
            json!({
                "reservation": reservation,
                "desk": desk,
            })
        })
        .collect();

    Ok(Json(json!({ "reservations": entries })))
}

/// POST /api/reservation/reserve - book a desk for a slot
pub async fn reserve(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthActor>,
    Json(body): Json<ReserveRequest>,
) -> AppResult<Json<Value>> {
    debug!("Handling POST /api/reservation/reserve");

    let store = state.store.clone();
    let reservations = state.reservations.clone();
    let actor = auth.actor.clone();
    let profile = auth.profile.clone();
    let reservation = run_blocking(move || {
        // Keep the stored identity row current so admin listings can
        // name the holder.
        store.upsert_actor(&profile)?;
        reservations.create(&actor, body.desk_id, body.date)
    })
    .await?;

    Ok(Json(json!(reservation)))
}

/// POST /api/reservation/unreserve - cancel a reservation
pub async fn unreserve(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthActor>,
    Json(body): Json<UnreserveRequest>,
) -> AppResult<Json<Value>> {
    debug!("Handling POST /api/reservation/unreserve");

    let reservations = state.reservations.clone();
    let actor = auth.actor.clone();
    let removed =
        run_blocking(move || reservations.remove(&actor, body.reservation_id)).await?;

    Ok(Json(json!(removed)))
}

fn admin_listing(rows: Vec<(booking::Reservation, booking::Desk, booking::ActorProfile)>) -> Value {
    let entries: Vec<Value> = rows
        .into_iter()
        .map(|(reservation, desk, holder)| {
            json!({
                "reservation": reservation,
                "desk": desk,
                "actor": holder,
            })
        })
        .collect();
    json!({ "reservations": entries })
}

/// GET /api/reservation/admin/future - all upcoming reservations (admin)
pub async fn list_future_reservations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthActor>,
) -> AppResult<Json<Value>> {
    debug!("Handling GET /api/reservation/admin/future");

    let reservations = state.reservations.clone();
    let actor = auth.actor.clone();
    let list = run_blocking(move || reservations.list_future_all(&actor)).await?;

    Ok(Json(admin_listing(list)))
}

/// GET /api/reservation/admin/past - all elapsed reservations (admin)
pub async fn list_past_reservations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthActor>,
) -> AppResult<Json<Value>> {
    debug!("Handling GET /api/reservation/admin/past");

    let reservations = state.reservations.clone();
    let actor = auth.actor.clone();
    let list = run_blocking(move || reservations.list_past_all(&actor)).await?;

    Ok(Json(admin_listing(list)))
}

/// DELETE /api/reservation/admin/older-than/:days - retention purge (admin)
pub async fn purge_reservations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthActor>,
    Path(days): Path<i64>,
) -> AppResult<Json<Value>> {
    debug!("Handling DELETE /api/reservation/admin/older-than/{}", days);

    let reservations = state.reservations.clone();
    let actor = auth.actor.clone();
    let purged = run_blocking(move || reservations.purge_older_than(&actor, days)).await?;

    Ok(Json(json!({ "purged": purged })))
}
