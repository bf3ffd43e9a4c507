use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::lifecycle::{self, MissionChanges, NewMission, TrackedMission};
use crate::engine::query::{self, MissionFilter, Paginated};
use crate::error::AppError;
use crate::models::mission::{Mission, MissionStatus};
use crate::models::tracking::TrackingEvent;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/missions", post(create_mission).get(list_missions))
        .route("/missions/:id", get(get_mission).put(update_mission))
        .route("/missions/:id/accept", post(accept_mission))
        .route("/missions/:id/status", post(update_status))
        .route("/missions/:id/qr-code", post(generate_qr_code))
        .route("/missions/:id/tracking", get(get_tracking))
        .route("/tracking/:tracking_number", get(track_by_number))
}

#[derive(Deserialize)]
pub struct CreateMissionRequest {
    pub expediteur_id: Uuid,
    #[serde(flatten)]
    pub mission: NewMission,
}

#[derive(Deserialize)]
pub struct AcceptMissionRequest {
    pub gp_id: Uuid,
    pub trip_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: MissionStatus,
    pub actor_id: Uuid,
}

#[derive(Deserialize)]
pub struct ListMissionsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<MissionStatus>,
    pub expediteur_id: Option<Uuid>,
    pub gp_id: Option<Uuid>,
    pub departure_city: Option<String>,
    pub arrival_city: Option<String>,
}

async fn create_mission(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateMissionRequest>,
) -> Result<Json<Mission>, AppError> {
    let mission = lifecycle::create_mission(&state, payload.mission, payload.expediteur_id)?;
    Ok(Json(mission))
}

async fn list_missions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListMissionsQuery>,
) -> Json<Paginated<Mission>> {
    let filter = MissionFilter {
        status: params.status,
        expediteur_id: params.expediteur_id,
        gp_id: params.gp_id,
        departure_city: params.departure_city,
        arrival_city: params.arrival_city,
    };

    Json(query::list_missions(
        &state,
        &filter,
        params.page.unwrap_or(1),
        params.limit.unwrap_or(query::DEFAULT_PAGE_SIZE),
    ))
}

async fn get_mission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Mission>, AppError> {
    let mission = state
        .missions
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("mission {id} not found")))?;

    Ok(Json(mission.value().clone()))
}

async fn update_mission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(changes): Json<MissionChanges>,
) -> Result<Json<Mission>, AppError> {
    let mission = lifecycle::update_details(&state, id, changes)?;
    Ok(Json(mission))
}

async fn accept_mission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AcceptMissionRequest>,
) -> Result<Json<Mission>, AppError> {
    let mission = lifecycle::accept_mission(&state, id, payload.gp_id, payload.trip_id)?;
    Ok(Json(mission))
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Mission>, AppError> {
    let mission = lifecycle::update_status(&state, id, payload.status, payload.actor_id)?;
    Ok(Json(mission))
}

async fn generate_qr_code(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Mission>, AppError> {
    let mission = lifecycle::generate_qr_code(&state, id)?;
    Ok(Json(mission))
}

async fn get_tracking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Json<Vec<TrackingEvent>> {
    Json(lifecycle::tracking_history(&state, id))
}

async fn track_by_number(
    State(state): State<Arc<AppState>>,
    Path(tracking_number): Path<String>,
) -> Result<Json<TrackedMission>, AppError> {
    let tracked = lifecycle::track_by_number(&state, &tracking_number)?;
    Ok(Json(tracked))
}
