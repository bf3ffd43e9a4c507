use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::ident;
use crate::models::trip::Trip;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/trips", post(create_trip))
        .route("/trips/:id", get(get_trip))
}

#[derive(Deserialize)]
pub struct CreateTripRequest {
    pub gp_id: Uuid,
    pub departure_country: String,
    pub departure_city: String,
    pub arrival_country: String,
    pub arrival_city: String,
    pub departure_date: DateTime<Utc>,
    pub arrival_date: DateTime<Utc>,
    pub available_weight: f64,
    pub max_packages: u32,
}

async fn create_trip(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateTripRequest>,
) -> Result<Json<Trip>, AppError> {
    if payload.available_weight <= 0.0 {
        return Err(AppError::InvalidInput(
            "available weight must be > 0".to_string(),
        ));
    }

    if payload.max_packages == 0 {
        return Err(AppError::InvalidInput(
            "max packages must be > 0".to_string(),
        ));
    }

    let now = Utc::now();
    let trip = Trip {
        id: Uuid::new_v4(),
        trip_code: ident::generate_code("TRJ"),
        gp_id: payload.gp_id,
        departure_country: payload.departure_country,
        departure_city: payload.departure_city,
        arrival_country: payload.arrival_country,
        arrival_city: payload.arrival_city,
        departure_date: payload.departure_date,
        arrival_date: payload.arrival_date,
        available_weight: payload.available_weight,
        max_packages: payload.max_packages,
        current_packages: 0,
        created_at: now,
        updated_at: now,
    };

    state.trips.insert(trip.id, trip.clone());
    Ok(Json(trip))
}

async fn get_trip(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Trip>, AppError> {
    let trip = state
        .trips
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("trip {id} not found")))?;

    Ok(Json(trip.value().clone()))
}
