use std::time::Instant;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::engine::transitions;
use crate::error::AppError;
use crate::ident;
use crate::models::mission::{Mission, MissionStatus};
use crate::models::profile::{ExpediteurProfile, GpProfile};
use crate::models::tracking::TrackingEvent;
use crate::state::AppState;

/// Package, route and commercial descriptor supplied at creation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMission {
    pub departure_country: String,
    pub departure_city: String,
    pub pickup_address: String,
    pub arrival_country: String,
    pub arrival_city: String,
    pub delivery_address: String,
    pub package_weight: f64,
    pub package_length: Option<f64>,
    pub package_width: Option<f64>,
    pub package_height: Option<f64>,
    pub package_description: Option<String>,
    pub package_value: Option<f64>,
    #[serde(default)]
    pub package_photos: Vec<String>,
    pub desired_departure_date: DateTime<Utc>,
    pub desired_arrival_date: Option<DateTime<Utc>>,
    pub offered_price: f64,
    #[serde(default)]
    pub is_price_negotiable: bool,
    pub is_insured: Option<bool>,
}

/// Fields an expediteur may still edit while the mission is pending.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MissionChanges {
    pub departure_country: Option<String>,
    pub departure_city: Option<String>,
    pub pickup_address: Option<String>,
    pub arrival_country: Option<String>,
    pub arrival_city: Option<String>,
    pub delivery_address: Option<String>,
    pub package_weight: Option<f64>,
    pub package_length: Option<f64>,
    pub package_width: Option<f64>,
    pub package_height: Option<f64>,
    pub package_description: Option<String>,
    pub package_value: Option<f64>,
    pub package_photos: Option<Vec<String>>,
    pub desired_departure_date: Option<DateTime<Utc>>,
    pub desired_arrival_date: Option<DateTime<Utc>>,
    pub offered_price: Option<f64>,
    pub final_price: Option<f64>,
    pub is_price_negotiable: Option<bool>,
    pub is_insured: Option<bool>,
}

/// Public tracking lookup result: the mission plus its full history.
#[derive(Debug, Clone, Serialize)]
pub struct TrackedMission {
    pub mission: Mission,
    pub tracking: Vec<TrackingEvent>,
}

pub fn create_mission(
    state: &AppState,
    data: NewMission,
    expediteur_id: Uuid,
) -> Result<Mission, AppError> {
    let started = Instant::now();
    let result = insert_mission(state, data, expediteur_id);
    observe_latency(state, "create", started, result.is_ok());

    if let Ok(mission) = &result {
        state.metrics.missions_created_total.inc();
        state.metrics.open_missions.inc();
        info!(
            mission_code = %mission.mission_code,
            expediteur_id = %expediteur_id,
            "mission created"
        );
    }

    result
}

fn insert_mission(
    state: &AppState,
    data: NewMission,
    expediteur_id: Uuid,
) -> Result<Mission, AppError> {
    if data.departure_city.trim().is_empty() || data.arrival_city.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "departure and arrival cities are required".to_string(),
        ));
    }

    if data.package_weight <= 0.0 {
        return Err(AppError::InvalidInput(
            "package weight must be > 0".to_string(),
        ));
    }

    let id = Uuid::new_v4();
    let mission_code = ident::generate_code("MIS");
    let tracking_number = ident::generate_tracking_number();

    // Claim both identifiers before the row exists; a duplicate from the
    // generator surfaces here as a conflict.
    claim(&state.mission_codes, &mission_code, id)?;
    if let Err(err) = claim(&state.tracking_numbers, &tracking_number, id) {
        state.mission_codes.remove(&mission_code);
        return Err(err);
    }

    let is_insured = data.is_insured.unwrap_or(true);
    let insurance_cost = match data.package_value {
        Some(value) if is_insured => ident::insurance_fee(value),
        _ => 0.0,
    };

    let now = Utc::now();
    let mission = Mission {
        id,
        mission_code,
        tracking_number,
        expediteur_id,
        gp_id: None,
        trip_id: None,
        departure_country: data.departure_country,
        departure_city: data.departure_city,
        pickup_address: data.pickup_address,
        arrival_country: data.arrival_country,
        arrival_city: data.arrival_city,
        delivery_address: data.delivery_address,
        package_weight: data.package_weight,
        package_length: data.package_length,
        package_width: data.package_width,
        package_height: data.package_height,
        package_description: data.package_description,
        package_value: data.package_value,
        package_photos: data.package_photos,
        desired_departure_date: data.desired_departure_date,
        desired_arrival_date: data.desired_arrival_date,
        actual_pickup_date: None,
        actual_delivery_date: None,
        offered_price: data.offered_price,
        final_price: None,
        is_price_negotiable: data.is_price_negotiable,
        is_insured,
        insurance_cost,
        status: MissionStatus::Pending,
        qr_code_url: None,
        qr_code_data: None,
        created_at: now,
        updated_at: now,
        completed_at: None,
    };

    state.missions.insert(id, mission.clone());

    let mut profile = state
        .expediteurs
        .entry(expediteur_id)
        .or_insert_with(|| ExpediteurProfile::new(expediteur_id));
    profile.total_shipments += 1;
    profile.updated_at = now;

    Ok(mission)
}

pub fn accept_mission(
    state: &AppState,
    mission_id: Uuid,
    gp_id: Uuid,
    trip_id: Option<Uuid>,
) -> Result<Mission, AppError> {
    let started = Instant::now();
    let result = do_accept(state, mission_id, gp_id, trip_id);
    observe_latency(state, "accept", started, result.is_ok());

    let outcome = match &result {
        Ok(_) => "success",
        Err(AppError::Conflict(_)) => "conflict",
        Err(AppError::NotFound(_)) => "not_found",
        Err(_) => "error",
    };
    state
        .metrics
        .mission_accepts_total
        .with_label_values(&[outcome])
        .inc();

    if result.is_ok() {
        info!(mission_id = %mission_id, gp_id = %gp_id, "mission accepted");
    }

    result
}

fn do_accept(
    state: &AppState,
    mission_id: Uuid,
    gp_id: Uuid,
    trip_id: Option<Uuid>,
) -> Result<Mission, AppError> {
    // The entry guard makes the status check and the write indivisible:
    // concurrent accepts on the same mission serialize here, and every
    // caller after the first observes a non-pending status.
    let mut mission = state
        .missions
        .get_mut(&mission_id)
        .ok_or_else(|| AppError::NotFound(format!("mission {mission_id} not found")))?;

    if mission.status != MissionStatus::Pending {
        return Err(AppError::Conflict(
            "mission is no longer available".to_string(),
        ));
    }

    let now = Utc::now();
    mission.status = MissionStatus::Accepted;
    mission.gp_id = Some(gp_id);
    mission.trip_id = trip_id;
    mission.updated_at = now;

    if let Some(trip_id) = trip_id {
        // A missing trip is the matching collaborator's concern; the counter
        // update is then a no-op, never a double increment.
        if let Some(mut trip) = state.trips.get_mut(&trip_id) {
            trip.current_packages += 1;
            trip.updated_at = now;
        }
    }

    append_event(state, &mission, Some(gp_id));

    Ok(mission.clone())
}

pub fn update_status(
    state: &AppState,
    mission_id: Uuid,
    new_status: MissionStatus,
    actor_id: Uuid,
) -> Result<Mission, AppError> {
    let started = Instant::now();
    let result = do_update_status(state, mission_id, new_status, actor_id);
    observe_latency(state, "update_status", started, result.is_ok());

    if result.is_ok() {
        state
            .metrics
            .status_updates_total
            .with_label_values(&[new_status.as_str()])
            .inc();
        if new_status.is_terminal() {
            state.metrics.open_missions.dec();
        }
        info!(mission_id = %mission_id, status = %new_status, "mission status updated");
    }

    result
}

fn do_update_status(
    state: &AppState,
    mission_id: Uuid,
    new_status: MissionStatus,
    actor_id: Uuid,
) -> Result<Mission, AppError> {
    if !transitions::is_update_target(new_status) {
        return Err(AppError::InvalidInput(format!(
            "{new_status} is not a valid status update target"
        )));
    }

    let mut mission = state
        .missions
        .get_mut(&mission_id)
        .ok_or_else(|| AppError::NotFound(format!("mission {mission_id} not found")))?;

    if !transitions::is_legal(mission.status, new_status) {
        return Err(AppError::Conflict(format!(
            "cannot move mission from {} to {}",
            mission.status, new_status
        )));
    }

    let now = Utc::now();
    mission.status = new_status;
    mission.updated_at = now;

    match new_status {
        MissionStatus::PickedUp => {
            if mission.actual_pickup_date.is_none() {
                mission.actual_pickup_date = Some(now);
            }
        }
        MissionStatus::Delivered => {
            mission.completed_at = Some(now);
            mission.actual_delivery_date = Some(now);

            if let Some(gp_id) = mission.gp_id {
                let mut profile = state
                    .gps
                    .entry(gp_id)
                    .or_insert_with(|| GpProfile::new(gp_id));
                profile.total_missions_completed += 1;
                profile.updated_at = now;
            }
        }
        _ => {}
    }

    append_event(state, &mission, Some(actor_id));

    Ok(mission.clone())
}

/// Detail update, only valid while the mission is still pending.
pub fn update_details(
    state: &AppState,
    mission_id: Uuid,
    changes: MissionChanges,
) -> Result<Mission, AppError> {
    if matches!(changes.departure_city.as_deref(), Some(city) if city.trim().is_empty())
        || matches!(changes.arrival_city.as_deref(), Some(city) if city.trim().is_empty())
    {
        return Err(AppError::InvalidInput(
            "departure and arrival cities cannot be blank".to_string(),
        ));
    }

    if matches!(changes.package_weight, Some(weight) if weight <= 0.0) {
        return Err(AppError::InvalidInput(
            "package weight must be > 0".to_string(),
        ));
    }

    let mut mission = state
        .missions
        .get_mut(&mission_id)
        .ok_or_else(|| AppError::NotFound(format!("mission {mission_id} not found")))?;

    if mission.status != MissionStatus::Pending {
        return Err(AppError::Conflict(
            "mission details can only change while pending".to_string(),
        ));
    }

    let mut changed = false;

    changed |= apply(&mut mission.departure_country, changes.departure_country);
    changed |= apply(&mut mission.departure_city, changes.departure_city);
    changed |= apply(&mut mission.pickup_address, changes.pickup_address);
    changed |= apply(&mut mission.arrival_country, changes.arrival_country);
    changed |= apply(&mut mission.arrival_city, changes.arrival_city);
    changed |= apply(&mut mission.delivery_address, changes.delivery_address);
    changed |= apply(&mut mission.package_weight, changes.package_weight);
    changed |= apply_opt(&mut mission.package_length, changes.package_length);
    changed |= apply_opt(&mut mission.package_width, changes.package_width);
    changed |= apply_opt(&mut mission.package_height, changes.package_height);
    changed |= apply_opt(
        &mut mission.package_description,
        changes.package_description,
    );
    changed |= apply_opt(&mut mission.package_value, changes.package_value);
    changed |= apply(&mut mission.package_photos, changes.package_photos);
    changed |= apply(
        &mut mission.desired_departure_date,
        changes.desired_departure_date,
    );
    changed |= apply_opt(
        &mut mission.desired_arrival_date,
        changes.desired_arrival_date,
    );
    changed |= apply(&mut mission.offered_price, changes.offered_price);
    changed |= apply_opt(&mut mission.final_price, changes.final_price);
    changed |= apply(
        &mut mission.is_price_negotiable,
        changes.is_price_negotiable,
    );
    changed |= apply(&mut mission.is_insured, changes.is_insured);

    if !changed {
        return Err(AppError::InvalidInput("no fields to update".to_string()));
    }

    mission.insurance_cost = match mission.package_value {
        Some(value) if mission.is_insured => ident::insurance_fee(value),
        _ => 0.0,
    };
    mission.updated_at = Utc::now();

    info!(mission_id = %mission_id, "mission details updated");

    Ok(mission.clone())
}

pub fn generate_qr_code(state: &AppState, mission_id: Uuid) -> Result<Mission, AppError> {
    let mut mission = state
        .missions
        .get_mut(&mission_id)
        .ok_or_else(|| AppError::NotFound(format!("mission {mission_id} not found")))?;

    // Idempotent: regeneration overwrites whatever was there.
    let payload = serde_json::json!({
        "mission_code": mission.mission_code,
        "tracking_number": mission.tracking_number,
        "id": mission.id,
    });

    mission.qr_code_data = Some(payload.to_string());
    mission.qr_code_url = Some(format!("/missions/{}/qr.png", mission.id));
    mission.updated_at = Utc::now();

    info!(mission_id = %mission_id, "qr code generated");

    Ok(mission.clone())
}

/// Full ledger for a mission, newest first. Missions that never changed
/// status have an empty history; that is not an error.
pub fn tracking_history(state: &AppState, mission_id: Uuid) -> Vec<TrackingEvent> {
    let mut events = state
        .tracking
        .get(&mission_id)
        .map(|entry| entry.value().clone())
        .unwrap_or_default();

    events.reverse();
    events
}

/// Public lookup by tracking number, no authentication at this layer.
pub fn track_by_number(state: &AppState, tracking_number: &str) -> Result<TrackedMission, AppError> {
    let mission_id = state
        .tracking_numbers
        .get(tracking_number)
        .map(|entry| *entry.value())
        .ok_or_else(|| AppError::NotFound("tracking number not found".to_string()))?;

    let mission = state
        .missions
        .get(&mission_id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound("tracking number not found".to_string()))?;

    let tracking = tracking_history(state, mission_id);

    Ok(TrackedMission { mission, tracking })
}

fn append_event(state: &AppState, mission: &Mission, actor: Option<Uuid>) {
    let event = TrackingEvent {
        id: Uuid::new_v4(),
        mission_id: mission.id,
        status: mission.status,
        description: format!("status changed to {}", mission.status),
        created_by: actor,
        created_at: Utc::now(),
    };

    state
        .tracking
        .entry(mission.id)
        .or_default()
        .push(event.clone());
    let _ = state.tracking_events_tx.send(event);
}

fn claim(index: &DashMap<String, Uuid>, key: &str, id: Uuid) -> Result<(), AppError> {
    match index.entry(key.to_string()) {
        Entry::Occupied(_) => Err(AppError::Conflict(format!(
            "identifier {key} already in use"
        ))),
        Entry::Vacant(slot) => {
            slot.insert(id);
            Ok(())
        }
    }
}

fn apply<T>(field: &mut T, value: Option<T>) -> bool {
    match value {
        Some(value) => {
            *field = value;
            true
        }
        None => false,
    }
}

fn apply_opt<T>(field: &mut Option<T>, value: Option<T>) -> bool {
    match value {
        Some(value) => {
            *field = Some(value);
            true
        }
        None => false,
    }
}

fn observe_latency(state: &AppState, operation: &str, started: Instant, ok: bool) {
    let outcome = if ok { "success" } else { "error" };
    state
        .metrics
        .transition_latency_seconds
        .with_label_values(&[operation, outcome])
        .observe(started.elapsed().as_secs_f64());
}
