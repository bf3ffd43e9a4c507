use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A carrier's declared journey with spare capacity.
///
/// Trips are managed elsewhere; the lifecycle engine only reads them and
/// bumps `current_packages` when an acceptance attaches a mission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub trip_code: String,
    pub gp_id: Uuid,
    pub departure_country: String,
    pub departure_city: String,
    pub arrival_country: String,
    pub arrival_city: String,
    pub departure_date: DateTime<Utc>,
    pub arrival_date: DateTime<Utc>,
    pub available_weight: f64,
    pub max_packages: u32,
    pub current_packages: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
