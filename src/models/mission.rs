use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    Pending,
    Matched,
    Accepted,
    PickedUp,
    InTransit,
    InCustoms,
    OutForDelivery,
    Delivered,
    Cancelled,
    Disputed,
}

impl MissionStatus {
    /// Wire name, also used for ledger descriptions and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            MissionStatus::Pending => "pending",
            MissionStatus::Matched => "matched",
            MissionStatus::Accepted => "accepted",
            MissionStatus::PickedUp => "picked_up",
            MissionStatus::InTransit => "in_transit",
            MissionStatus::InCustoms => "in_customs",
            MissionStatus::OutForDelivery => "out_for_delivery",
            MissionStatus::Delivered => "delivered",
            MissionStatus::Cancelled => "cancelled",
            MissionStatus::Disputed => "disputed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, MissionStatus::Delivered | MissionStatus::Cancelled)
    }
}

impl std::fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One shipment request, from posting through delivery or cancellation.
///
/// `mission_code` and `tracking_number` are assigned at creation and never
/// change. `gp_id`/`trip_id` are set exactly once, by acceptance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    pub id: Uuid,
    pub mission_code: String,
    pub tracking_number: String,
    pub expediteur_id: Uuid,
    pub gp_id: Option<Uuid>,
    pub trip_id: Option<Uuid>,
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
    pub package_photos: Vec<String>,
    pub desired_departure_date: DateTime<Utc>,
    pub desired_arrival_date: Option<DateTime<Utc>>,
    pub actual_pickup_date: Option<DateTime<Utc>>,
    pub actual_delivery_date: Option<DateTime<Utc>>,
    pub offered_price: f64,
    pub final_price: Option<f64>,
    pub is_price_negotiable: bool,
    pub is_insured: bool,
    pub insurance_cost: f64,
    pub status: MissionStatus,
    pub qr_code_url: Option<String>,
    pub qr_code_data: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}
