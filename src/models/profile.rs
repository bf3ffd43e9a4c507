use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Aggregate counters on the sender side of the marketplace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpediteurProfile {
    pub user_id: Uuid,
    pub total_shipments: u64,
    pub updated_at: DateTime<Utc>,
}

impl ExpediteurProfile {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            total_shipments: 0,
            updated_at: Utc::now(),
        }
    }
}

/// Aggregate counters on the carrier side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpProfile {
    pub user_id: Uuid,
    pub total_missions_completed: u64,
    pub updated_at: DateTime<Utc>,
}

impl GpProfile {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            total_missions_completed: 0,
            updated_at: Utc::now(),
        }
    }
}
