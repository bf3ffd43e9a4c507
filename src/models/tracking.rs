use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::mission::MissionStatus;

/// One immutable ledger entry recording a status change.
///
/// Events are only ever appended by the lifecycle engine; `created_by` is
/// `None` for system-generated transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub id: Uuid,
    pub mission_id: Uuid,
    pub status: MissionStatus,
    pub description: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
