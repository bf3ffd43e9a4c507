use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::mission::Mission;
use crate::models::profile::{ExpediteurProfile, GpProfile};
use crate::models::tracking::TrackingEvent;
use crate::models::trip::Trip;
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub missions: DashMap<Uuid, Mission>,
    /// Append-only ledger, one vector per mission, oldest first.
    pub tracking: DashMap<Uuid, Vec<TrackingEvent>>,
    pub trips: DashMap<Uuid, Trip>,
    pub expediteurs: DashMap<Uuid, ExpediteurProfile>,
    pub gps: DashMap<Uuid, GpProfile>,
    /// Constraint layer for generated identifiers: a claim that fails here
    /// surfaces as a conflict instead of a silent overwrite.
    pub tracking_numbers: DashMap<String, Uuid>,
    pub mission_codes: DashMap<String, Uuid>,
    pub tracking_events_tx: broadcast::Sender<TrackingEvent>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(event_buffer_size: usize) -> Self {
        let (tracking_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        Self {
            missions: DashMap::new(),
            tracking: DashMap::new(),
            trips: DashMap::new(),
            expediteurs: DashMap::new(),
            gps: DashMap::new(),
            tracking_numbers: DashMap::new(),
            mission_codes: DashMap::new(),
            tracking_events_tx,
            metrics: Metrics::new(),
        }
    }
}
