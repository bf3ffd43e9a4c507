use prometheus::{
    Encoder, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub missions_created_total: IntCounter,
    pub mission_accepts_total: IntCounterVec,
    pub status_updates_total: IntCounterVec,
    pub open_missions: IntGauge,
    pub transition_latency_seconds: HistogramVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let missions_created_total =
            IntCounter::new("missions_created_total", "Total missions created")
                .expect("valid missions_created_total metric");

        let mission_accepts_total = IntCounterVec::new(
            Opts::new("mission_accepts_total", "Acceptance attempts by outcome"),
            &["outcome"],
        )
        .expect("valid mission_accepts_total metric");

        let status_updates_total = IntCounterVec::new(
            Opts::new(
                "status_updates_total",
                "Successful status updates by new status",
            ),
            &["status"],
        )
        .expect("valid status_updates_total metric");

        let open_missions = IntGauge::new("open_missions", "Missions not yet delivered or cancelled")
            .expect("valid open_missions metric");

        let transition_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "transition_latency_seconds",
                "Latency of lifecycle operations in seconds",
            ),
            &["operation", "outcome"],
        )
        .expect("valid transition_latency_seconds metric");

        registry
            .register(Box::new(missions_created_total.clone()))
            .expect("register missions_created_total");
        registry
            .register(Box::new(mission_accepts_total.clone()))
            .expect("register mission_accepts_total");
        registry
            .register(Box::new(status_updates_total.clone()))
            .expect("register status_updates_total");
        registry
            .register(Box::new(open_missions.clone()))
            .expect("register open_missions");
        registry
            .register(Box::new(transition_latency_seconds.clone()))
            .expect("register transition_latency_seconds");

        Self {
            registry,
            missions_created_total,
            mission_accepts_total,
            status_updates_total,
            open_missions,
            transition_latency_seconds,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
