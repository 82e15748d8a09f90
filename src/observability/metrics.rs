use prometheus::{
    Encoder, Histogram, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub dispatches_total: IntCounterVec,
    pub dispatch_latency_seconds: HistogramVec,
    pub dispatch_radius_km: Histogram,
    pub available_riders: IntGauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let dispatches_total = IntCounterVec::new(
            Opts::new("dispatches_total", "Total dispatch requests by outcome"),
            &["outcome"],
        )
        .expect("valid dispatches_total metric");

        let dispatch_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "dispatch_latency_seconds",
                "Latency of dispatch requests in seconds",
            ),
            &["outcome"],
        )
        .expect("valid dispatch_latency_seconds metric");

        let dispatch_radius_km = Histogram::with_opts(
            prometheus::HistogramOpts::new(
                "dispatch_radius_km",
                "Search radius at which a rider was found",
            )
            .buckets(vec![1.0, 1.2, 1.4, 1.6, 1.8, 2.0]),
        )
        .expect("valid dispatch_radius_km metric");

        let available_riders = IntGauge::new("available_riders", "Riders currently available")
            .expect("valid available_riders metric");

        registry
            .register(Box::new(dispatches_total.clone()))
            .expect("register dispatches_total");
        registry
            .register(Box::new(dispatch_latency_seconds.clone()))
            .expect("register dispatch_latency_seconds");
        registry
            .register(Box::new(dispatch_radius_km.clone()))
            .expect("register dispatch_radius_km");
        registry
            .register(Box::new(available_riders.clone()))
            .expect("register available_riders");

        Self {
            registry,
            dispatches_total,
            dispatch_latency_seconds,
            dispatch_radius_km,
            available_riders,
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

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
