use prometheus::{
    Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

/// Prometheus metrics for the search service
#[derive(Clone)]
pub struct SearchMetrics {
    // Counters
    pub searches_total: CounterVec,
    pub search_errors: Counter,
    pub not_modified_total: CounterVec,
    pub refresh_triggers: CounterVec,
    pub rebuilds_total: CounterVec,

    // Gauges
    pub total_documents: Gauge,
    pub total_collections: Gauge,
    pub snapshot_generation: Gauge,

    // Histograms
    pub rebuild_latency: Histogram,
    pub search_latency: HistogramVec,

    // Registry
    registry: Arc<Registry>,
}

impl SearchMetrics {
    /// Create a new SearchMetrics instance
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Counters
        let searches_total = CounterVec::new(
            Opts::new("docsift_searches_total", "Total number of searches by scope kind"),
            &["scope"],
        )?;
        registry.register(Box::new(searches_total.clone()))?;

        let search_errors = Counter::with_opts(Opts::new(
            "docsift_search_errors_total",
            "Total number of rejected searches",
        ))?;
        registry.register(Box::new(search_errors.clone()))?;

        let not_modified_total = CounterVec::new(
            Opts::new(
                "docsift_not_modified_total",
                "Conditional requests answered with 304",
            ),
            &["endpoint"],
        )?;
        registry.register(Box::new(not_modified_total.clone()))?;

        let refresh_triggers = CounterVec::new(
            Opts::new("docsift_refresh_triggers_total", "Refresh triggers by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(refresh_triggers.clone()))?;

        let rebuilds_total = CounterVec::new(
            Opts::new("docsift_rebuilds_total", "Completed rebuilds by result"),
            &["result"],
        )?;
        registry.register(Box::new(rebuilds_total.clone()))?;

        // Gauges
        let total_documents = Gauge::with_opts(Opts::new(
            "docsift_total_documents",
            "Documents in the active snapshot",
        ))?;
        registry.register(Box::new(total_documents.clone()))?;

        let total_collections = Gauge::with_opts(Opts::new(
            "docsift_total_collections",
            "Collections in the active snapshot",
        ))?;
        registry.register(Box::new(total_collections.clone()))?;

        let snapshot_generation = Gauge::with_opts(Opts::new(
            "docsift_snapshot_generation",
            "Generation of the active snapshot",
        ))?;
        registry.register(Box::new(snapshot_generation.clone()))?;

        // Histograms
        let rebuild_latency = Histogram::with_opts(
            HistogramOpts::new("docsift_rebuild_latency_seconds", "Load and build latency")
                .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;
        registry.register(Box::new(rebuild_latency.clone()))?;

        let search_latency = HistogramVec::new(
            HistogramOpts::new("docsift_search_latency_seconds", "Search latency")
                .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5]),
            &["scope"],
        )?;
        registry.register(Box::new(search_latency.clone()))?;

        Ok(Self {
            searches_total,
            search_errors,
            not_modified_total,
            refresh_triggers,
            rebuilds_total,
            total_documents,
            total_collections,
            snapshot_generation,
            rebuild_latency,
            search_latency,
            registry: Arc::new(registry),
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Record a search; `scoped` is false for default-scope searches
    pub fn record_search(&self, scoped: bool, duration_secs: f64) {
        let label = if scoped { "explicit" } else { "default" };
        self.searches_total.with_label_values(&[label]).inc();
        self.search_latency
            .with_label_values(&[label])
            .observe(duration_secs);
    }

    /// Record a rejected search
    pub fn record_search_error(&self) {
        self.search_errors.inc();
    }

    pub fn record_not_modified(&self, endpoint: &str) {
        self.not_modified_total.with_label_values(&[endpoint]).inc();
    }

    /// Record a refresh trigger as `scheduled` or `coalesced`
    pub fn record_trigger(&self, outcome: &str) {
        self.refresh_triggers.with_label_values(&[outcome]).inc();
    }

    /// Record a successful rebuild and the published snapshot's size
    pub fn record_rebuild(
        &self,
        duration_secs: f64,
        generation: u64,
        collections: usize,
        documents: usize,
    ) {
        self.rebuilds_total.with_label_values(&["success"]).inc();
        self.rebuild_latency.observe(duration_secs);
        self.snapshot_generation.set(generation as f64);
        self.total_collections.set(collections as f64);
        self.total_documents.set(documents as f64);
    }

    pub fn record_rebuild_failure(&self, duration_secs: f64) {
        self.rebuilds_total.with_label_values(&["failure"]).inc();
        self.rebuild_latency.observe(duration_secs);
    }

    /// Render every registered metric in the text exposition format
    pub fn encode(&self) -> Result<Vec<u8>, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(buffer)
    }
}
