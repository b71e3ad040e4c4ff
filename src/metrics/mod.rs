mod server;

use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

pub use server::metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for the loyalty consumer
// ============================================================================
//
// Covers:
// - Order events by outcome (awarded, skipped, failed)
// - Skip reasons
// - Points credited
// - Broker read errors
// - Per-message processing latency
//
// Scraped via /metrics on the metrics server.
// ============================================================================

pub const OUTCOME_AWARDED: &str = "awarded";
pub const OUTCOME_SKIPPED: &str = "skipped";
pub const OUTCOME_FAILED: &str = "failed";

pub struct Metrics {
    registry: Registry,

    pub order_events_total: IntCounterVec,
    pub order_events_skipped_total: IntCounterVec,
    pub loyalty_points_awarded_total: IntCounter,
    pub consumer_read_errors_total: IntCounter,
    pub processing_duration: Histogram,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let order_events_total = IntCounterVec::new(
            Opts::new("order_events_total", "Order events handled by the loyalty listener"),
            &["outcome"],
        )?;
        registry.register(Box::new(order_events_total.clone()))?;

        let order_events_skipped_total = IntCounterVec::new(
            Opts::new("order_events_skipped_total", "Order events skipped without awarding points"),
            &["reason"],
        )?;
        registry.register(Box::new(order_events_skipped_total.clone()))?;

        let loyalty_points_awarded_total = IntCounter::new(
            "loyalty_points_awarded_total",
            "Total loyalty points credited from order events",
        )?;
        registry.register(Box::new(loyalty_points_awarded_total.clone()))?;

        let consumer_read_errors_total = IntCounter::new(
            "consumer_read_errors_total",
            "Failed reads from the order events topic",
        )?;
        registry.register(Box::new(consumer_read_errors_total.clone()))?;

        let processing_duration = Histogram::with_opts(
            HistogramOpts::new(
                "order_event_processing_duration_seconds",
                "Order event processing duration",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        )?;
        registry.register(Box::new(processing_duration.clone()))?;

        Ok(Self {
            registry,
            order_events_total,
            order_events_skipped_total,
            loyalty_points_awarded_total,
            consumer_read_errors_total,
            processing_duration,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_awarded(&self, points: i32, duration_secs: f64) {
        self.order_events_total.with_label_values(&[OUTCOME_AWARDED]).inc();
        self.loyalty_points_awarded_total.inc_by(u64::try_from(points).unwrap_or(0));
        self.processing_duration.observe(duration_secs);
    }

    pub fn record_skipped(&self, reason: &str, duration_secs: f64) {
        self.order_events_total.with_label_values(&[OUTCOME_SKIPPED]).inc();
        self.order_events_skipped_total.with_label_values(&[reason]).inc();
        self.processing_duration.observe(duration_secs);
    }

    pub fn record_failed(&self, duration_secs: f64) {
        self.order_events_total.with_label_values(&[OUTCOME_FAILED]).inc();
        self.processing_duration.observe(duration_secs);
    }

    pub fn record_read_error(&self) {
        self.consumer_read_errors_total.inc();
    }
}
