// Private module declaration
mod server;

use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for the order workflows
// ============================================================================
//
// Provides:
// - Order creation / cancellation counts
// - Checkout outcomes and latency
// - Retry attempts on transient storage failures
// - Catalog writes
//
// Exposed for scraping via /metrics (see `start_metrics_server`).
// ============================================================================

pub struct ShopMetrics {
    registry: Registry,

    pub orders_created: IntCounter,
    pub orders_cancelled: IntCounter,
    pub products_created: IntCounter,

    pub checkouts: IntCounterVec,
    pub checkout_duration: Histogram,

    pub retry_attempts: IntCounterVec,
}

impl ShopMetrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let orders_created = IntCounter::new("orders_created_total", "Total orders created")?;
        registry.register(Box::new(orders_created.clone()))?;

        let orders_cancelled = IntCounter::new("orders_cancelled_total", "Total orders cancelled")?;
        registry.register(Box::new(orders_cancelled.clone()))?;

        let products_created = IntCounter::new("products_created_total", "Total products created")?;
        registry.register(Box::new(products_created.clone()))?;

        let checkouts = IntCounterVec::new(
            Opts::new("checkouts_total", "Checkout attempts by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(checkouts.clone()))?;

        let checkout_duration = Histogram::with_opts(
            HistogramOpts::new("checkout_duration_seconds", "Checkout duration including payment")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        )?;
        registry.register(Box::new(checkout_duration.clone()))?;

        let retry_attempts = IntCounterVec::new(
            Opts::new("retry_attempts_total", "Retries after transient storage failures"),
            &["operation"],
        )?;
        registry.register(Box::new(retry_attempts.clone()))?;

        Ok(Self {
            registry,
            orders_created,
            orders_cancelled,
            products_created,
            checkouts,
            checkout_duration,
            retry_attempts,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_checkout(&self, outcome: &str, duration_secs: f64) {
        self.checkouts.with_label_values(&[outcome]).inc();
        self.checkout_duration.observe(duration_secs);
    }

    pub fn record_retry(&self, operation: &str) {
        self.retry_attempts.with_label_values(&[operation]).inc();
    }
}
