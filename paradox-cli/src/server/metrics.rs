use std::sync::{Arc, OnceLock};
use std::time::Instant;

use async_trait::async_trait;
use axum::extract::MatchedPath;
use axum::http::{header, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use paradox_lib::{Snapshot, SnapshotStore, StoreError};
use prometheus::core::Collector;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

static REGISTRY: OnceLock<Registry> = OnceLock::new();
static METRICS: OnceLock<Metrics> = OnceLock::new();

const LATENCY_BUCKETS: &[f64] = &[0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0];

pub struct Metrics {
    // Catalog contents, refreshed on every load and save
    pub items_total: IntGauge,
    pub active_items_total: IntGauge,
    pub subscribers_total: IntGauge,

    pub store_write_duration: HistogramVec,
    pub store_write_errors: IntCounterVec,

    pub login_total: IntCounterVec,

    pub http_requests_total: IntCounterVec,
    pub http_request_duration: HistogramVec,
}

/// Register `collector` and hand back a clone for recording.
fn registered<C: Collector + Clone + 'static>(registry: &Registry, collector: C) -> C {
    registry
        .register(Box::new(collector.clone()))
        .expect("metric registered twice");
    collector
}

fn gauge(registry: &Registry, name: &str, help: &str) -> IntGauge {
    registered(
        registry,
        IntGauge::new(name, help).expect("invalid gauge definition"),
    )
}

fn counter_vec(registry: &Registry, name: &str, help: &str, labels: &[&str]) -> IntCounterVec {
    registered(
        registry,
        IntCounterVec::new(Opts::new(name, help), labels).expect("invalid counter definition"),
    )
}

fn histogram_vec(registry: &Registry, name: &str, help: &str, labels: &[&str]) -> HistogramVec {
    registered(
        registry,
        HistogramVec::new(
            HistogramOpts::new(name, help).buckets(LATENCY_BUCKETS.to_vec()),
            labels,
        )
        .expect("invalid histogram definition"),
    )
}

impl Metrics {
    fn new(registry: &Registry) -> Self {
        Self {
            items_total: gauge(registry, "paradox_items_total", "Items in the catalog"),
            active_items_total: gauge(
                registry,
                "paradox_active_items_total",
                "Items visible in the public listing",
            ),
            subscribers_total: gauge(
                registry,
                "paradox_subscribers_total",
                "Mailing list subscribers",
            ),
            store_write_duration: histogram_vec(
                registry,
                "paradox_store_write_duration_seconds",
                "Time to persist a full snapshot",
                &["backend"],
            ),
            store_write_errors: counter_vec(
                registry,
                "paradox_store_write_errors_total",
                "Failed snapshot writes",
                &["backend"],
            ),
            login_total: counter_vec(
                registry,
                "paradox_login_total",
                "Admin login attempts",
                &["outcome"],
            ),
            http_requests_total: counter_vec(
                registry,
                "paradox_http_requests_total",
                "HTTP requests served",
                &["method", "path", "status"],
            ),
            http_request_duration: histogram_vec(
                registry,
                "paradox_http_request_duration_seconds",
                "HTTP request latency",
                &["method", "path"],
            ),
        }
    }

    fn observe_snapshot(&self, snapshot: &Snapshot) {
        let active = snapshot.items.iter().filter(|i| i.is_active()).count();
        self.items_total.set(snapshot.items.len() as i64);
        self.active_items_total.set(active as i64);
        self.subscribers_total.set(snapshot.subscribers.len() as i64);
    }
}

pub fn metrics() -> &'static Metrics {
    METRICS.get_or_init(|| Metrics::new(REGISTRY.get_or_init(Registry::new)))
}

/// GET /metrics in the Prometheus text format.
pub async fn handle_metrics() -> Response {
    metrics();
    let families = REGISTRY.get_or_init(Registry::new).gather();
    let encoder = TextEncoder::new();
    let mut body = Vec::new();
    match encoder.encode(&families, &mut body) {
        Ok(()) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, encoder.format_type().to_string())],
            body,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// Middleware recording request count and latency per route template.
/// Requests that match no route share one label so stray URLs cannot grow
/// the series count.
pub async fn track_metrics(request: Request<axum::body::Body>, next: Next) -> Response {
    let method = request.method().as_str().to_owned();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let started = Instant::now();
    let response = next.run(request).await;
    let status = response.status().as_u16().to_string();

    let m = metrics();
    m.http_requests_total
        .with_label_values(&[method.as_str(), route.as_str(), status.as_str()])
        .inc();
    m.http_request_duration
        .with_label_values(&[method.as_str(), route.as_str()])
        .observe(started.elapsed().as_secs_f64());

    response
}

/// Store decorator that times writes and keeps the catalog gauges current.
pub struct MeteredStore {
    inner: Arc<dyn SnapshotStore>,
}

impl MeteredStore {
    pub fn new(inner: Arc<dyn SnapshotStore>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl SnapshotStore for MeteredStore {
    async fn load(&self) -> Snapshot {
        let snapshot = self.inner.load().await;
        metrics().observe_snapshot(&snapshot);
        snapshot
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let backend = self.inner.backend();
        let start = Instant::now();
        let result = self.inner.save(snapshot).await;

        let m = metrics();
        m.store_write_duration
            .with_label_values(&[backend])
            .observe(start.elapsed().as_secs_f64());
        match &result {
            Ok(()) => m.observe_snapshot(snapshot),
            Err(_) => m.store_write_errors.with_label_values(&[backend]).inc(),
        }
        result
    }

    fn backend(&self) -> &'static str {
        self.inner.backend()
    }
}
