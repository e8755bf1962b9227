//! Health, status and metrics routes
//!
//! - `/health` - liveness
//! - `/status` - ingestion counters, latency percentiles, process memory
//! - `/metrics` - the same counters in Prometheus text format
//!
//! ```json
//! {
//!   "version": "0.1.0",
//!   "uptime_seconds": 3600,
//!   "records_saved": 1024,
//!   "failures": { "request": 1, "structural": 3, "fetch": 12, "store": 0, "other": 0 },
//!   "latency": { "count": 1040, "p50_ms": 220.5, "p95_ms": 640.2, "p99_ms": 980.7 },
//!   "rss_bytes": 31457280
//! }
//! ```

use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use hdrhistogram::Histogram;
use parking_lot::Mutex;
use serde::Serialize;
use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::debug;

use crate::pipeline::Pipeline;

/// Failure kind for ingestion requests rejected before the pipeline runs.
pub const REQUEST_FAILURE: &str = "request";

/// Ingestion latency is tracked from 1us up to 10 minutes.
const LATENCY_MAX_MICROS: u64 = 600_000_000;

/// Body of `GET /status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    /// Crate version
    pub version: &'static str,
    /// Seconds since startup
    pub uptime_seconds: u64,
    /// Listings fetched, extracted and saved
    pub records_saved: u64,
    /// Failed ingestions by cause
    pub failures: FailureCounts,
    /// Ingestion latency
    pub latency: LatencyMetrics,
    /// Resident memory of the process, 0 when unavailable
    pub rss_bytes: u64,
}

/// Failed ingestions broken down by cause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FailureCounts {
    /// Malformed ingestion request
    pub request: u64,
    /// Page lacked a required listing element
    pub structural: u64,
    /// Page could not be retrieved
    pub fetch: u64,
    /// Record could not be saved
    pub store: u64,
    /// Anything else
    pub other: u64,
}

impl FailureCounts {
    /// Sum of all causes.
    pub fn total(&self) -> u64 {
        self.request + self.structural + self.fetch + self.store + self.other
    }

    fn by_kind(&self) -> [(&'static str, u64); 5] {
        [
            (REQUEST_FAILURE, self.request),
            ("structural", self.structural),
            ("fetch", self.fetch),
            ("store", self.store),
            ("other", self.other),
        ]
    }
}

/// Ingestion latency percentiles in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LatencyMetrics {
    /// Ingestions recorded
    pub count: u64,
    /// Median
    pub p50_ms: f64,
    /// 95th percentile
    pub p95_ms: f64,
    /// 99th percentile
    pub p99_ms: f64,
}

/// Shared server state: the pipeline and its counters.
#[derive(Debug)]
pub struct AppState {
    pipeline: Pipeline,
    started: Instant,
    records_saved: AtomicU64,
    failures: [AtomicU64; 5],
    latency: Mutex<Histogram<u64>>,
}

impl AppState {
    /// Wrap a pipeline with fresh counters.
    pub fn new(pipeline: Pipeline) -> Self {
        let latency = Histogram::new_with_bounds(1, LATENCY_MAX_MICROS, 3)
            .expect("latency histogram bounds are valid");
        Self {
            pipeline,
            started: Instant::now(),
            records_saved: AtomicU64::new(0),
            failures: Default::default(),
            latency: Mutex::new(latency),
        }
    }

    /// The ingestion pipeline.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Seconds since the state was created.
    pub fn uptime_seconds(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    /// Count a saved record and return the new total.
    pub fn record_saved(&self) -> u64 {
        self.records_saved.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Total saved records.
    pub fn records_saved(&self) -> u64 {
        self.records_saved.load(Ordering::Relaxed)
    }

    /// Count a failed ingestion under an error kind (see [`crate::Error::kind`]
    /// and [`REQUEST_FAILURE`]). Unknown kinds count as `other`.
    pub fn record_failure(&self, kind: &str) {
        let slot = match kind {
            REQUEST_FAILURE => 0,
            "structural" => 1,
            "fetch" => 2,
            "store" => 3,
            _ => 4,
        };
        self.failures[slot].fetch_add(1, Ordering::Relaxed);
    }

    /// Failure counters snapshot.
    pub fn failures(&self) -> FailureCounts {
        let load = |slot: usize| self.failures[slot].load(Ordering::Relaxed);
        FailureCounts {
            request: load(0),
            structural: load(1),
            fetch: load(2),
            store: load(3),
            other: load(4),
        }
    }

    /// Record how long one ingestion took. Out-of-range values are clamped.
    pub fn record_latency(&self, duration: Duration) {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        self.latency.lock().saturating_record(micros.max(1));
    }

    /// Latency percentiles; all zero before the first ingestion.
    pub fn latency_metrics(&self) -> LatencyMetrics {
        let histogram = self.latency.lock();
        if histogram.is_empty() {
            return LatencyMetrics::default();
        }
        let ms = |quantile: f64| histogram.value_at_quantile(quantile) as f64 / 1000.0;
        LatencyMetrics {
            count: histogram.len(),
            p50_ms: ms(0.5),
            p95_ms: ms(0.95),
            p99_ms: ms(0.99),
        }
    }

    /// Counters in Prometheus text exposition format.
    pub fn to_prometheus_format(&self) -> String {
        let latency = self.latency_metrics();
        let mut output = String::new();

        let _ = writeln!(output, "# TYPE clx_records_saved_total counter");
        let _ = writeln!(output, "clx_records_saved_total {}", self.records_saved());
        let _ = writeln!(output, "# TYPE clx_failures_total counter");
        for (kind, count) in self.failures().by_kind() {
            let _ = writeln!(output, "clx_failures_total{{kind=\"{kind}\"}} {count}");
        }
        let _ = writeln!(output, "# TYPE clx_ingest_duration_ms summary");
        for (quantile, value) in [
            ("0.5", latency.p50_ms),
            ("0.95", latency.p95_ms),
            ("0.99", latency.p99_ms),
        ] {
            let _ = writeln!(
                output,
                "clx_ingest_duration_ms{{quantile=\"{quantile}\"}} {value}"
            );
        }
        let _ = writeln!(output, "clx_ingest_duration_ms_count {}", latency.count);
        let _ = writeln!(output, "# TYPE clx_uptime_seconds gauge");
        let _ = writeln!(output, "clx_uptime_seconds {}", self.uptime_seconds());

        output
    }
}

fn resident_memory() -> u64 {
    let pid = Pid::from_u32(std::process::id());
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    system.process(pid).map_or_else(
        || {
            debug!("current process not visible to sysinfo");
            0
        },
        |process| process.memory(),
    )
}

/// `GET /health`
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// `GET /status`
pub async fn status_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(StatusResponse {
        version: crate::VERSION,
        uptime_seconds: state.uptime_seconds(),
        records_saved: state.records_saved(),
        failures: state.failures(),
        latency: state.latency_metrics(),
        rss_bytes: resident_memory(),
    })
}

/// `GET /metrics`
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.to_prometheus_format(),
    )
}
