use std::sync::OnceLock;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::stats::QueryKind;

const QUERIES: [QueryKind; 3] = [
    QueryKind::GrossGamingRevenue,
    QueryKind::DailyWagerVolume,
    QueryKind::UserPercentile,
];

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder and register the statistics metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
///
/// Only one global recorder can exist per process; later calls return the
/// handle of the recorder installed by the first.
pub fn init_metrics() -> PrometheusHandle {
    HANDLE.get_or_init(install).clone()
}

fn install() -> PrometheusHandle {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();

    if metrics::set_global_recorder(recorder).is_err() {
        tracing::warn!("Another metrics recorder is already installed; scrape output will be empty");
        return handle;
    }

    // Pre-register so every series appears before the first query runs.
    for kind in QUERIES {
        let query = kind.prefix();
        counter!("stats_cache_hits_total", "query" => query).absolute(0);
        counter!("stats_cache_misses_total", "query" => query).absolute(0);
        counter!("stats_cache_errors_total", "query" => query).absolute(0);
        counter!("stats_records_skipped_total", "query" => query).absolute(0);
        counter!("stats_queries_failed_total", "query" => query).absolute(0);
        let _ = histogram!("stats_query_duration_seconds", "query" => query);
    }

    handle
}
