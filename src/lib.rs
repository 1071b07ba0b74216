pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod services;
pub mod stats;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::stats::StatsService;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub stats: Arc<StatsService>,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}
