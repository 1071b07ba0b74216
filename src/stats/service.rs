use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::cache::ResultCache;
use crate::db::{Grouped, TransactionStore};
use crate::errors::StatsError;
use crate::models::{DailyWagerVolume, GrossGamingRevenue, UserWagerPercentile};

use super::aggregate;
use super::cache_key::{self, QueryKind};
use super::window::{Clock, QueryWindow};

/// How long a computed result stays cached.
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Upper bound on a single cache round-trip. A slower cache counts as a miss.
pub const CACHE_OP_TIMEOUT: Duration = Duration::from_millis(250);

/// The statistics engine: validates windows, serves cached results, and
/// otherwise asks the store for grouped sums and reduces them into report rows.
pub struct StatsService {
    store: Arc<dyn TransactionStore>,
    cache: Option<Arc<dyn ResultCache>>,
    clock: Arc<dyn Clock>,
}

impl StatsService {
    pub fn new(
        store: Arc<dyn TransactionStore>,
        cache: Option<Arc<dyn ResultCache>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { store, cache, clock }
    }

    /// Parse and validate a `YYYY-MM-DD` date range against the current time.
    pub fn window(&self, from: &str, to: &str) -> Result<QueryWindow, StatsError> {
        QueryWindow::parse(from, to, self.clock.now())
    }

    pub async fn store_healthy(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Transaction store ping failed");
                false
            }
        }
    }

    /// Wagers minus payouts per currency.
    pub async fn gross_gaming_revenue(
        &self,
        window: &QueryWindow,
    ) -> Result<Vec<GrossGamingRevenue>, StatsError> {
        let kind = QueryKind::GrossGamingRevenue;
        let key = cache_key::window_key(kind, window);
        self.cached_query(kind, &key, async {
            let fetched = self.store.totals_by_currency_and_type(window).await;
            let totals = self.groups(kind, fetched)?;
            Ok(aggregate::gross_gaming_revenue(&totals))
        })
        .await
    }

    /// Wager totals per UTC day and currency, sorted by day then currency.
    pub async fn daily_wager_volume(
        &self,
        window: &QueryWindow,
    ) -> Result<Vec<DailyWagerVolume>, StatsError> {
        let kind = QueryKind::DailyWagerVolume;
        let key = cache_key::window_key(kind, window);
        self.cached_query(kind, &key, async {
            let totals = self.groups(kind, self.store.daily_wager_totals(window).await)?;
            Ok(aggregate::daily_wager_volume(&totals))
        })
        .await
    }

    /// Rank and inverse-rank percentile of one user's USD wager total.
    pub async fn user_wager_percentile(
        &self,
        window: &QueryWindow,
        user_id: Uuid,
    ) -> Result<UserWagerPercentile, StatsError> {
        let kind = QueryKind::UserPercentile;
        let key = cache_key::user_key(window, user_id);
        self.cached_query(kind, &key, async {
            let totals = self.groups(kind, self.store.wager_totals_by_user(window).await)?;
            let ranking = aggregate::rank_wagerers(&totals);
            aggregate::locate_user(&ranking, user_id)
        })
        .await
    }

    /// Serve `key` from the cache, or run `compute` and cache its success.
    async fn cached_query<T, F>(&self, kind: QueryKind, key: &str, compute: F) -> Result<T, StatsError>
    where
        T: Serialize + DeserializeOwned,
        F: Future<Output = Result<T, StatsError>>,
    {
        if let Some(hit) = self.cache_get::<T>(kind, key).await {
            return Ok(hit);
        }

        let started = Instant::now();
        let result = compute.await;
        histogram!("stats_query_duration_seconds", "query" => kind.prefix())
            .record(started.elapsed().as_secs_f64());

        match &result {
            Ok(value) => self.cache_put(kind, key, value).await,
            Err(e) => {
                counter!("stats_queries_failed_total", "query" => kind.prefix()).increment(1);
                tracing::warn!(query = %kind, error = %e, "Statistics query failed");
            }
        }

        result
    }

    /// Unwrap a store result, dropping groups that did not decode.
    fn groups<T>(
        &self,
        kind: QueryKind,
        fetched: anyhow::Result<Vec<Grouped<T>>>,
    ) -> Result<Vec<T>, StatsError> {
        let fetched = fetched.map_err(StatsError::AggregationFailed)?;

        let received = fetched.len();
        let mut skipped = 0usize;
        let groups: Vec<T> = fetched
            .into_iter()
            .filter_map(|group| match group {
                Ok(group) => Some(group),
                Err(e) => {
                    skipped += 1;
                    tracing::debug!(query = %kind, error = %e, "Skipping malformed group");
                    None
                }
            })
            .collect();

        if skipped > 0 {
            counter!("stats_records_skipped_total", "query" => kind.prefix()).increment(skipped as u64);
            tracing::warn!(query = %kind, skipped, received, "Skipped malformed transaction groups");
        }

        tracing::debug!(query = %kind, groups = groups.len(), "Store grouping complete");

        Ok(groups)
    }

    async fn cache_get<T: DeserializeOwned>(&self, kind: QueryKind, key: &str) -> Option<T> {
        let cache = self.cache.as_ref()?;

        let raw = match tokio::time::timeout(CACHE_OP_TIMEOUT, cache.get(key)).await {
            Ok(Ok(Some(raw))) => raw,
            Ok(Ok(None)) => {
                counter!("stats_cache_misses_total", "query" => kind.prefix()).increment(1);
                return None;
            }
            Ok(Err(e)) => {
                counter!("stats_cache_errors_total", "query" => kind.prefix()).increment(1);
                tracing::warn!(key, error = %e, "Cache read failed, treating as miss");
                return None;
            }
            Err(_) => {
                counter!("stats_cache_errors_total", "query" => kind.prefix()).increment(1);
                tracing::warn!(key, "Cache read timed out, treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                counter!("stats_cache_hits_total", "query" => kind.prefix()).increment(1);
                tracing::debug!(key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                counter!("stats_cache_errors_total", "query" => kind.prefix()).increment(1);
                tracing::warn!(key, error = %e, "Corrupt cache entry, treating as miss");
                None
            }
        }
    }

    async fn cache_put<T: Serialize>(&self, kind: QueryKind, key: &str, value: &T) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };

        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to serialize result for cache");
                return;
            }
        };

        match tokio::time::timeout(CACHE_OP_TIMEOUT, cache.set(key, payload, CACHE_TTL)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                counter!("stats_cache_errors_total", "query" => kind.prefix()).increment(1);
                tracing::warn!(key, error = %e, "Cache write failed");
            }
            Err(_) => {
                counter!("stats_cache_errors_total", "query" => kind.prefix()).increment(1);
                tracing::warn!(key, "Cache write timed out");
            }
        }
    }
}
