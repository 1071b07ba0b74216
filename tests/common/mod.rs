use std::sync::{Arc, OnceLock};

use chrono::{DateTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use admin_stats::cache::{MemoryCache, ResultCache};
use admin_stats::db::{MemoryStore, PgTransactionStore};
use admin_stats::models::{Currency, Transaction, TransactionType};
use admin_stats::services::seeder;
use admin_stats::stats::{FixedClock, StatsService};

/// The instant every test treats as "now".
#[allow(dead_code)]
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

#[allow(dead_code)]
pub fn at(month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, month, day, hour, 0, 0).unwrap()
}

#[allow(dead_code)]
pub fn transaction(
    user_id: Uuid,
    kind: TransactionType,
    currency: Currency,
    amount: Decimal,
    usd_amount: Decimal,
    created_at: DateTime<Utc>,
) -> Transaction {
    Transaction {
        id: Uuid::new_v4(),
        created_at,
        user_id,
        round_id: format!("round_{}", Uuid::new_v4().simple()),
        kind,
        amount,
        currency,
        usd_amount,
    }
}

/// A wager whose native amount is derived from its USD value at the static rate.
#[allow(dead_code)]
pub fn usd_wager(user_id: Uuid, currency: Currency, usd: i64, created_at: DateTime<Utc>) -> Transaction {
    let amount = (Decimal::from(usd) / Decimal::try_from(currency.usd_rate()).unwrap()).round_dp(8);
    transaction(user_id, TransactionType::Wager, currency, amount, Decimal::from(usd), created_at)
}

#[allow(dead_code)]
pub fn usd_payout(user_id: Uuid, currency: Currency, usd: i64, created_at: DateTime<Utc>) -> Transaction {
    let amount = (Decimal::from(usd) / Decimal::try_from(currency.usd_rate()).unwrap()).round_dp(8);
    transaction(user_id, TransactionType::Payout, currency, amount, Decimal::from(usd), created_at)
}

/// Synthetic ledger spread over the year before [`now`].
#[allow(dead_code)]
pub fn generated_ledger(rounds: usize, users: usize, seed: u64) -> Vec<Transaction> {
    let mut rng = StdRng::seed_from_u64(seed);
    let user_ids = seeder::generate_user_ids(users);
    (0..rounds)
        .flat_map(|n| seeder::generate_round(&mut rng, &user_ids, n, now()))
        .collect()
}

#[allow(dead_code)]
pub fn build_service(store: Arc<MemoryStore>, cache: Option<Arc<MemoryCache>>) -> StatsService {
    StatsService::new(
        store,
        cache.map(|c| c as Arc<dyn ResultCache>),
        Arc::new(FixedClock(now())),
    )
}

#[allow(dead_code)]
pub fn build_pg_service(pool: PgPool) -> StatsService {
    StatsService::new(
        Arc::new(PgTransactionStore::new(pool)),
        None,
        Arc::new(FixedClock(now())),
    )
}

/// A migrated, emptied test database, held exclusively until dropped.
#[allow(dead_code)]
pub struct TestDb {
    pub pool: PgPool,
    _guard: MutexGuard<'static, ()>,
}

/// Connect to `TEST_DATABASE_URL`, run all migrations and empty the ledger.
///
/// Returns `None` when the variable is unset so the suite still runs without
/// a database. Tests in one binary share the table, so each holds a lock for
/// its whole run.
#[allow(dead_code)]
pub async fn setup_test_db() -> Option<TestDb> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping database test");
        return None;
    };
    let guard = LOCK.get_or_init(|| Mutex::new(())).lock().await;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // Clean tables for test isolation
    sqlx::query("DELETE FROM transactions").execute(&pool).await.ok();

    Some(TestDb { pool, _guard: guard })
}
