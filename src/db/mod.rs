pub mod memory;
pub mod transaction_repo;

pub use memory::MemoryStore;
pub use transaction_repo::PgTransactionStore;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::models::{CurrencyTypeTotal, DailyTotal, RecordError, UserCurrencyTotal};
use crate::stats::QueryWindow;

pub async fn init_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    // Verify connectivity
    sqlx::query("SELECT 1").execute(&pool).await?;

    Ok(pool)
}

/// Apply the embedded schema migrations.
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// One first-stage group, or the reason its `type`/`currency` text could not
/// be interpreted.
pub type Grouped<T> = Result<T, RecordError>;

/// Grouped read access to the transaction ledger.
///
/// Every query covers rows with `created_at` inside the window. The store does
/// the first grouping stage; callers reduce the groups further. An `Err` from
/// a method means the query itself failed. Groups that do not decode come back
/// as `Err` items so the caller can skip them.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// `amount` and `usd_amount` summed per `(currency, type)`.
    async fn totals_by_currency_and_type(
        &self,
        window: &QueryWindow,
    ) -> anyhow::Result<Vec<Grouped<CurrencyTypeTotal>>>;

    /// Wager sums per `(UTC calendar day, currency)`.
    async fn daily_wager_totals(
        &self,
        window: &QueryWindow,
    ) -> anyhow::Result<Vec<Grouped<DailyTotal>>>;

    /// Wagered USD per `(user, currency)`, ordered by each group's earliest
    /// wager.
    async fn wager_totals_by_user(
        &self,
        window: &QueryWindow,
    ) -> anyhow::Result<Vec<Grouped<UserCurrencyTotal>>>;

    /// Cheap liveness check.
    async fn ping(&self) -> anyhow::Result<()>;
}
