use async_trait::async_trait;
use futures_util::TryStreamExt;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use crate::models::{CurrencyTypeTotal, DailyTotal, RecordError, Transaction, UserCurrencyTotal};
use crate::stats::QueryWindow;

use super::{Grouped, TransactionStore};

/// PostgreSQL-backed ledger.
#[derive(Debug, Clone)]
pub struct PgTransactionStore {
    pool: PgPool,
}

impl PgTransactionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn column<'r, T>(row: &'r PgRow, name: &'static str) -> Result<T, RecordError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get::<T, _>(name).map_err(|e| RecordError::Decode {
        column: name,
        reason: e.to_string(),
    })
}

fn decode_currency_type(row: &PgRow) -> Grouped<CurrencyTypeTotal> {
    CurrencyTypeTotal::decode(
        &column::<String>(row, "currency")?,
        &column::<String>(row, "type")?,
        column(row, "amount")?,
        column(row, "usd_amount")?,
    )
}

fn decode_daily(row: &PgRow) -> Grouped<DailyTotal> {
    DailyTotal::decode(
        column(row, "day")?,
        &column::<String>(row, "currency")?,
        column(row, "amount")?,
        column(row, "usd_amount")?,
    )
}

fn decode_user(row: &PgRow) -> Grouped<UserCurrencyTotal> {
    UserCurrencyTotal::decode(
        column(row, "user_id")?,
        &column::<String>(row, "currency")?,
        column(row, "usd_amount")?,
    )
}

impl PgTransactionStore {
    /// Run a grouping query over `[from, to]` (bound as `$1`, `$2`) and
    /// decode each group as it streams in.
    async fn fetch_grouped<T>(
        &self,
        sql: &'static str,
        window: &QueryWindow,
        decode: fn(&PgRow) -> Grouped<T>,
    ) -> anyhow::Result<Vec<Grouped<T>>>
    where
        T: Send,
    {
        let mut rows = sqlx::query(sql)
            .bind(window.from())
            .bind(window.to())
            .fetch(&self.pool);

        let mut groups = Vec::new();
        while let Some(row) = rows.try_next().await? {
            groups.push(decode(&row));
        }

        Ok(groups)
    }
}

#[async_trait]
impl TransactionStore for PgTransactionStore {
    async fn totals_by_currency_and_type(
        &self,
        window: &QueryWindow,
    ) -> anyhow::Result<Vec<Grouped<CurrencyTypeTotal>>> {
        self.fetch_grouped(
            r#"
            SELECT currency, type,
                   SUM(amount::float8) AS amount,
                   SUM(usd_amount::float8) AS usd_amount
            FROM transactions
            WHERE created_at >= $1 AND created_at <= $2
            GROUP BY currency, type
            "#,
            window,
            decode_currency_type,
        )
        .await
    }

    async fn daily_wager_totals(
        &self,
        window: &QueryWindow,
    ) -> anyhow::Result<Vec<Grouped<DailyTotal>>> {
        self.fetch_grouped(
            r#"
            SELECT to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD') AS day, currency,
                   SUM(amount::float8) AS amount,
                   SUM(usd_amount::float8) AS usd_amount
            FROM transactions
            WHERE created_at >= $1 AND created_at <= $2 AND type = 'Wager'
            GROUP BY 1, 2
            ORDER BY 1, 2
            "#,
            window,
            decode_daily,
        )
        .await
    }

    async fn wager_totals_by_user(
        &self,
        window: &QueryWindow,
    ) -> anyhow::Result<Vec<Grouped<UserCurrencyTotal>>> {
        self.fetch_grouped(
            r#"
            SELECT user_id, currency,
                   SUM(usd_amount::float8) AS usd_amount
            FROM transactions
            WHERE created_at >= $1 AND created_at <= $2 AND type = 'Wager'
            GROUP BY user_id, currency
            ORDER BY MIN(created_at), user_id, currency
            "#,
            window,
            decode_user,
        )
        .await
    }

    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Delete every transaction. Returns the number of rows removed.
pub async fn clear_transactions(pool: &PgPool) -> anyhow::Result<u64> {
    let result = sqlx::query("DELETE FROM transactions").execute(pool).await?;
    Ok(result.rows_affected())
}

/// Bind parameters per inserted row.
const BINDS_PER_ROW: usize = 8;

/// Most rows one INSERT can carry: Postgres caps a statement at 65535 binds.
pub const MAX_BATCH_ROWS: usize = u16::MAX as usize / BINDS_PER_ROW;

/// Insert transactions, one statement per `MAX_BATCH_ROWS` rows.
pub async fn insert_batch(pool: &PgPool, batch: &[Transaction]) -> anyhow::Result<()> {
    for chunk in batch.chunks(MAX_BATCH_ROWS) {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO transactions (id, created_at, user_id, round_id, type, amount, currency, usd_amount) ",
        );
        builder.push_values(chunk, |mut b, tx| {
            b.push_bind(tx.id)
                .push_bind(tx.created_at)
                .push_bind(tx.user_id)
                .push_bind(tx.round_id.clone())
                .push_bind(tx.kind.as_str())
                .push_bind(tx.amount)
                .push_bind(tx.currency.code())
                .push_bind(tx.usd_amount);
        });

        builder.build().execute(pool).await?;
    }
    Ok(())
}
