use std::time::Instant;

use chrono::{DateTime, Duration, Months, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::db::transaction_repo;
use crate::models::{convert_to_usd, Currency, Transaction, TransactionType};

const PROGRESS_EVERY: usize = 100_000;
const MAX_PAYOUT_MULTIPLIER: f64 = 2.5;
const MAX_PAYOUT_DELAY_SECS: i64 = 300;

#[derive(Debug, Clone, Copy)]
pub struct SeedPlan {
    pub rounds: usize,
    pub users: usize,
    pub batch_size: usize,
}

impl From<&AppConfig> for SeedPlan {
    fn from(config: &AppConfig) -> Self {
        Self {
            rounds: config.seed_rounds,
            users: config.seed_users,
            batch_size: config.seed_batch_size.clamp(1, transaction_repo::MAX_BATCH_ROWS),
        }
    }
}

fn to_decimal(value: f64, dp: u32) -> Decimal {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(dp))
        .unwrap_or_default()
}

pub fn generate_user_ids(count: usize) -> Vec<Uuid> {
    (0..count).map(|_| Uuid::new_v4()).collect()
}

/// One betting round: a wager at a random instant in the year before `now`
/// and its payout up to five minutes later. Native amounts keep 8 decimal
/// places, USD amounts 2.
pub fn generate_round<R: Rng>(
    rng: &mut R,
    user_ids: &[Uuid],
    round: usize,
    now: DateTime<Utc>,
) -> [Transaction; 2] {
    let user_id = if user_ids.is_empty() {
        Uuid::new_v4()
    } else {
        user_ids[rng.gen_range(0..user_ids.len())]
    };
    let round_id = format!("round_{}_{}", now.timestamp_nanos_opt().unwrap_or_default(), round);
    let currency = Currency::ALL[rng.gen_range(0..Currency::ALL.len())];

    let year_ago = now
        .checked_sub_months(Months::new(12))
        .unwrap_or(now - Duration::days(365));
    let span_ms = (now - year_ago).num_milliseconds().max(1);
    let wagered_at = year_ago + Duration::milliseconds(rng.gen_range(0..span_ms));

    let (low, high) = currency.wager_range();
    let wager_amount = rng.gen_range(low..high);
    let wager_usd = convert_to_usd(wager_amount, currency.code());

    let paid_at = wagered_at + Duration::seconds(rng.gen_range(0..MAX_PAYOUT_DELAY_SECS));
    let payout_amount = wager_amount * rng.gen_range(0.0..MAX_PAYOUT_MULTIPLIER);
    let payout_usd = convert_to_usd(payout_amount, currency.code());

    [
        Transaction {
            id: Uuid::new_v4(),
            created_at: wagered_at,
            user_id,
            round_id: round_id.clone(),
            kind: TransactionType::Wager,
            amount: to_decimal(wager_amount, 8),
            currency,
            usd_amount: to_decimal(wager_usd, 2),
        },
        Transaction {
            id: Uuid::new_v4(),
            created_at: paid_at,
            user_id,
            round_id,
            kind: TransactionType::Payout,
            amount: to_decimal(payout_amount, 8),
            currency,
            usd_amount: to_decimal(payout_usd, 2),
        },
    ]
}

/// Replace the ledger contents with `plan.rounds` synthetic rounds spread
/// over `plan.users` users. Returns the number of transactions written.
pub async fn run_seeder(pool: &PgPool, plan: SeedPlan) -> anyhow::Result<usize> {
    tracing::info!(
        rounds = plan.rounds,
        users = plan.users,
        batch_size = plan.batch_size,
        "Starting data generation"
    );

    let removed = transaction_repo::clear_transactions(pool).await?;
    tracing::info!(removed, "Cleared existing transactions");

    let user_ids = generate_user_ids(plan.users);
    let mut rng = StdRng::from_entropy();
    let started = Instant::now();
    let now = Utc::now();

    let mut batch: Vec<Transaction> = Vec::with_capacity(plan.batch_size + 1);
    let mut written = 0usize;

    for round in 0..plan.rounds {
        if round % PROGRESS_EVERY == 0 && round > 0 {
            tracing::info!(
                round,
                pct = %format!("{:.1}", round as f64 / plan.rounds as f64 * 100.0),
                "Generation progress"
            );
        }

        batch.extend(generate_round(&mut rng, &user_ids, round, now));

        if batch.len() >= plan.batch_size {
            transaction_repo::insert_batch(pool, &batch).await?;
            written += batch.len();
            batch.clear();
        }
    }

    if !batch.is_empty() {
        transaction_repo::insert_batch(pool, &batch).await?;
        written += batch.len();
    }

    tracing::info!(
        rounds = plan.rounds,
        transactions = written,
        elapsed_secs = started.elapsed().as_secs_f64(),
        "Data generation completed"
    );

    Ok(written)
}
