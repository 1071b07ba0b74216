//! Fill the transactions table with synthetic wager/payout rounds.

use admin_stats::config::AppConfig;
use admin_stats::db;
use admin_stats::services::seeder::{self, SeedPlan};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    let pool = db::init_pool(&config.database_url, config.db_max_connections).await?;
    db::run_migrations(&pool).await?;

    let written = seeder::run_seeder(&pool, SeedPlan::from(&config)).await?;
    tracing::info!(transactions = written, "Seeding finished");

    Ok(())
}
