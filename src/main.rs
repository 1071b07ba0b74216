use std::sync::Arc;

use admin_stats::api::router::create_router;
use admin_stats::cache::{RedisCache, ResultCache};
use admin_stats::config::AppConfig;
use admin_stats::db::{self, PgTransactionStore};
use admin_stats::stats::{StatsService, SystemClock};
use admin_stats::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    tracing::info!("Connecting to database...");
    let pool = db::init_pool(&config.database_url, config.db_max_connections).await?;
    db::run_migrations(&pool).await?;
    tracing::info!("Database connected, migrations applied");

    let cache: Option<Arc<dyn ResultCache>> = match &config.redis_url {
        Some(url) => match RedisCache::connect(url).await {
            Ok(cache) => {
                tracing::info!("Connected to Redis result cache");
                Some(Arc::new(cache) as Arc<dyn ResultCache>)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to connect to Redis; continuing without cache");
                None
            }
        },
        None => {
            tracing::info!("REDIS_URL not set; result caching disabled");
            None
        }
    };

    if config.uses_default_token() {
        tracing::warn!("AUTH_TOKEN not set; using the built-in development token");
    }

    let stats = StatsService::new(
        Arc::new(PgTransactionStore::new(pool)),
        cache,
        Arc::new(SystemClock),
    );

    let state = AppState {
        config,
        stats: Arc::new(stats),
        metrics_handle: admin_stats::metrics::init_metrics(),
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
