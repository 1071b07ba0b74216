use std::env;

/// Token accepted when `AUTH_TOKEN` is not set. Development only.
pub const DEFAULT_AUTH_TOKEN: &str = "admin-secret-token-2024";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub redis_url: Option<String>,

    // Static bearer token for the statistics endpoints
    pub auth_token: String,

    // Synthetic data generator
    pub seed_rounds: usize,
    pub seed_users: usize,
    pub seed_batch_size: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".into())
                .parse()
                .unwrap_or(10),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            redis_url: env::var("REDIS_URL").ok().filter(|s| !s.trim().is_empty()),

            auth_token: env::var("AUTH_TOKEN")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_AUTH_TOKEN.into()),

            seed_rounds: env::var("SEED_ROUNDS")
                .unwrap_or_else(|_| "2000000".into())
                .parse()
                .unwrap_or(2_000_000),
            seed_users: env::var("SEED_USERS")
                .unwrap_or_else(|_| "500".into())
                .parse()
                .unwrap_or(500),
            seed_batch_size: env::var("SEED_BATCH_SIZE")
                .unwrap_or_else(|_| "1000".into())
                .parse()
                .unwrap_or(1_000),
        })
    }

    /// Returns true if the server is running with the built-in development token.
    pub fn uses_default_token(&self) -> bool {
        self.auth_token == DEFAULT_AUTH_TOKEN
    }
}
