use anyhow::{bail, Context};

const DEFAULT_DATABASE_URL: &str = "srs.db";
const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5000";
const DEFAULT_POOL_SIZE: u32 = 8;

/// Process-level settings read at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
    pub pool_size: u32,
}

impl AppConfig {
    /// Loads `.env` if present, then reads the process environment
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into());
        let bind_address = lookup("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.into());

        let pool_size = match lookup("DB_POOL_SIZE") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("DB_POOL_SIZE must be a positive integer: {:?}", raw))?,
            None => DEFAULT_POOL_SIZE,
        };
        if pool_size == 0 {
            bail!("DB_POOL_SIZE must be at least 1");
        }

        Ok(Self {
            database_url,
            bind_address,
            pool_size,
        })
    }
}
