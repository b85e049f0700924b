use serde::Deserialize;
use std::env;

const DEFAULT_BATCH_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_BATCH_TIMEOUT_CAP_MS: u64 = 60_000;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub bind_addr: String,
    /// Default deadline for batch progress fan-out.
    pub batch_timeout_ms: u64,
    /// Upper bound on caller-supplied batch deadlines.
    pub batch_timeout_cap_ms: u64,
    /// Optional JSON file seeding the in-memory catalog/directory (dev only).
    pub seed_path: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env_name = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let config_builder = config::Config::builder()
            .add_source(
                config::File::with_name(&format!("config/{}", env_name)).required(false), // Allow missing config file, fallback to ENV
            )
            // Override with environment variables (prefix: APP_)
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        let settings = config_builder.build()?;

        let bind_addr = settings
            .get_string("server.bind_addr")
            .or_else(|_| env::var("BIND_ADDR"))
            .unwrap_or_else(|_| "0.0.0.0:8081".to_string());

        let batch_timeout_ms = settings
            .get_int("batch.timeout_ms")
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .or_else(|| {
                env::var("BATCH_TIMEOUT_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
            })
            .unwrap_or(DEFAULT_BATCH_TIMEOUT_MS);

        let batch_timeout_cap_ms = settings
            .get_int("batch.timeout_cap_ms")
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .unwrap_or(DEFAULT_BATCH_TIMEOUT_CAP_MS)
            .max(batch_timeout_ms);

        let seed_path = settings
            .get_string("catalog.seed_path")
            .ok()
            .or_else(|| env::var("CATALOG_SEED_PATH").ok());

        Ok(Config {
            bind_addr,
            batch_timeout_ms,
            batch_timeout_cap_ms,
            seed_path,
        })
    }

    /// Fixed configuration for tests; no files or environment involved.
    pub fn for_tests() -> Self {
        Self {
            bind_addr: "127.0.0.1:0".to_string(),
            batch_timeout_ms: DEFAULT_BATCH_TIMEOUT_MS,
            batch_timeout_cap_ms: DEFAULT_BATCH_TIMEOUT_CAP_MS,
            seed_path: None,
        }
    }
}
