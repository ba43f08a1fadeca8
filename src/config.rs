use std::{env, time::Duration};

/// AppConfig
///
/// Immutable configuration, loaded once at startup and shared through `AppState`.
#[derive(Clone)]
pub struct AppConfig {
    // Postgres connection string for the profile directory. Optional only in local mode,
    // where an empty in-memory directory is used instead.
    pub db_url: Option<String>,
    // Runtime environment marker. Controls the dev bypass header and log format.
    pub env: Env,
    // Secret used to validate session JWTs.
    pub jwt_secret: String,
    // Where the navigation enforcer sends sessions that land on a forbidden route.
    pub landing_route: String,
    // Upper bound on how long the full-screen loader is shown.
    pub loading_max: Duration,
    // Tabs with no activity for this long are dropped from the registry.
    pub tab_idle_ttl: Duration,
    pub bind_addr: String,
}

/// Env
///
/// Runtime context: local development or hardened production.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

pub const DEFAULT_LANDING_ROUTE: &str = "/dashboard";
pub const DEFAULT_LOADING_MAX_MS: u64 = 5_000;
pub const DEFAULT_TAB_IDLE_TTL_SECS: u64 = 30 * 60;

impl Default for AppConfig {
    /// default
    ///
    /// Safe, non-panicking values for test state setup.
    fn default() -> Self {
        Self {
            db_url: None,
            env: Env::Local,
            jwt_secret: "super-secure-test-secret-value-local".to_string(),
            landing_route: DEFAULT_LANDING_ROUTE.to_string(),
            loading_max: Duration::from_millis(DEFAULT_LOADING_MAX_MS),
            tab_idle_ttl: Duration::from_secs(DEFAULT_TAB_IDLE_TTL_SECS),
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads configuration from the environment.
    ///
    /// # Panics
    /// In production, panics if `DATABASE_URL` or `SUPABASE_JWT_SECRET` is missing, so the
    /// service never starts with an incomplete or insecure configuration.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let (db_url, jwt_secret) = match env {
            Env::Production => (
                Some(env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in prod")),
                env::var("SUPABASE_JWT_SECRET")
                    .expect("FATAL: SUPABASE_JWT_SECRET must be set in production."),
            ),
            Env::Local => (
                env::var("DATABASE_URL").ok(),
                env::var("SUPABASE_JWT_SECRET")
                    .unwrap_or_else(|_| "super-secure-test-secret-value-local".to_string()),
            ),
        };

        Self {
            db_url,
            env,
            jwt_secret,
            landing_route: env::var("LANDING_ROUTE")
                .unwrap_or_else(|_| DEFAULT_LANDING_ROUTE.to_string()),
            loading_max: Duration::from_millis(parse_or("LOADING_MAX_MS", DEFAULT_LOADING_MAX_MS)),
            tab_idle_ttl: Duration::from_secs(parse_or(
                "TAB_IDLE_TTL_SECS",
                DEFAULT_TAB_IDLE_TTL_SECS,
            )),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
        }
    }
}

// Unset or unparsable values fall back to the default.
fn parse_or(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
