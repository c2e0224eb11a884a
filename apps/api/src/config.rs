use std::ops::RangeInclusive;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::insights::prompts::MarketProfile;
use crate::insights::retry::{RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS};
use crate::insights::service::DEFAULT_REFRESH_DAYS;

/// Accepted values for `INSIGHT_REFRESH_DAYS`. Ten years is far beyond any
/// useful refresh cadence and keeps `now + interval` representable.
const REFRESH_DAYS_RANGE: RangeInclusive<i64> = 1..=3650;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub gemini_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub app_env: String,
    pub retry_policy: RetryPolicy,
    pub refresh_days: i64,
    pub market: MarketProfile,
    /// Shared secret the gateway sends in `X-Gateway-Secret`. Unchecked when unset.
    pub gateway_secret: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = MarketProfile::default();
        let market = MarketProfile {
            region: std::env::var("INSIGHT_REGION").unwrap_or(defaults.region),
            currency: std::env::var("INSIGHT_CURRENCY").unwrap_or(defaults.currency),
            locations: std::env::var("INSIGHT_LOCATIONS")
                .ok()
                .map(|raw| parse_locations(&raw))
                .filter(|l| !l.is_empty())
                .unwrap_or(defaults.locations),
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            app_env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            retry_policy: RetryPolicy {
                max_attempts: parse_env("INSIGHT_MAX_RETRIES", DEFAULT_MAX_ATTEMPTS)?,
                base_delay: Duration::from_millis(parse_env(
                    "INSIGHT_BASE_DELAY_MS",
                    DEFAULT_BASE_DELAY.as_millis() as u64,
                )?),
            },
            refresh_days: validate_refresh_days(parse_env(
                "INSIGHT_REFRESH_DAYS",
                DEFAULT_REFRESH_DAYS,
            )?)?,
            market,
            gateway_secret: std::env::var("GATEWAY_SECRET")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        })
    }

    pub fn refresh_interval(&self) -> chrono::Duration {
        chrono::Duration::days(self.refresh_days)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn validate_refresh_days(days: i64) -> Result<i64> {
    if !REFRESH_DAYS_RANGE.contains(&days) {
        bail!(
            "INSIGHT_REFRESH_DAYS must be between {} and {} days, got {days}",
            REFRESH_DAYS_RANGE.start(),
            REFRESH_DAYS_RANGE.end()
        );
    }
    Ok(days)
}

/// Splits a comma-separated city list. "Remote" is implicit and dropped here.
fn parse_locations(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("remote"))
        .map(String::from)
        .collect()
}
