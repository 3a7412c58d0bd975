use std::env;
use std::time::Duration;

use crate::modules::integrations::CatalogueConfig;
use crate::services::{EnrichmentOptions, RateLimitPolicy};

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub catalogue: CatalogueConfig,
    pub enrich_delay: Duration,
    pub availability_limit: u32,
    pub on_rate_limit: RateLimitPolicy,
}

impl Config {
    pub fn from_env() -> Self {
        let catalogue = CatalogueConfig {
            base_url: required("CATALOGUE_API_URL"),
            api_key: required("CATALOGUE_API_KEY"),
            app_code: required("CATALOGUE_APP_CODE"),
            search_limit: parsed("SEARCH_LIMIT", 20),
        };

        let on_rate_limit = match env::var("ON_RATE_LIMIT")
            .unwrap_or_default()
            .trim()
            .to_lowercase()
            .as_str()
        {
            "pause" => RateLimitPolicy::PauseAndResume {
                pause: Duration::from_millis(parsed("RATE_LIMIT_PAUSE_MS", 60_000)),
                max_pauses: parsed("RATE_LIMIT_MAX_PAUSES", 3),
            },
            "" | "abort" => RateLimitPolicy::Abort,
            other => {
                tracing::warn!("Unknown ON_RATE_LIMIT value '{}', using abort", other);
                RateLimitPolicy::Abort
            }
        };

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://book_hound.db?mode=rwc".to_string()),
            port: parsed("PORT", 8000),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(Vec::new),
            catalogue,
            enrich_delay: Duration::from_millis(parsed("ENRICH_DELAY_MS", 5_000)),
            availability_limit: parsed("AVAILABILITY_LIMIT", 50),
            on_rate_limit,
        }
    }

    /// Same delay between catalogue calls and after each book
    pub fn enrichment_options(&self) -> EnrichmentOptions {
        EnrichmentOptions {
            availability_limit: self.availability_limit,
            call_interval: self.enrich_delay,
            item_delay: self.enrich_delay,
            on_rate_limit: self.on_rate_limit,
        }
    }
}

// Missing catalogue settings are not fatal; requests then fail with HTTP errors.
fn required(key: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => {
            tracing::warn!("{} is not set; catalogue requests will fail", key);
            String::new()
        }
    }
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
