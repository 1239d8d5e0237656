use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::layout::{default_page_config, PageConfig};

/// Application configuration loaded from environment variables.
/// Every variable is optional; unset values keep the A4 layout defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub page: PageConfig,
    /// Upper bound on waiting for the measurement provider before packing.
    pub measure_ready_timeout: Duration,
    /// Preview sessions unused for this long are evicted.
    pub preview_idle_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `from_env` passes the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut page = default_page_config();
        override_with(&lookup, "PAGE_WIDTH", &mut page.page_width)?;
        override_with(&lookup, "PAGE_HEIGHT", &mut page.page_height)?;
        override_with(&lookup, "PAGE_PADDING", &mut page.padding)?;
        override_with(&lookup, "SAFETY_MARGIN", &mut page.safety_margin)?;
        override_with(&lookup, "MAX_PREVIEW_ZOOM", &mut page.max_preview_zoom)?;
        override_with(
            &lookup,
            "KEEP_HEADER_WITH_FIRST_ITEM",
            &mut page.keep_header_with_first_item,
        )?;

        let fallback = &mut page.fallback;
        override_with(&lookup, "FALLBACK_PERSONAL_INFO", &mut fallback.personal_info)?;
        override_with(&lookup, "FALLBACK_SECTION_HEADER", &mut fallback.section_header)?;
        override_with(&lookup, "FALLBACK_WORK_ITEM", &mut fallback.work_item)?;
        override_with(&lookup, "FALLBACK_EDUCATION_ITEM", &mut fallback.education_item)?;
        override_with(&lookup, "FALLBACK_SKILLS_HEADER", &mut fallback.skills_header)?;
        override_with(&lookup, "FALLBACK_SKILLS_CONTENT", &mut fallback.skills_content)?;

        page.validate().context("Invalid page layout configuration")?;

        let mut ready_timeout_ms: u64 = 1000;
        override_with(&lookup, "MEASURE_READY_TIMEOUT_MS", &mut ready_timeout_ms)?;

        let mut idle_ttl_secs: u64 = 1800;
        override_with(&lookup, "PREVIEW_IDLE_TTL_SECS", &mut idle_ttl_secs)?;
        if idle_ttl_secs == 0 {
            anyhow::bail!("PREVIEW_IDLE_TTL_SECS must be greater than zero");
        }

        let mut port: u16 = 8080;
        override_with(&lookup, "PORT", &mut port)?;

        Ok(Config {
            port,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            page,
            measure_ready_timeout: Duration::from_millis(ready_timeout_ms),
            preview_idle_ttl: Duration::from_secs(idle_ttl_secs),
        })
    }
}

fn override_with<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, target: &mut T) -> Result<()>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if let Some(raw) = lookup(key) {
        *target = raw
            .trim()
            .parse()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'"))?;
    }
    Ok(())
}
