//! Async entry point for pagination.
//!
//! - Awaits the provider's readiness signal (bounded by the configured timeout).
//! - Runs measurement and packing inside `tokio::task::spawn_blocking`; both are
//!   CPU-bound and take owned snapshots so the closure is `'static`.
//! - The measurement cache is shared behind a mutex. Concurrent packs of different
//!   revisions may share it because entries are keyed by content fingerprint.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::{info, warn};

use crate::errors::AppError;
use crate::layout::measure::{wait_until_ready, MeasurementCache, MeasurementProvider, Measurer};
use crate::layout::packer::{pack, PackOptions, Pagination};
use crate::layout::page_config::PageConfig;
use crate::models::ResumeDocument;

pub type SharedCache = Arc<Mutex<MeasurementCache>>;

#[derive(Clone)]
pub struct PaginationEngine {
    provider: Arc<dyn MeasurementProvider>,
    config: Arc<PageConfig>,
    ready_timeout: Duration,
}

impl PaginationEngine {
    pub fn new(
        provider: Arc<dyn MeasurementProvider>,
        config: PageConfig,
        ready_timeout: Duration,
    ) -> Result<Self, AppError> {
        config.validate()?;
        Ok(Self {
            provider,
            config: Arc::new(config),
            ready_timeout,
        })
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    /// Paginates one document snapshot.
    pub async fn paginate(
        &self,
        document: ResumeDocument,
        cache: SharedCache,
    ) -> Result<Pagination, AppError> {
        if !wait_until_ready(self.provider.as_ref(), self.ready_timeout).await {
            warn!("Packing without a ready measurement provider; fallback heights apply");
        }

        let options = PackOptions::from_config(&self.config)?;
        let provider = Arc::clone(&self.provider);
        let config = Arc::clone(&self.config);

        let pagination = tokio::task::spawn_blocking(move || {
            let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
            let mut measurer = Measurer::new(provider.as_ref(), &config, &mut cache);
            pack(&document, &options, &mut measurer)
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in pagination: {e}")))?;

        info!(
            pages = pagination.page_count(),
            warnings = pagination.warnings.len(),
            "Document paginated"
        );
        Ok(pagination)
    }

    /// Paginates with a throwaway cache.
    pub async fn paginate_once(&self, document: ResumeDocument) -> Result<Pagination, AppError> {
        self.paginate(document, SharedCache::default()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::block::fixtures::{education, personal, work};
    use crate::layout::block::{BlockKey, Section};
    use crate::layout::measure::FixedHeights;
    use crate::layout::page_config::default_page_config;
    use crate::layout::text_metrics::TextMetricsProvider;

    fn engine(provider: impl MeasurementProvider + 'static) -> PaginationEngine {
        PaginationEngine::new(
            Arc::new(provider),
            default_page_config(),
            Duration::from_millis(10),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_paginate_empty_document() {
        let pagination = engine(TextMetricsProvider::default())
            .paginate_once(ResumeDocument::default())
            .await
            .unwrap();
        assert!(pagination.pages.is_empty());
    }

    #[tokio::test]
    async fn test_paginate_uses_reported_heights() {
        let mut doc = ResumeDocument::default();
        doc.personal_info = Some(personal());
        doc.work_experience = vec![work("Engineer", 0)];
        doc.education = vec![education("BSc", 0)];

        let provider = FixedHeights::default()
            .with(BlockKey::PersonalInfo, 500.0)
            .with(BlockKey::SectionHeader { section: Section::Work }, 40.0)
            .with(BlockKey::WorkItem { index: 0 }, 300.0)
            .with(BlockKey::SectionHeader { section: Section::Education }, 40.0)
            .with(BlockKey::EducationItem { index: 0 }, 200.0);

        let pagination = engine(provider).paginate_once(doc).await.unwrap();
        assert_eq!(pagination.page_count(), 2);
        assert!(pagination.warnings.is_empty());
        assert_eq!(
            pagination.pages[1].keys(),
            vec![
                BlockKey::SectionHeader { section: Section::Education },
                BlockKey::EducationItem { index: 0 },
            ]
        );
    }

    #[tokio::test]
    async fn test_shared_cache_is_populated() {
        let mut doc = ResumeDocument::default();
        doc.work_experience = vec![work("Engineer", 0)];
        let cache = SharedCache::default();
        engine(TextMetricsProvider::default())
            .paginate(doc, Arc::clone(&cache))
            .await
            .unwrap();
        assert_eq!(cache.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = default_page_config();
        config.page_height = 10.0;
        let result = PaginationEngine::new(
            Arc::new(TextMetricsProvider::default()),
            config,
            Duration::from_millis(10),
        );
        assert!(result.is_err());
    }
}
