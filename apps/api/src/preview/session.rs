//! One live preview of a resume being edited.
//!
//! Every document change bumps the revision and hands out a `PackTicket`. A pack
//! result is applied only if its ticket still matches the latest revision, so a slow
//! pack of an older snapshot can never overwrite a newer layout.
//!
//! While an export is in progress every page is visible; otherwise only the page the
//! navigator points at. Exports nest: the session leaves export mode when the last
//! one ends.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::layout::packer::PackWarning;
use crate::layout::{Page, PageConfig, Pagination, SharedCache};
use crate::models::ResumeDocument;
use crate::preview::navigator::{NavAction, PageNavigator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackTicket {
    pub revision: u64,
}

pub struct PreviewSession {
    id: Uuid,
    document: ResumeDocument,
    revision: u64,
    applied_revision: Option<u64>,
    pagination: Pagination,
    navigator: PageNavigator,
    cache: SharedCache,
    export_depth: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_seen: Instant,
}

impl PreviewSession {
    pub fn new(document: ResumeDocument, config: &PageConfig) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            document,
            revision: 0,
            applied_revision: None,
            pagination: Pagination {
                pages: Vec::new(),
                budget: config.safe_content_height(),
                warnings: Vec::new(),
            },
            navigator: PageNavigator::default(),
            cache: SharedCache::default(),
            export_depth: 0,
            created_at: now,
            updated_at: now,
            last_seen: Instant::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn document(&self) -> &ResumeDocument {
        &self.document
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn measurement_cache(&self) -> SharedCache {
        Arc::clone(&self.cache)
    }

    /// Ticket for packing the current document, without changing it.
    pub fn ticket(&self) -> PackTicket {
        PackTicket {
            revision: self.revision,
        }
    }

    /// Replaces the document and returns the ticket its pack must present.
    pub fn submit(&mut self, document: ResumeDocument) -> PackTicket {
        self.document = document;
        self.revision += 1;
        self.updated_at = Utc::now();
        self.ticket()
    }

    /// Applies a finished pack. Returns false, leaving the session untouched, when a
    /// newer document was submitted after the ticket was issued.
    pub fn complete(&mut self, ticket: PackTicket, pagination: Pagination) -> bool {
        if ticket.revision != self.revision {
            debug!(
                session = %self.id,
                stale = ticket.revision,
                latest = self.revision,
                "Discarding stale pagination"
            );
            return false;
        }
        self.navigator.on_repaginate(pagination.page_count());
        self.pagination = pagination;
        self.applied_revision = Some(ticket.revision);
        self.updated_at = Utc::now();
        true
    }

    pub fn navigate(&mut self, action: NavAction) {
        self.navigator.apply(action);
    }

    /// Marks the session as used now.
    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    /// True when the session was last used more than `ttl` ago and no export is running.
    pub fn is_idle(&self, ttl: Duration) -> bool {
        self.export_depth == 0 && self.last_seen.elapsed() > ttl
    }

    pub fn begin_export(&mut self) {
        self.export_depth += 1;
    }

    pub fn end_export(&mut self) {
        self.export_depth = self.export_depth.saturating_sub(1);
    }

    pub fn is_exporting(&self) -> bool {
        self.export_depth > 0
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.pagination.pages.get(self.navigator.current())
    }

    pub fn visible_pages(&self) -> &[Page] {
        if self.is_exporting() {
            return &self.pagination.pages;
        }
        match self.current_page() {
            Some(page) => std::slice::from_ref(page),
            None => &[],
        }
    }

    pub fn view(&self, container_width: Option<f32>, config: &PageConfig) -> PreviewView {
        PreviewView {
            id: self.id,
            revision: self.revision,
            applied_revision: self.applied_revision,
            page_count: self.navigator.page_count(),
            current_page: self.navigator.current(),
            label: self.navigator.label(),
            can_go_back: self.navigator.can_go_back(),
            can_go_forward: self.navigator.can_go_forward(),
            export_mode: self.is_exporting(),
            scale: container_width.map(|w| fit_scale(w, config)),
            pages: self.visible_pages().to_vec(),
            warnings: self.pagination.warnings.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Serializable snapshot of a preview for the HTTP layer.
#[derive(Debug, Clone, Serialize)]
pub struct PreviewView {
    pub id: Uuid,
    pub revision: u64,
    /// Revision whose pagination is shown; `None` until the first pack lands.
    pub applied_revision: Option<u64>,
    pub page_count: usize,
    /// Zero-based.
    pub current_page: usize,
    pub label: String,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub export_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    pub pages: Vec<Page>,
    pub warnings: Vec<PackWarning>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Zoom that fits one page into a container, capped at the configured maximum.
pub fn fit_scale(container_width: f32, config: &PageConfig) -> f32 {
    let available = (container_width - config.preview_gutter).max(0.0);
    (available / config.page_width).min(config.max_preview_zoom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::block::fixtures::work;
    use crate::layout::block::BlockKey;
    use crate::layout::measure::{FixedHeights, MeasurementCache, Measurer};
    use crate::layout::packer::{pack, PackOptions};
    use crate::layout::page_config::default_page_config;

    fn paginate(doc: &ResumeDocument, item_height: f32) -> Pagination {
        let config = default_page_config();
        let mut provider = FixedHeights::default();
        for index in 0..doc.work_experience.len() {
            provider = provider.with(BlockKey::WorkItem { index }, item_height);
        }
        let mut cache = MeasurementCache::new();
        let mut measurer = Measurer::new(&provider, &config, &mut cache);
        pack(doc, &PackOptions::from_config(&config).unwrap(), &mut measurer)
    }

    fn doc_with(items: usize) -> ResumeDocument {
        let mut doc = ResumeDocument::default();
        doc.work_experience = (0..items).map(|i| work("Engineer", i as i32)).collect();
        doc
    }

    #[test]
    fn test_stale_pack_is_discarded() {
        let config = default_page_config();
        let mut session = PreviewSession::new(ResumeDocument::default(), &config);

        let old = session.submit(doc_with(1));
        let new = session.submit(doc_with(6));

        assert!(session.complete(new, paginate(&doc_with(6), 400.0)));
        let pages = session.pagination().page_count();
        assert!(pages > 1);

        assert!(!session.complete(old, paginate(&doc_with(1), 400.0)));
        assert_eq!(session.pagination().page_count(), pages);
        assert_eq!(session.view(None, &config).applied_revision, Some(2));
    }

    #[test]
    fn test_visible_pages_follow_mode() {
        let config = default_page_config();
        let mut session = PreviewSession::new(ResumeDocument::default(), &config);
        let doc = doc_with(6);
        let ticket = session.submit(doc.clone());
        session.complete(ticket, paginate(&doc, 400.0));

        assert_eq!(session.visible_pages().len(), 1);
        session.navigate(NavAction::Last);
        assert_eq!(
            session.visible_pages()[0].number,
            session.pagination().page_count()
        );

        session.begin_export();
        assert_eq!(
            session.visible_pages().len(),
            session.pagination().page_count()
        );
        session.end_export();
        assert_eq!(session.visible_pages().len(), 1);
    }

    #[test]
    fn test_overlapping_exports_keep_export_mode() {
        let config = default_page_config();
        let mut session = PreviewSession::new(ResumeDocument::default(), &config);
        let doc = doc_with(6);
        let ticket = session.submit(doc.clone());
        session.complete(ticket, paginate(&doc, 400.0));
        let pages = session.pagination().page_count();

        session.begin_export();
        session.begin_export();
        session.end_export();
        assert!(session.view(None, &config).export_mode);
        assert_eq!(session.visible_pages().len(), pages);

        session.end_export();
        assert!(!session.view(None, &config).export_mode);
        assert_eq!(session.visible_pages().len(), 1);

        session.end_export();
        assert!(!session.is_exporting());
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_after_ttl() {
        let ttl = Duration::from_secs(60);
        let mut session = PreviewSession::new(ResumeDocument::default(), &default_page_config());
        assert!(!session.is_idle(ttl));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(session.is_idle(ttl));

        session.touch();
        assert!(!session.is_idle(ttl));

        tokio::time::advance(Duration::from_secs(61)).await;
        session.begin_export();
        assert!(!session.is_idle(ttl));
    }

    #[test]
    fn test_repagination_resets_navigator() {
        let config = default_page_config();
        let mut session = PreviewSession::new(ResumeDocument::default(), &config);
        let long = doc_with(6);
        let ticket = session.submit(long.clone());
        session.complete(ticket, paginate(&long, 400.0));
        session.navigate(NavAction::Last);

        let short = doc_with(1);
        let ticket = session.submit(short.clone());
        session.complete(ticket, paginate(&short, 400.0));
        assert_eq!(session.current_page().map(|p| p.number), Some(1));
    }

    #[test]
    fn test_empty_session_shows_nothing() {
        let config = default_page_config();
        let session = PreviewSession::new(ResumeDocument::default(), &config);
        assert!(session.visible_pages().is_empty());
        assert!(session.current_page().is_none());
        assert_eq!(session.view(None, &config).label, "");
    }

    #[test]
    fn test_fit_scale() {
        let config = default_page_config();
        assert!((fit_scale(834.0, &config) - 1.0).abs() < 1e-6);
        assert_eq!(fit_scale(5000.0, &config), 1.2);
        assert_eq!(fit_scale(10.0, &config), 0.0);
    }
}
