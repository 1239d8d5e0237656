//! In-memory registry of preview sessions.
//!
//! The write lock is never held across a pack: a document update takes a ticket under
//! the lock, packs without it, then re-acquires it to apply the result. Concurrent
//! updates of one session therefore race freely and the latest revision wins.
//!
//! Sessions unused for longer than the idle TTL are evicted, on every `create` and by
//! the periodic sweeper started in `main`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::export::{export_filename, export_pdf, PdfOptions};
use crate::layout::PaginationEngine;
use crate::models::ResumeDocument;
use crate::preview::navigator::NavAction;
use crate::preview::session::{PreviewSession, PreviewView};

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Preview {id} not found"))
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, PreviewSession>>>,
    idle_ttl: Duration,
}

impl SessionStore {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            idle_ttl,
        }
    }

    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops every idle session. Returns how many were removed.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_idle(self.idle_ttl));
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(evicted, remaining = sessions.len(), "Evicted idle previews");
        }
        evicted
    }

    /// Creates a session and paginates its first document.
    pub async fn create(
        &self,
        document: ResumeDocument,
        engine: &PaginationEngine,
    ) -> Result<PreviewView, AppError> {
        self.evict_idle().await;

        let mut session = PreviewSession::new(document.clone(), engine.config());
        let ticket = session.ticket();
        let pagination = engine
            .paginate(document, session.measurement_cache())
            .await?;
        session.complete(ticket, pagination);

        let view = session.view(None, engine.config());
        info!(preview = %view.id, pages = view.page_count, "Preview created");
        self.sessions.write().await.insert(session.id(), session);
        Ok(view)
    }

    pub async fn view(
        &self,
        id: Uuid,
        container_width: Option<f32>,
        engine: &PaginationEngine,
    ) -> Result<PreviewView, AppError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
        session.touch();
        Ok(session.view(container_width, engine.config()))
    }

    /// Replaces the document and repaginates. If a newer update lands while this one
    /// is packing, this result is dropped and the view reflects the newer state.
    pub async fn update_document(
        &self,
        id: Uuid,
        document: ResumeDocument,
        engine: &PaginationEngine,
    ) -> Result<PreviewView, AppError> {
        let (ticket, cache) = {
            let mut sessions = self.sessions.write().await;
            let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
            session.touch();
            (session.submit(document.clone()), session.measurement_cache())
        };

        let pagination = engine.paginate(document, cache).await?;

        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
        session.complete(ticket, pagination);
        Ok(session.view(None, engine.config()))
    }

    pub async fn navigate(
        &self,
        id: Uuid,
        action: NavAction,
        engine: &PaginationEngine,
    ) -> Result<PreviewView, AppError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
        session.touch();
        session.navigate(action);
        Ok(session.view(None, engine.config()))
    }

    /// Exports every page of the session's current pagination.
    ///
    /// Export mode is switched on for the duration and always switched off again,
    /// whether or not rendering succeeded. Returns the filename and the PDF bytes.
    pub async fn export(
        &self,
        id: Uuid,
        engine: &PaginationEngine,
    ) -> Result<(String, Vec<u8>), AppError> {
        let (pages, title) = {
            let mut sessions = self.sessions.write().await;
            let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
            session.touch();
            session.begin_export();
            (
                session.visible_pages().to_vec(),
                session.document().title.clone(),
            )
        };

        let options = PdfOptions {
            title: title.clone(),
            ..PdfOptions::default()
        };
        let result = export_pdf(pages, engine.config().clone(), options).await;

        if let Some(session) = self.sessions.write().await.get_mut(&id) {
            session.end_export();
            session.touch();
        }

        let bytes = result?;
        Ok((export_filename(Some(&title), "pdf"), bytes))
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| info!(preview = %id, "Preview closed"))
            .ok_or_else(|| not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::block::fixtures::{personal, work};
    use crate::layout::page_config::default_page_config;
    use crate::layout::TextMetricsProvider;

    fn engine() -> PaginationEngine {
        PaginationEngine::new(
            Arc::new(TextMetricsProvider::default()),
            default_page_config(),
            Duration::from_millis(10),
        )
        .unwrap()
    }

    fn store() -> SessionStore {
        SessionStore::new(Duration::from_secs(600))
    }

    fn document(items: usize) -> ResumeDocument {
        let mut doc = ResumeDocument::default();
        doc.title = "Ada Lovelace".to_string();
        doc.personal_info = Some(personal());
        doc.work_experience = (0..items).map(|i| work("Engineer", i as i32)).collect();
        doc
    }

    #[tokio::test]
    async fn test_create_update_navigate() {
        let engine = engine();
        let store = store();

        let view = store.create(document(1), &engine).await.unwrap();
        assert_eq!(view.page_count, 1);
        assert_eq!(view.applied_revision, Some(0));

        let view = store.update_document(view.id, document(30), &engine).await.unwrap();
        assert!(view.page_count > 1);
        assert_eq!(view.applied_revision, Some(1));

        let view = store.navigate(view.id, NavAction::Last, &engine).await.unwrap();
        assert_eq!(view.current_page + 1, view.page_count);
        assert_eq!(view.pages.len(), 1);
    }

    #[tokio::test]
    async fn test_export_resets_export_mode() {
        let engine = engine();
        let store = store();
        let view = store.create(document(30), &engine).await.unwrap();

        let (filename, bytes) = store.export(view.id, &engine).await.unwrap();
        assert_eq!(filename, "ada_lovelace.pdf");
        let loaded = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(loaded.get_pages().len(), view.page_count);

        let after = store.view(view.id, None, &engine).await.unwrap();
        assert!(!after.export_mode);
    }

    #[tokio::test]
    async fn test_failed_export_resets_export_mode() {
        let engine = engine();
        let store = store();
        let view = store.create(ResumeDocument::default(), &engine).await.unwrap();

        let result = store.export(view.id, &engine).await;
        assert!(matches!(result, Err(AppError::UnprocessableEntity(_))));
        assert!(!store.view(view.id, None, &engine).await.unwrap().export_mode);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let engine = engine();
        let store = store();
        let id = Uuid::new_v4();
        assert!(matches!(
            store.view(id, None, &engine).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(store.remove(id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove() {
        let engine = engine();
        let store = store();
        let view = store.create(document(1), &engine).await.unwrap();
        assert_eq!(store.len().await, 1);
        store.remove(view.id).await.unwrap();
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_are_evicted() {
        let engine = engine();
        let store = store();
        let stale = store.create(document(1), &engine).await.unwrap();

        tokio::time::advance(Duration::from_secs(500)).await;
        let fresh = store.create(document(1), &engine).await.unwrap();
        assert_eq!(store.len().await, 2);

        tokio::time::advance(Duration::from_secs(200)).await;
        assert_eq!(store.evict_idle().await, 1);
        assert!(matches!(
            store.view(stale.id, None, &engine).await,
            Err(AppError::NotFound(_))
        ));
        assert!(store.view(fresh.id, None, &engine).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_sweeps_idle_sessions() {
        let engine = engine();
        let store = store();
        let kept = store.create(document(1), &engine).await.unwrap();
        store.create(document(1), &engine).await.unwrap();

        tokio::time::advance(Duration::from_secs(400)).await;
        store.navigate(kept.id, NavAction::First, &engine).await.unwrap();

        tokio::time::advance(Duration::from_secs(400)).await;
        store.create(document(1), &engine).await.unwrap();
        assert_eq!(store.len().await, 2);
        assert!(store.view(kept.id, None, &engine).await.is_ok());
    }
}
