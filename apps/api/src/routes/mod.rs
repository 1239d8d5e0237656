pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::export::handlers as export;
use crate::layout::handlers as layout;
use crate::preview::handlers as preview;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Layout API
        .route("/api/v1/layout", get(layout::handle_get_layout))
        .route("/api/v1/paginate", post(layout::handle_paginate))
        // Export API
        .route("/api/v1/export/pdf", post(export::handle_export_pdf))
        .route("/api/v1/export/json", post(export::handle_export_json))
        // Preview sessions
        .route("/api/v1/previews", post(preview::handle_create_preview))
        .route(
            "/api/v1/previews/:id",
            get(preview::handle_get_preview).delete(preview::handle_delete_preview),
        )
        .route(
            "/api/v1/previews/:id/document",
            put(preview::handle_update_document),
        )
        .route(
            "/api/v1/previews/:id/navigate",
            post(preview::handle_navigate),
        )
        .route(
            "/api/v1/previews/:id/export",
            post(preview::handle_export_preview),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::layout::TextMetricsProvider;

    fn app() -> Router {
        let config = Config::from_lookup(|_| None).unwrap();
        let state = AppState::new(&config, Arc::new(TextMetricsProvider::default())).unwrap();
        build_router(state)
    }

    fn document() -> Value {
        json!({
            "title": "Ada Lovelace",
            "personalInfo": {
                "fullName": "Ada Lovelace",
                "email": "ada@example.com"
            },
            "workExperience": [{
                "companyName": "Analytical Engines Ltd",
                "position": "Engineer",
                "startDate": "2020-01-01",
                "current": true,
                "description": "<p>Wrote the <b>first</b> algorithm</p>",
                "order": 0
            }],
            "skills": [{ "name": "Rust", "category": "Technical", "order": 0 }]
        })
    }

    fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_layout_reports_budget() {
        let response = app()
            .oneshot(Request::get("/api/v1/layout").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["safe_content_height"], 977.0);
        assert_eq!(body["page"]["fallback"]["work_item"], 100.0);
    }

    #[tokio::test]
    async fn test_paginate() {
        let response = app()
            .oneshot(json_request(Method::POST, "/api/v1/paginate", &document()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let pages = body["pages"].as_array().unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0]["blocks"][0]["block"]["type"], "personal_info");
    }

    #[tokio::test]
    async fn test_export_json_strips_markup() {
        let response = app()
            .oneshot(json_request(Method::POST, "/api/v1/export/json", &document()))
            .await
            .unwrap();
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"ada_lovelace.json\""
        );
        let body = body_json(response).await;
        assert_eq!(
            body["workExperience"][0]["description"],
            "Wrote the first algorithm"
        );
    }

    #[tokio::test]
    async fn test_export_pdf() {
        let request = json!({ "document": document(), "filename": "My CV" });
        let response = app()
            .oneshot(json_request(Method::POST, "/api/v1/export/pdf", &request))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"my_cv.pdf\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_export_empty_document_is_unprocessable() {
        let request = json!({ "document": { "title": "Empty" } });
        let response = app()
            .oneshot(json_request(Method::POST, "/api/v1/export/pdf", &request))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body_json(response).await["error"]["code"],
            "UNPROCESSABLE_ENTITY"
        );
    }

    #[tokio::test]
    async fn test_preview_session_flow() {
        let app = app();

        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/api/v1/previews", &document()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["label"], "Page 1 of 1");

        let response = app
            .clone()
            .oneshot(
                Request::get(format!("/api/v1/previews/{id}?container_width=834"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let view = body_json(response).await;
        assert_eq!(view["scale"], 1.0);

        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                &format!("/api/v1/previews/{id}/navigate"),
                &json!({ "action": "next" }),
            ))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["current_page"], 0);

        let response = app
            .clone()
            .oneshot(
                Request::delete(format!("/api/v1/previews/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(
                Request::get(format!("/api/v1/previews/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
