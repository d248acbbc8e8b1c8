//! # API REST
//!
//! REST surface for the NexusBio site.
//!
//! Handles:
//! - resolved stories, global settings and page metadata for the renderer
//! - the sitemap and robots file
//! - contact form submissions, CMS webhooks and the draft-preview entry point
//! - OpenAPI documentation and CORS
//!
//! Content always comes through `nexus-gateway`; nothing here talks to the CMS directly.

#![warn(rust_2018_idioms)]

pub mod config;
pub mod contact;
pub mod draft;
pub mod sitemap;
pub mod stories;
pub mod webhook;

#[cfg(test)]
mod test_support;

pub use config::{RestConfig, RestConfigError, WorkflowStage, WorkflowStageMap};
pub use contact::ContactThrottle;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use nexus_gateway::ContentService;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};

/// Shared state for every request handler.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<RestConfig>,
    pub content: ContentService,
    pub contact_throttle: Arc<ContactThrottle>,
}

impl AppState {
    pub fn new(cfg: RestConfig, content: ContentService) -> Self {
        Self {
            cfg: Arc::new(cfg),
            content,
            contact_throttle: Arc::new(ContactThrottle::default()),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        stories::get_story,
        stories::get_settings,
        sitemap::sitemap_xml,
        sitemap::robots_txt,
        contact::submit_contact,
        webhook::storyblok_webhook,
        draft::enter_draft,
    ),
    components(schemas(
        HealthRes,
        FailureRes,
        stories::StoryRes,
        stories::SettingsRes,
        stories::PageMetadata,
        stories::ErrorRes,
        contact::ContactReq,
        contact::ContactRes,
        webhook::WebhookAck,
        webhook::WorkflowRes,
        webhook::WorkflowData,
        webhook::ResponseMeta,
    ))
)]
pub struct ApiDoc;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// `{ success: false, error }` body shared by the form and webhook endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct FailureRes {
    pub success: bool,
    pub error: String,
}

pub(crate) fn failure(status: StatusCode, error: &str) -> (StatusCode, Json<FailureRes>) {
    (
        status,
        Json(FailureRes {
            success: false,
            error: error.to_string(),
        }),
    )
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stories/*slug", get(stories::get_story))
        .route("/settings", get(stories::get_settings))
        .route("/sitemap.xml", get(sitemap::sitemap_xml))
        .route("/robots.txt", get(sitemap::robots_txt))
        .route("/api/contact", post(contact::submit_contact))
        .route("/api/webhooks/storyblok", post(webhook::storyblok_webhook))
        .route("/api/draft", get(draft::enter_draft))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint used by monitoring and load balancers.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "NexusBio REST API is alive".into(),
    })
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
