//! A local fake CMS and a router wired to it.

use crate::config::{RestConfig, WorkflowStage, WorkflowStageMap};
use crate::{router, AppState};
use axum::body::to_bytes;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use nexus_gateway::{ContentService, GatewayConfig};
use nexus_schema::FallbackPolicy;
use serde_json::{json, Value};
use std::time::Duration;

pub(crate) const WEBHOOK_SECRET: &str = "webhook-secret";
pub(crate) const PREVIEW_SECRET: &str = "preview-secret";

fn richtext(text: &str) -> Value {
    json!({ "type": "doc", "content": [{ "type": "paragraph", "content": [{ "type": "text", "text": text }] }] })
}

pub(crate) fn page_story(slug: &str, with_disclaimer: bool) -> Value {
    let mut hero = json!({
        "_uid": "hero",
        "component": "hero_section",
        "headline": "Transforming Cancer Care",
        "subheadline": "Precision therapies.",
        "cta_link": { "url": "#data" }
    });
    if with_disclaimer {
        hero["legal_disclaimer"] = richtext("Forward-looking statements involve risk.");
    }
    json!({
        "id": 7,
        "uuid": "4b0c8a2e-1d3f-4e5a-9b6c-7d8e9f0a1b2c",
        "name": slug,
        "slug": slug,
        "full_slug": slug,
        "created_at": "2025-01-10T09:00:00.000Z",
        "published_at": "2025-01-15T10:30:00.000Z",
        "first_published_at": null,
        "content": {
            "_uid": "root",
            "component": "page",
            "seo_title": "NexusBio Pipeline",
            "seo_description": "Oncology therapeutics",
            "og_image": { "filename": "https://a.storyblok.com/f/1/og.png", "alt": "NexusBio" },
            "body": [hero]
        }
    })
}

async fn cms_story(Path(slug): Path<String>) -> Result<Json<Value>, StatusCode> {
    let story = match slug.as_str() {
        "home" | "pipeline" => page_story(&slug, true),
        "no-disclaimer" => page_story("no-disclaimer", false),
        "carousel" => {
            json!({ "full_slug": "carousel", "content": { "_uid": "c", "component": "carousel" } })
        }
        "settings" => json!({
            "full_slug": "settings",
            "content": {
                "_uid": "settings",
                "component": "global_settings",
                "copyright": "© 2025 NexusBio"
            }
        }),
        "broken" => return Err(StatusCode::INTERNAL_SERVER_ERROR),
        _ => return Err(StatusCode::NOT_FOUND),
    };
    Ok(Json(json!({ "story": story })))
}

async fn cms_listing() -> Json<Value> {
    Json(json!({
        "stories": [
            { "id": 1, "name": "Home", "slug": "home", "full_slug": "home", "published_at": "2025-01-15T10:30:00.000Z" },
            { "id": 2, "name": "Pipeline", "slug": "pipeline", "full_slug": "pipeline", "published_at": "2025-02-01T08:00:00.000Z" },
            { "id": 3, "name": "Settings", "slug": "settings-legacy", "full_slug": "settings-legacy", "published_at": null },
            { "id": 4, "name": "Investors", "slug": "investors", "full_slug": "about/investors", "published_at": null }
        ]
    }))
}

/// Serves the fake CMS on an ephemeral port and returns its base URL.
pub(crate) async fn fake_cms() -> String {
    let app = Router::new()
        .route("/cdn/stories", get(cms_listing))
        .route("/cdn/stories/*slug", get(cms_story));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    format!("http://{addr}")
}

/// A base URL nothing is listening on.
pub(crate) async fn unreachable_cms() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    drop(listener);
    format!("http://{addr}")
}

pub(crate) fn state_for(cms_base_url: &str, policy: FallbackPolicy) -> AppState {
    let gateway = GatewayConfig::new(
        "test-token".into(),
        cms_base_url.into(),
        1000,
        Duration::from_secs(5),
        policy,
    )
    .expect("gateway config");
    let rest = RestConfig::new(
        "https://nexusbio.example".into(),
        Some(WEBHOOK_SECRET.into()),
        Some(PREVIEW_SECRET.into()),
        WorkflowStageMap::new([
            (101, WorkflowStage::ContentReview),
            (105, WorkflowStage::FinalApproval),
        ]),
    )
    .expect("rest config");

    AppState::new(rest, ContentService::from_config(&gateway).expect("content service"))
}

/// The router backed by a lenient gateway talking to [`fake_cms`].
pub(crate) async fn app() -> Router {
    router(state_for(&fake_cms().await, FallbackPolicy::Lenient))
}

pub(crate) async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body")
        .to_vec()
}

pub(crate) async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json body")
}
