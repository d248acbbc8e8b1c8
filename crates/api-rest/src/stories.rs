//! Story and global-settings endpoints.

use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use nexus_gateway::GatewayError;
use nexus_schema::{SchemaError, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_TITLE: &str = "NexusBio Therapeutics";
pub const DEFAULT_DESCRIPTION: &str =
    "Advancing oncology therapeutics through innovative research";

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DraftQuery {
    /// Request the draft revision instead of the published one.
    #[serde(default)]
    pub draft: bool,
}

/// Head metadata for a rendered page.
#[derive(Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub og_images: Vec<String>,
}

impl PageMetadata {
    /// Reads metadata from a CMS-shaped story.
    ///
    /// Works on raw fallback content too, so a page that failed validation still gets a title.
    pub fn from_story(story: &Value) -> Self {
        let content = &story["content"];
        let text = |key: &str, default: &str| {
            content[key]
                .as_str()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(default)
                .to_string()
        };

        Self {
            title: text("seo_title", DEFAULT_TITLE),
            description: text("seo_description", DEFAULT_DESCRIPTION),
            og_images: content["og_image"]["filename"]
                .as_str()
                .filter(|f| !f.is_empty())
                .map(|f| vec![f.to_string()])
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoryRes {
    pub valid: bool,
    #[schema(value_type = Vec<Object>)]
    pub errors: Vec<ValidationError>,
    pub metadata: PageMetadata,
    #[schema(value_type = Object)]
    pub story: Value,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SettingsRes {
    pub valid: bool,
    #[schema(value_type = Vec<Object>)]
    pub errors: Vec<ValidationError>,
    #[schema(value_type = Option<Object>)]
    pub settings: Option<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[schema(value_type = Vec<Object>)]
    pub errors: Vec<ValidationError>,
}

type ApiError = (StatusCode, Json<ErrorRes>);

fn api_error(status: StatusCode, error: &str) -> ApiError {
    (
        status,
        Json(ErrorRes {
            error: error.to_string(),
            errors: Vec::new(),
        }),
    )
}

fn gateway_failure(err: GatewayError) -> ApiError {
    match err {
        GatewayError::NotFound { .. } => api_error(StatusCode::NOT_FOUND, "Story not found"),
        GatewayError::InvalidSlug(_) => api_error(StatusCode::BAD_REQUEST, "Invalid slug"),
        GatewayError::Content {
            source: SchemaError::Rejected(errors),
            ..
        } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorRes {
                error: "Content failed validation".into(),
                errors: errors.into_vec(),
            }),
        ),
        _ => api_error(StatusCode::BAD_GATEWAY, "Content unavailable"),
    }
}

#[utoipa::path(
    get,
    path = "/stories/{slug}",
    params(
        ("slug" = String, Path, description = "Full slug of the story, may contain '/'"),
        DraftQuery
    ),
    responses(
        (status = 200, description = "Resolved story", body = StoryRes),
        (status = 400, description = "Invalid slug", body = ErrorRes),
        (status = 404, description = "No such story", body = ErrorRes),
        (status = 422, description = "Rejected under strict validation", body = ErrorRes),
        (status = 502, description = "CMS unavailable or content unusable", body = ErrorRes)
    )
)]
/// Fetches, validates and returns one story with its page metadata.
///
/// Under lenient validation a story that fails field constraints is returned as its raw CMS
/// payload with `valid: false` and the collected errors.
#[axum::debug_handler]
pub async fn get_story(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<DraftQuery>,
) -> Result<Json<StoryRes>, ApiError> {
    let resolved = state
        .content
        .fetch_story(&slug, query.draft)
        .await
        .map_err(gateway_failure)?;

    let story = resolved.to_json().map_err(|e| {
        tracing::error!(%slug, error = %e, "failed to serialise story");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
    })?;

    Ok(Json(StoryRes {
        valid: resolved.is_valid(),
        errors: resolved.errors().to_vec(),
        metadata: PageMetadata::from_story(&story),
        story,
    }))
}

#[utoipa::path(
    get,
    path = "/settings",
    params(DraftQuery),
    responses(
        (status = 200, description = "Global settings, or null when unavailable", body = SettingsRes)
    )
)]
/// Returns the global settings. A failure to fetch them yields `settings: null`, never an error.
#[axum::debug_handler]
pub async fn get_settings(
    State(state): State<AppState>,
    Query(query): Query<DraftQuery>,
) -> Json<SettingsRes> {
    let Some(resolved) = state.content.fetch_global_settings(query.draft).await else {
        return Json(SettingsRes {
            valid: false,
            errors: Vec::new(),
            settings: None,
        });
    };

    let settings = match resolved.to_json() {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialise global settings");
            None
        }
    };

    Json(SettingsRes {
        valid: resolved.is_valid() && settings.is_some(),
        errors: resolved.errors().to_vec(),
        settings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router;
    use crate::test_support::{app, body_json, fake_cms, state_for, unreachable_cms};
    use axum::body::Body;
    use axum::http::Request;
    use nexus_schema::FallbackPolicy;
    use serde_json::json;
    use tower::ServiceExt;

    async fn get(app: axum::Router, uri: &str) -> axum::response::Response {
        app.oneshot(Request::get(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response")
    }

    #[tokio::test]
    async fn valid_story_is_typed_with_metadata() {
        let response = get(app().await, "/stories/home").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["valid"], true);
        assert_eq!(body["errors"], json!([]));
        assert_eq!(body["metadata"]["title"], "NexusBio Pipeline");
        assert_eq!(
            body["metadata"]["og_images"],
            json!(["https://a.storyblok.com/f/1/og.png"])
        );
        assert_eq!(body["story"]["content"]["body"][0]["component"], "hero_section");
    }

    #[tokio::test]
    async fn lenient_fallback_serves_raw_story_with_errors() {
        let body = body_json(get(app().await, "/stories/no-disclaimer?draft=true").await).await;

        assert_eq!(body["valid"], false);
        assert_eq!(body["errors"][0]["path"], "content.body.0.legal_disclaimer");
        assert_eq!(body["errors"][0]["kind"], "missing");
        assert_eq!(body["story"]["full_slug"], "no-disclaimer");
    }

    #[tokio::test]
    async fn strict_rejection_is_unprocessable() {
        let app = router(state_for(&fake_cms().await, FallbackPolicy::Strict));
        let response = get(app, "/stories/no-disclaimer").await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["errors"][0]["path"], "content.body.0.legal_disclaimer");
    }

    #[tokio::test]
    async fn gateway_failures_map_to_status_codes() {
        assert_eq!(
            get(app().await, "/stories/missing").await.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get(app().await, "/stories/broken").await.status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get(app().await, "/stories/carousel").await.status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get(app().await, "/stories/a/../b").await.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn settings_are_returned_when_available() {
        let body = body_json(get(app().await, "/settings").await).await;
        assert_eq!(body["valid"], true);
        assert_eq!(body["settings"]["copyright"], "© 2025 NexusBio");
    }

    #[tokio::test]
    async fn settings_are_null_when_cms_is_down() {
        let app = router(state_for(&unreachable_cms().await, FallbackPolicy::Lenient));
        let response = get(app, "/settings").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["settings"], Value::Null);
        assert_eq!(body["valid"], false);
    }

    #[test]
    fn metadata_defaults_when_fields_are_blank() {
        let story = json!({ "content": { "seo_title": "  ", "og_image": { "filename": "" } } });
        let metadata = PageMetadata::from_story(&story);
        assert_eq!(metadata.title, DEFAULT_TITLE);
        assert_eq!(metadata.description, DEFAULT_DESCRIPTION);
        assert!(metadata.og_images.is_empty());
    }
}
