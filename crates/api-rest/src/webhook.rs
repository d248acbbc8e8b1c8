//! CMS webhook receiver.
//!
//! The CMS signs each delivery with a hex HMAC-SHA1 of the raw body in `webhook-signature`.
//! Events are logged and acknowledged; workflow changes report the mapped editorial stage.

use crate::{failure, AppState};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use utoipa::ToSchema;
use uuid::Uuid;

type HmacSha1 = Hmac<Sha1>;

pub const SIGNATURE_HEADER: &str = "webhook-signature";
pub const RESPONSE_VERSION: &str = "1.0.0";

/// A webhook delivery. The CMS omits fields that do not apply to the action.
#[derive(Debug, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub story_id: Option<u64>,
    #[serde(default)]
    pub space_id: Option<u64>,
    #[serde(default)]
    pub full_slug: String,
    #[serde(default)]
    pub workflow_step_id: Option<u64>,
    #[serde(default)]
    pub user_id: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAck {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowData {
    pub stage: String,
    pub audit_triggered: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    pub timestamp: String,
    pub request_id: String,
    pub version: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WorkflowRes {
    pub success: bool,
    pub data: WorkflowData,
    pub meta: ResponseMeta,
}

/// Checks `signature` (lowercase or uppercase hex) against the HMAC-SHA1 of `body`.
///
/// The comparison is constant-time.
pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha1::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

fn workflow_changed(state: &AppState, payload: &WebhookPayload) -> WorkflowRes {
    let stage = state
        .cfg
        .workflow_stages()
        .stage_for(payload.workflow_step_id);
    let audit_triggered = stage.is_some_and(|s| s.triggers_audit());
    let stage = stage.map_or("unknown", |s| s.as_str());

    tracing::info!(
        story_id = payload.story_id,
        workflow_step_id = payload.workflow_step_id,
        stage,
        "story moved to workflow stage"
    );
    if audit_triggered {
        tracing::info!(
            story_id = payload.story_id,
            full_slug = %payload.full_slug,
            stage,
            "content audit triggered"
        );
    }

    WorkflowRes {
        success: true,
        data: WorkflowData {
            stage: stage.to_string(),
            audit_triggered,
        },
        meta: ResponseMeta {
            timestamp: Utc::now().to_rfc3339(),
            request_id: Uuid::new_v4().to_string(),
            version: RESPONSE_VERSION.into(),
        },
    }
}

fn ack(message: String) -> Json<WebhookAck> {
    Json(WebhookAck {
        success: true,
        message,
    })
}

#[utoipa::path(
    post,
    path = "/api/webhooks/storyblok",
    request_body(content = String, description = "Raw webhook JSON as signed by the CMS"),
    params(
        ("webhook-signature" = Option<String>, Header, description = "Hex HMAC-SHA1 of the body")
    ),
    responses(
        (status = 200, description = "Event acknowledged; workflow_step_changed answers with WorkflowRes", body = WebhookAck),
        (status = 400, description = "Body is not valid JSON", body = crate::FailureRes),
        (status = 401, description = "Signature mismatch", body = crate::FailureRes)
    )
)]
/// Receives CMS webhooks.
///
/// Without a configured secret, or without a signature header, the delivery is accepted
/// unverified and a warning is logged.
#[axum::debug_handler]
pub async fn storyblok_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    match (state.cfg.webhook_secret(), signature) {
        (Some(secret), Some(signature)) => {
            if !verify_signature(secret, &body, signature) {
                tracing::error!("webhook signature mismatch");
                return failure(StatusCode::UNAUTHORIZED, "Invalid signature").into_response();
            }
        }
        _ => tracing::warn!("no webhook secret configured or signature missing; skipping verification"),
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "webhook body is not valid JSON");
            return failure(StatusCode::BAD_REQUEST, "Invalid JSON").into_response();
        }
    };

    tracing::info!(action = %payload.action, story_id = payload.story_id, "webhook received");

    match payload.action.as_str() {
        "workflow_step_changed" => Json(workflow_changed(&state, &payload)).into_response(),
        "published" => {
            tracing::info!(full_slug = %payload.full_slug, "story published");
            ack(format!("Published: {}", payload.full_slug)).into_response()
        }
        "unpublished" => {
            tracing::info!(full_slug = %payload.full_slug, "story unpublished");
            ack(format!("Unpublished: {}", payload.full_slug)).into_response()
        }
        other => {
            tracing::info!(action = other, "unhandled webhook action");
            ack("Acknowledged".into()).into_response()
        }
    }
}
