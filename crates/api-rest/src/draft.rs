//! Draft-preview entry point used by the CMS visual editor.

use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Redirect,
};
use nexus_types::Slug;
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DraftParams {
    /// Shared preview secret configured in the CMS.
    pub secret: Option<String>,
    /// Story to preview; defaults to `home`.
    pub slug: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/draft",
    params(DraftParams),
    responses(
        (status = 307, description = "Redirect to the draft story"),
        (status = 400, description = "Invalid slug"),
        (status = 401, description = "Missing or wrong secret, or preview disabled")
    )
)]
/// Checks the preview secret and redirects to the draft revision of a story.
#[axum::debug_handler]
pub async fn enter_draft(
    State(state): State<AppState>,
    Query(params): Query<DraftParams>,
) -> Result<Redirect, (StatusCode, &'static str)> {
    let authorised = match (state.cfg.preview_secret(), params.secret.as_deref()) {
        (Some(expected), Some(given)) => expected == given,
        _ => false,
    };
    if !authorised {
        tracing::warn!("draft preview requested with an invalid secret");
        return Err((StatusCode::UNAUTHORIZED, "Invalid token"));
    }

    let slug = params
        .slug
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("home");
    let slug = Slug::parse(slug).map_err(|_| (StatusCode::BAD_REQUEST, "Invalid slug"))?;

    tracing::info!(%slug, "entering draft preview");
    Ok(Redirect::temporary(&format!("/stories/{slug}?draft=true")))
}
