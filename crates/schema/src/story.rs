//! The story envelope returned by the Content Delivery API.

use crate::blocks::{expect_root, Component, Page};
use crate::error::{StructuralError, ValidationFailure};
use crate::fields::{Context, Fields, TextRule};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// A published or draft content entry whose root content is a [`Page`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Story {
    pub id: u64,
    pub uuid: Uuid,
    pub name: String,
    pub slug: String,
    pub full_slug: String,
    pub content: Page,
    pub tag_list: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_step_id: Option<u64>,
    pub created_at: DateTime<Utc>,
    /// `None` until the story is first published.
    pub published_at: Option<DateTime<Utc>>,
    pub first_published_at: Option<DateTime<Utc>>,
}

impl Story {
    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }
}

/// Validates a story envelope and every block nested in its content.
///
/// Field errors inside the content are reported with a `content.` prefix, e.g.
/// `content.body.0.legal_disclaimer`.
pub fn validate_story(raw: &Value) -> Result<Story, ValidationFailure> {
    let map = raw.as_object().ok_or_else(|| StructuralError::NotAnObject {
        path: String::new(),
    })?;
    let content = map
        .get("content")
        .ok_or_else(|| StructuralError::NotAnObject {
            path: "content".into(),
        })?;
    let content_map = expect_root(content, "content", Component::Page)?;

    let mut cx = Context::new();
    let f = Fields::new(map, "");
    let story = Story {
        id: f.required_u64(&mut cx, "id"),
        uuid: f.required_uuid(&mut cx, "uuid"),
        name: f.required_text(&mut cx, "name", TextRule::REQUIRED),
        slug: f.required_text(&mut cx, "slug", TextRule::REQUIRED),
        full_slug: f.required_text(&mut cx, "full_slug", TextRule::REQUIRED),
        content: Page::read(&mut cx, &Fields::new(content_map, "content")),
        tag_list: f.string_list(&mut cx, "tag_list"),
        workflow_step_id: f.optional_u64(&mut cx, "workflow_step_id"),
        created_at: f.required_timestamp(&mut cx, "created_at"),
        published_at: f.nullable_timestamp(&mut cx, "published_at"),
        first_published_at: f.nullable_timestamp(&mut cx, "first_published_at"),
    };
    cx.finish(story)
}
