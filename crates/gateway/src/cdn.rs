//! Content Delivery API client.
//!
//! Every request goes through the shared [`RateLimiter`]: the HTTP exchange (send, status check,
//! body download) is the queued task, decoding happens afterwards on the caller's task.

use crate::config::GatewayConfig;
use crate::rate_limiter::RateLimiter;
use crate::{GatewayError, GatewayResult};
use chrono::{DateTime, Utc};
use nexus_types::Slug;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Slugs of stories that hold configuration rather than pages.
pub const EXCLUDED_LISTING_SLUGS: &str = "settings,global-settings";

/// Slug of the story whose content is the site's global settings.
pub const SETTINGS_SLUG: &str = "settings";

const LISTING_PAGE_SIZE: u32 = 100;

/// Which revision of the content to request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContentVersion {
    #[default]
    Published,
    Draft,
}

impl ContentVersion {
    pub fn from_draft(is_draft: bool) -> Self {
        if is_draft {
            ContentVersion::Draft
        } else {
            ContentVersion::Published
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContentVersion::Published => "published",
            ContentVersion::Draft => "draft",
        }
    }
}

/// One entry of a story listing; only what the sitemap needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorySummary {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub full_slug: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_startpage: bool,
}

#[derive(Debug, Deserialize)]
struct StoryEnvelope {
    story: Value,
}

#[derive(Debug, Deserialize)]
struct StoriesEnvelope {
    stories: Vec<StorySummary>,
}

/// HTTP client for `{base}/cdn/stories`.
#[derive(Clone)]
pub struct ContentDeliveryClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    limiter: Arc<RateLimiter>,
}

impl std::fmt::Debug for ContentDeliveryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentDeliveryClient")
            .field("base_url", &self.base_url)
            .field("limiter", &self.limiter)
            .finish_non_exhaustive()
    }
}

impl ContentDeliveryClient {
    pub fn new(config: &GatewayConfig, limiter: Arc<RateLimiter>) -> GatewayResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(GatewayError::Client)?;

        Ok(Self {
            http,
            base_url: config.api_base_url().to_string(),
            access_token: config.access_token().to_string(),
            limiter,
        })
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Fetches one story and returns the raw `story` object.
    pub async fn story(&self, slug: &Slug, version: ContentVersion) -> GatewayResult<Value> {
        let resource = format!("story '{slug}'");
        let url = format!("{}/cdn/stories/{}", self.base_url, slug);
        let query = vec![
            ("version", version.as_str().to_string()),
            ("cv", Utc::now().timestamp_millis().to_string()),
        ];

        let envelope: StoryEnvelope = self.get_json(resource, url, query).await?;
        Ok(envelope.story)
    }

    /// Lists page stories (first page of up to 100), excluding configuration stories.
    pub async fn stories(&self, version: ContentVersion) -> GatewayResult<Vec<StorySummary>> {
        let url = format!("{}/cdn/stories", self.base_url);
        let query = vec![
            ("version", version.as_str().to_string()),
            ("per_page", LISTING_PAGE_SIZE.to_string()),
            ("excluding_slugs", EXCLUDED_LISTING_SLUGS.to_string()),
        ];

        let envelope: StoriesEnvelope = self.get_json("story listing".into(), url, query).await?;
        Ok(envelope.stories)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: String,
        url: String,
        mut query: Vec<(&'static str, String)>,
    ) -> GatewayResult<T> {
        tracing::debug!(%resource, %url, "queueing CMS request");
        query.push(("token", self.access_token.clone()));
        let request = self.http.get(url).query(&query);

        let task_resource = resource.clone();
        let body = self
            .limiter
            .enqueue(async move {
                let response = request.send().await.map_err(|source| GatewayError::Transport {
                    resource: task_resource.clone(),
                    source,
                })?;

                let status = response.status();
                if status == StatusCode::NOT_FOUND {
                    return Err(GatewayError::NotFound {
                        resource: task_resource,
                    });
                }
                if !status.is_success() {
                    return Err(GatewayError::Status {
                        resource: task_resource,
                        status: status.as_u16(),
                    });
                }

                response
                    .bytes()
                    .await
                    .map_err(|source| GatewayError::Transport {
                        resource: task_resource,
                        source,
                    })
            })
            .await??;

        decode(&resource, &body)
    }
}

fn decode<T: DeserializeOwned>(resource: &str, body: &[u8]) -> GatewayResult<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(body);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
        let path = err.path().to_string();
        let path = if path.is_empty() || path == "." {
            "<root>".to_string()
        } else {
            path
        };
        GatewayError::Decode {
            resource: resource.to_string(),
            path,
            message: err.into_inner().to_string(),
        }
    })
}
