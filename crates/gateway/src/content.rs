//! The content service used by the rendering layer.

use crate::cdn::{ContentDeliveryClient, ContentVersion, StorySummary, SETTINGS_SLUG};
use crate::config::GatewayConfig;
use crate::rate_limiter::RateLimiter;
use crate::{GatewayError, GatewayResult};
use nexus_schema::{
    resolve_global_settings, resolve_story, FallbackPolicy, GlobalSettings, Resolved, Story,
};
use nexus_types::Slug;
use serde_json::Value;
use std::sync::Arc;

/// Fetches content through the rate-limited client and validates it under the configured
/// fallback policy.
#[derive(Clone, Debug)]
pub struct ContentService {
    client: ContentDeliveryClient,
    policy: FallbackPolicy,
}

impl ContentService {
    /// Builds a service sharing `limiter` with any other CMS client in the process.
    ///
    /// # Arguments
    ///
    /// * `config` - Resolved gateway settings; the validation mode becomes the fallback policy
    /// * `limiter` - The process-wide request queue
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Client`] if the HTTP client cannot be built.
    pub fn new(config: &GatewayConfig, limiter: Arc<RateLimiter>) -> GatewayResult<Self> {
        Ok(Self {
            client: ContentDeliveryClient::new(config, limiter)?,
            policy: config.validation(),
        })
    }

    /// Builds a service with its own limiter at the configured rate.
    pub fn from_config(config: &GatewayConfig) -> GatewayResult<Self> {
        let limiter = Arc::new(RateLimiter::new(config.requests_per_second()));
        Self::new(config, limiter)
    }

    /// The policy applied to field violations in fetched content.
    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    /// The underlying rate-limited client, for callers that need raw payloads.
    pub fn client(&self) -> &ContentDeliveryClient {
        &self.client
    }

    /// Fetches and validates one story.
    ///
    /// Failures are logged with the slug and returned to the caller.
    pub async fn fetch_story(&self, slug: &str, is_draft: bool) -> GatewayResult<Resolved<Story>> {
        let result = self.fetch_story_inner(slug, is_draft).await;
        if let Err(err) = &result {
            tracing::error!(slug, draft = is_draft, error = %err, "error fetching story");
        }
        result
    }

    async fn fetch_story_inner(
        &self,
        slug: &str,
        is_draft: bool,
    ) -> GatewayResult<Resolved<Story>> {
        let slug = Slug::parse(slug).map_err(|_| GatewayError::InvalidSlug(slug.to_string()))?;
        let raw = self
            .client
            .story(&slug, ContentVersion::from_draft(is_draft))
            .await?;

        resolve_story(&raw, self.policy).map_err(|source| GatewayError::Content {
            resource: format!("story '{slug}'"),
            source,
        })
    }

    /// Fetches and validates the global settings.
    ///
    /// Any failure is logged and yields `None`, so a page can still render without settings.
    pub async fn fetch_global_settings(&self, is_draft: bool) -> Option<Resolved<GlobalSettings>> {
        match self.fetch_global_settings_inner(is_draft).await {
            Ok(settings) => Some(settings),
            Err(err) => {
                tracing::error!(draft = is_draft, error = %err, "error fetching global settings");
                None
            }
        }
    }

    async fn fetch_global_settings_inner(
        &self,
        is_draft: bool,
    ) -> GatewayResult<Resolved<GlobalSettings>> {
        let slug = Slug::parse(SETTINGS_SLUG)
            .map_err(|_| GatewayError::InvalidSlug(SETTINGS_SLUG.to_string()))?;
        let mut story = self
            .client
            .story(&slug, ContentVersion::from_draft(is_draft))
            .await?;
        let content = story
            .get_mut("content")
            .map(Value::take)
            .unwrap_or(Value::Null);

        resolve_global_settings(&content, self.policy).map_err(|source| GatewayError::Content {
            resource: "global settings".into(),
            source,
        })
    }

    /// Lists published page stories for the sitemap.
    pub async fn list_page_stories(&self) -> GatewayResult<Vec<StorySummary>> {
        self.client
            .stories(ContentVersion::Published)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "error listing stories");
                err
            })
    }
}
