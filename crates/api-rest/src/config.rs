//! REST surface configuration, resolved once at startup.

use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;

pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_SITE_URL: &str = "https://example.com";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RestConfigError {
    #[error("invalid SITE_URL '{0}': must start with http:// or https://")]
    InvalidSiteUrl(String),
    #[error("invalid WORKFLOW_STAGE_MAP entry '{0}': expected <step id>=<stage>")]
    InvalidStageEntry(String),
    #[error("unknown workflow stage '{0}'")]
    UnknownStage(String),
}

/// Editorial approval stage a story moves through before publication.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    Draft,
    ContentReview,
    LegalReview,
    ComplianceReview,
    FinalApproval,
    Published,
    Archived,
}

impl WorkflowStage {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowStage::Draft => "draft",
            WorkflowStage::ContentReview => "content_review",
            WorkflowStage::LegalReview => "legal_review",
            WorkflowStage::ComplianceReview => "compliance_review",
            WorkflowStage::FinalApproval => "final_approval",
            WorkflowStage::Published => "published",
            WorkflowStage::Archived => "archived",
        }
    }

    /// Review stages that call for an automated content audit.
    pub fn triggers_audit(self) -> bool {
        matches!(
            self,
            WorkflowStage::ContentReview
                | WorkflowStage::LegalReview
                | WorkflowStage::ComplianceReview
        )
    }
}

impl FromStr for WorkflowStage {
    type Err = RestConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(WorkflowStage::Draft),
            "content_review" => Ok(WorkflowStage::ContentReview),
            "legal_review" => Ok(WorkflowStage::LegalReview),
            "compliance_review" => Ok(WorkflowStage::ComplianceReview),
            "final_approval" => Ok(WorkflowStage::FinalApproval),
            "published" => Ok(WorkflowStage::Published),
            "archived" => Ok(WorkflowStage::Archived),
            other => Err(RestConfigError::UnknownStage(other.to_string())),
        }
    }
}

/// Maps CMS workflow step ids to [`WorkflowStage`]s.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkflowStageMap(HashMap<u64, WorkflowStage>);

impl WorkflowStageMap {
    pub fn new(entries: impl IntoIterator<Item = (u64, WorkflowStage)>) -> Self {
        Self(entries.into_iter().collect())
    }

    /// Resolves a step id; a story without a step is still a draft.
    ///
    /// Returns `None` for step ids that are not mapped.
    pub fn stage_for(&self, step_id: Option<u64>) -> Option<WorkflowStage> {
        match step_id {
            None => Some(WorkflowStage::Draft),
            Some(id) => self.0.get(&id).copied(),
        }
    }
}

impl FromStr for WorkflowStageMap {
    type Err = RestConfigError;

    /// Parses `12345=content_review,12346=legal_review`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut map = HashMap::new();
        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (id, stage) = entry
                .split_once('=')
                .ok_or_else(|| RestConfigError::InvalidStageEntry(entry.to_string()))?;
            let id = id
                .trim()
                .parse::<u64>()
                .map_err(|_| RestConfigError::InvalidStageEntry(entry.to_string()))?;
            map.insert(id, stage.parse()?);
        }
        Ok(Self(map))
    }
}

/// REST configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct RestConfig {
    site_url: String,
    webhook_secret: Option<String>,
    preview_secret: Option<String>,
    workflow_stages: WorkflowStageMap,
}

impl RestConfig {
    pub fn new(
        site_url: String,
        webhook_secret: Option<String>,
        preview_secret: Option<String>,
        workflow_stages: WorkflowStageMap,
    ) -> Result<Self, RestConfigError> {
        let site_url = site_url.trim().trim_end_matches('/').to_string();
        if !(site_url.starts_with("https://") || site_url.starts_with("http://")) {
            return Err(RestConfigError::InvalidSiteUrl(site_url));
        }

        Ok(Self {
            site_url,
            webhook_secret: non_blank(webhook_secret),
            preview_secret: non_blank(preview_secret),
            workflow_stages,
        })
    }

    /// Reads `SITE_URL`, `STORYBLOK_WEBHOOK_SECRET`, `STORYBLOK_PREVIEW_SECRET` and
    /// `WORKFLOW_STAGE_MAP`.
    pub fn from_env() -> Result<Self, RestConfigError> {
        let cfg = Self::new(
            site_url_from_env_value(std::env::var("SITE_URL").ok()),
            std::env::var("STORYBLOK_WEBHOOK_SECRET").ok(),
            std::env::var("STORYBLOK_PREVIEW_SECRET").ok(),
            workflow_stages_from_env_value(std::env::var("WORKFLOW_STAGE_MAP").ok())?,
        )?;

        if cfg.webhook_secret.is_none() {
            tracing::warn!("STORYBLOK_WEBHOOK_SECRET is not set; webhook signatures will not be verified");
        }
        if cfg.preview_secret.is_none() {
            tracing::warn!("STORYBLOK_PREVIEW_SECRET is not set; draft preview is disabled");
        }

        Ok(cfg)
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    pub fn webhook_secret(&self) -> Option<&str> {
        self.webhook_secret.as_deref()
    }

    pub fn preview_secret(&self) -> Option<&str> {
        self.preview_secret.as_deref()
    }

    pub fn workflow_stages(&self) -> &WorkflowStageMap {
        &self.workflow_stages
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn rest_addr_from_env_value(value: Option<String>) -> String {
    non_blank(value).unwrap_or_else(|| DEFAULT_REST_ADDR.into())
}

pub fn site_url_from_env_value(value: Option<String>) -> String {
    non_blank(value).unwrap_or_else(|| DEFAULT_SITE_URL.into())
}

pub fn workflow_stages_from_env_value(
    value: Option<String>,
) -> Result<WorkflowStageMap, RestConfigError> {
    non_blank(value)
        .map(|v| v.parse())
        .transpose()
        .map(Option::unwrap_or_default)
}
