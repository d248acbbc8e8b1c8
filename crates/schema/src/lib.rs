//! # Nexus Schema
//!
//! Schema registry and validator for the content blocks authored in the CMS.
//!
//! This crate turns raw Content Delivery API payloads into typed, constraint-checked values:
//! - [`validate_story`], [`validate_global_settings`] and [`validate_block`] walk a whole
//!   content tree in one pass and collect every violation with its dotted path
//! - [`resolve_story`] and [`resolve_global_settings`] apply a [`FallbackPolicy`] so a renderer
//!   always gets either a typed value, a raw passthrough with errors, or a hard error
//!
//! Validation is pure and synchronous. **No I/O**: fetching content belongs in `nexus-gateway`.

pub mod blocks;
pub mod common;
pub mod error;
mod fields;
pub mod resolve;
pub mod richtext;
pub mod settings;
pub mod story;

pub use blocks::{
    validate_block, Block, ClinicalDataSection, Component, ContactFormSection, FeatureBlock,
    FeaturesSection, FooterLink, FooterSection, HeroSection, HeroVariant, InvestorResourcesSection,
    NavItem, Page, ResourceFileType, ResourceLink, StatBlock, DEFAULT_INQUIRY_TYPES,
    PAGE_SECTIONS,
};
pub use common::{Asset, Link};
pub use error::{StructuralError, ValidationError, ValidationErrors, ValidationFailure, ViolationKind};
pub use resolve::{resolve_block, resolve_global_settings, resolve_story, FallbackPolicy, Resolved,
    UnknownPolicy,
};
pub use richtext::RichtextNode;
pub use settings::{validate_global_settings, GlobalSettings};
pub use story::{validate_story, Story};

/// Errors returned by the policy-aware `resolve_*` entry points.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("structurally invalid content: {0}")]
    Structural(#[from] StructuralError),

    #[error("content rejected: {0}")]
    Rejected(ValidationErrors),

    #[error("failed to serialise content: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type SchemaResult<T> = std::result::Result<T, SchemaError>;
