//! The content-block schema registry.
//!
//! Every block type the CMS can hold is declared here: its discriminator tag, its typed
//! fields, and the constraints those fields must satisfy. Validation dispatches on the
//! [`Component`] discriminator; each block type knows how to read itself from a [`Fields`]
//! reader and which child block types its nested lists accept.
//!
//! Typed blocks serialise back into the CMS JSON shape (with `component` and `_uid`), so a
//! validated tree can be validated again without drift.

use crate::common::{Asset, Link};
use crate::error::{child_path, StructuralError, ValidationFailure, ViolationKind};
use crate::fields::{Cardinality, Context, Fields, OptionSet, TextRule};
use crate::richtext::RichtextNode;
use serde::Serialize;
use serde_json::{Map, Value};

/// The block discriminator (`component` tag).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Component {
    HeroSection,
    FeatureBlock,
    FeaturesSection,
    StatBlock,
    ClinicalDataSection,
    ResourceLink,
    InvestorResourcesSection,
    FooterLink,
    FooterSection,
    ContactFormSection,
    NavItem,
    GlobalSettings,
    Page,
}

impl Component {
    pub const ALL: [Component; 13] = [
        Component::HeroSection,
        Component::FeatureBlock,
        Component::FeaturesSection,
        Component::StatBlock,
        Component::ClinicalDataSection,
        Component::ResourceLink,
        Component::InvestorResourcesSection,
        Component::FooterLink,
        Component::FooterSection,
        Component::ContactFormSection,
        Component::NavItem,
        Component::GlobalSettings,
        Component::Page,
    ];

    /// The wire tag for this component.
    pub fn as_str(self) -> &'static str {
        match self {
            Component::HeroSection => "hero_section",
            Component::FeatureBlock => "feature_block",
            Component::FeaturesSection => "features_section",
            Component::StatBlock => "stat_block",
            Component::ClinicalDataSection => "clinical_data_section",
            Component::ResourceLink => "resource_link",
            Component::InvestorResourcesSection => "investor_resources_section",
            Component::FooterLink => "footer_link",
            Component::FooterSection => "footer_section",
            Component::ContactFormSection => "contact_form_section",
            Component::NavItem => "nav_item",
            Component::GlobalSettings => "global_settings",
            Component::Page => "page",
        }
    }

    /// Parses a wire tag; `None` for anything outside the known set.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Component::ALL.into_iter().find(|c| c.as_str() == tag)
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Section types a page body may contain.
pub const PAGE_SECTIONS: &[Component] = &[
    Component::HeroSection,
    Component::FeaturesSection,
    Component::ClinicalDataSection,
    Component::InvestorResourcesSection,
    Component::FooterSection,
    Component::ContactFormSection,
];

/// Inquiry types offered when a contact form does not configure its own.
pub const DEFAULT_INQUIRY_TYPES: [&str; 5] = [
    "Investor Relations",
    "Clinical Trial Information",
    "Partnership Opportunities",
    "Media Inquiry",
    "Other",
];

/// Reads the `component` tag of an object, as a structural check.
pub(crate) fn read_component(
    map: &Map<String, Value>,
    path: &str,
) -> Result<Component, StructuralError> {
    let tag = match map.get("component") {
        Some(Value::String(tag)) => tag,
        _ => {
            return Err(StructuralError::MissingComponent {
                path: path.to_string(),
            })
        }
    };
    Component::from_tag(tag).ok_or_else(|| StructuralError::UnknownComponent {
        path: path.to_string(),
        component: tag.clone(),
    })
}

/// Requires `value` to be an object tagged with `expected`.
pub(crate) fn expect_root<'v>(
    value: &'v Value,
    path: &str,
    expected: Component,
) -> Result<&'v Map<String, Value>, StructuralError> {
    let map = value.as_object().ok_or_else(|| StructuralError::NotAnObject {
        path: path.to_string(),
    })?;
    let component = read_component(map, path)?;
    if component != expected {
        return Err(StructuralError::UnexpectedComponent {
            path: path.to_string(),
            expected: expected.as_str(),
            actual: component.as_str().to_string(),
        });
    }
    Ok(map)
}

// ============================================================================
// Option sets
// ============================================================================

/// Hero layout variant used for A/B testing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeroVariant {
    /// Centred layout.
    #[default]
    Control,
    /// Left-aligned layout.
    VariantB,
}

impl OptionSet for HeroVariant {
    const VALUES: &'static [&'static str] = &["control", "variant_b"];

    fn from_value(value: &str) -> Option<Self> {
        match value {
            "control" => Some(HeroVariant::Control),
            "variant_b" => Some(HeroVariant::VariantB),
            _ => None,
        }
    }
}

/// Kind of investor resource, used to pick its icon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceFileType {
    Pdf,
    Sec,
    Presentation,
    External,
}

impl OptionSet for ResourceFileType {
    const VALUES: &'static [&'static str] = &["pdf", "sec", "presentation", "external"];

    fn from_value(value: &str) -> Option<Self> {
        match value {
            "pdf" => Some(ResourceFileType::Pdf),
            "sec" => Some(ResourceFileType::Sec),
            "presentation" => Some(ResourceFileType::Presentation),
            "external" => Some(ResourceFileType::External),
            _ => None,
        }
    }
}

// ============================================================================
// Block types
// ============================================================================

/// Primary above-the-fold section.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "component", rename = "hero_section")]
pub struct HeroSection {
    #[serde(rename = "_uid")]
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<Asset>,
    pub headline: String,
    pub subheadline: String,
    pub cta_text: String,
    pub cta_link: Link,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<Asset>,
    /// Forward-looking statements and risk disclosure.
    pub legal_disclaimer: RichtextNode,
    pub show_trial_badge: bool,
    pub variant: HeroVariant,
}

impl HeroSection {
    pub const DEFAULT_CTA_TEXT: &'static str = "Learn More";

    fn read(cx: &mut Context, f: &Fields<'_>) -> Self {
        Self {
            uid: f.uid(cx),
            logo: f.asset(cx, "logo"),
            headline: f.required_text(cx, "headline", TextRule::between(1, 120)),
            subheadline: f.required_text(cx, "subheadline", TextRule::between(1, 250)),
            cta_text: f.text_or_default(
                cx,
                "cta_text",
                Self::DEFAULT_CTA_TEXT,
                TextRule::at_most(30),
            ),
            cta_link: f.required_link(cx, "cta_link"),
            background_image: f.asset(cx, "background_image"),
            legal_disclaimer: f.required_richtext(cx, "legal_disclaimer"),
            show_trial_badge: f.bool_or_default(cx, "show_trial_badge", true),
            variant: f.option_or_default(cx, "variant", HeroVariant::Control),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "component", rename = "feature_block")]
pub struct FeatureBlock {
    #[serde(rename = "_uid")]
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Asset>,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
}

impl FeatureBlock {
    fn read(cx: &mut Context, f: &Fields<'_>) -> Self {
        Self {
            uid: f.uid(cx),
            icon: f.asset(cx, "icon"),
            title: f.required_text(cx, "title", TextRule::between(1, 80)),
            description: f.required_text(cx, "description", TextRule::between(1, 300)),
            citation: f.optional_text(cx, "citation", TextRule::ANY),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "component", rename = "features_section")]
pub struct FeaturesSection {
    #[serde(rename = "_uid")]
    pub uid: String,
    pub section_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_subtitle: Option<String>,
    pub features: Vec<FeatureBlock>,
}

impl FeaturesSection {
    pub const FEATURES: Cardinality = Cardinality::between(3, 4);

    fn read(cx: &mut Context, f: &Fields<'_>) -> Self {
        Self {
            uid: f.uid(cx),
            section_title: f.required_text(cx, "section_title", TextRule::REQUIRED),
            section_subtitle: f.optional_text(cx, "section_subtitle", TextRule::ANY),
            features: f
                .blocks(cx, "features", &[Component::FeatureBlock], Self::FEATURES)
                .into_iter()
                .filter_map(|b| match b {
                    Block::FeatureBlock(feature) => Some(feature),
                    _ => None,
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "component", rename = "stat_block")]
pub struct StatBlock {
    #[serde(rename = "_uid")]
    pub uid: String,
    /// Headline statistic, e.g. `47%` or `12.4 months`.
    pub metric: String,
    pub metric_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl StatBlock {
    fn read(cx: &mut Context, f: &Fields<'_>) -> Self {
        Self {
            uid: f.uid(cx),
            metric: f.required_text(cx, "metric", TextRule::REQUIRED),
            metric_label: f.required_text(cx, "metric_label", TextRule::REQUIRED),
            context: f.optional_text(cx, "context", TextRule::ANY),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "component", rename = "clinical_data_section")]
pub struct ClinicalDataSection {
    #[serde(rename = "_uid")]
    pub uid: String,
    pub section_title: String,
    pub data_points: Vec<StatBlock>,
    /// Trial methodology and limitations disclosure.
    pub trial_disclaimer: RichtextNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
}

impl ClinicalDataSection {
    fn read(cx: &mut Context, f: &Fields<'_>) -> Self {
        Self {
            uid: f.uid(cx),
            section_title: f.required_text(cx, "section_title", TextRule::REQUIRED),
            data_points: f
                .blocks(cx, "data_points", &[Component::StatBlock], Cardinality::ANY)
                .into_iter()
                .filter_map(|b| match b {
                    Block::StatBlock(stat) => Some(stat),
                    _ => None,
                })
                .collect(),
            trial_disclaimer: f.required_richtext(cx, "trial_disclaimer"),
            data_source: f.optional_text(cx, "data_source", TextRule::ANY),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "component", rename = "resource_link")]
pub struct ResourceLink {
    #[serde(rename = "_uid")]
    pub uid: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub link: Link,
    pub file_type: ResourceFileType,
}

impl ResourceLink {
    fn read(cx: &mut Context, f: &Fields<'_>) -> Self {
        Self {
            uid: f.uid(cx),
            title: f.required_text(cx, "title", TextRule::REQUIRED),
            description: f.optional_text(cx, "description", TextRule::ANY),
            link: f.required_link(cx, "link"),
            // The placeholder never escapes: a missing or unknown value has been reported.
            file_type: f
                .required_option(cx, "file_type")
                .unwrap_or(ResourceFileType::External),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "component", rename = "investor_resources_section")]
pub struct InvestorResourcesSection {
    #[serde(rename = "_uid")]
    pub uid: String,
    pub section_title: String,
    pub resources: Vec<ResourceLink>,
}

impl InvestorResourcesSection {
    fn read(cx: &mut Context, f: &Fields<'_>) -> Self {
        Self {
            uid: f.uid(cx),
            section_title: f.required_text(cx, "section_title", TextRule::REQUIRED),
            resources: f
                .blocks(cx, "resources", &[Component::ResourceLink], Cardinality::ANY)
                .into_iter()
                .filter_map(|b| match b {
                    Block::ResourceLink(resource) => Some(resource),
                    _ => None,
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "component", rename = "footer_link")]
pub struct FooterLink {
    #[serde(rename = "_uid")]
    pub uid: String,
    pub label: String,
    pub url: Link,
}

impl FooterLink {
    fn read(cx: &mut Context, f: &Fields<'_>) -> Self {
        Self {
            uid: f.uid(cx),
            label: f.required_text(cx, "label", TextRule::REQUIRED),
            url: f.required_link(cx, "url"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "component", rename = "footer_section")]
pub struct FooterSection {
    #[serde(rename = "_uid")]
    pub uid: String,
    pub company_name: String,
    pub copyright_text: String,
    pub legal_links: Vec<FooterLink>,
    /// SEC and FDA compliance statements.
    pub compliance_notice: RichtextNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
}

impl FooterSection {
    pub const DEFAULT_COMPANY_NAME: &'static str = "NexusBio Therapeutics, Inc.";

    fn read(cx: &mut Context, f: &Fields<'_>) -> Self {
        Self {
            uid: f.uid(cx),
            company_name: f.text_or_default(
                cx,
                "company_name",
                Self::DEFAULT_COMPANY_NAME,
                TextRule::REQUIRED,
            ),
            copyright_text: f.required_text(cx, "copyright_text", TextRule::REQUIRED),
            legal_links: f
                .blocks(cx, "legal_links", &[Component::FooterLink], Cardinality::ANY)
                .into_iter()
                .filter_map(|b| match b {
                    Block::FooterLink(link) => Some(link),
                    _ => None,
                })
                .collect(),
            compliance_notice: f.required_richtext(cx, "compliance_notice"),
            contact_email: f.optional_text(cx, "contact_email", TextRule::ANY),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "component", rename = "contact_form_section")]
pub struct ContactFormSection {
    #[serde(rename = "_uid")]
    pub uid: String,
    pub section_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Comma-delimited list; see [`ContactFormSection::inquiry_types`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inquiry_types: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<RichtextNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit_button_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_disclaimer: Option<String>,
}

impl ContactFormSection {
    pub const DEFAULT_SUBMIT_TEXT: &'static str = "Send Message";
    pub const DEFAULT_SUCCESS_TITLE: &'static str = "Thank You!";
    pub const DEFAULT_SUCCESS_MESSAGE: &'static str =
        "We've received your message and will get back to you shortly.";

    fn read(cx: &mut Context, f: &Fields<'_>) -> Self {
        Self {
            uid: f.uid(cx),
            section_title: f.required_text(cx, "section_title", TextRule::REQUIRED),
            section_subtitle: f.optional_text(cx, "section_subtitle", TextRule::ANY),
            contact_email: f.optional_text(cx, "contact_email", TextRule::at_most(254)),
            contact_phone: f.optional_text(cx, "contact_phone", TextRule::at_most(30)),
            address: f.optional_text(cx, "address", TextRule::at_most(500)),
            inquiry_types: f.optional_text(cx, "inquiry_types", TextRule::at_most(500)),
            additional_info: f.optional_richtext(cx, "additional_info"),
            submit_button_text: f.optional_text(cx, "submit_button_text", TextRule::at_most(30)),
            success_title: f.optional_text(cx, "success_title", TextRule::at_most(80)),
            success_message: f.optional_text(cx, "success_message", TextRule::at_most(300)),
            form_disclaimer: f.optional_text(cx, "form_disclaimer", TextRule::at_most(500)),
        }
    }

    /// The selectable inquiry types.
    ///
    /// Splits the configured comma-delimited list, trimming entries and dropping empty ones.
    /// Falls back to [`DEFAULT_INQUIRY_TYPES`] when the field is absent.
    pub fn inquiry_types(&self) -> Vec<String> {
        match &self.inquiry_types {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_INQUIRY_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn submit_button_text(&self) -> &str {
        non_empty_or(&self.submit_button_text, Self::DEFAULT_SUBMIT_TEXT)
    }

    pub fn success_title(&self) -> &str {
        non_empty_or(&self.success_title, Self::DEFAULT_SUCCESS_TITLE)
    }

    pub fn success_message(&self) -> &str {
        non_empty_or(&self.success_message, Self::DEFAULT_SUCCESS_MESSAGE)
    }
}

fn non_empty_or<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
    value.as_deref().filter(|v| !v.is_empty()).unwrap_or(fallback)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "component", rename = "nav_item")]
pub struct NavItem {
    #[serde(rename = "_uid")]
    pub uid: String,
    pub label: String,
    pub link: Link,
}

impl NavItem {
    fn read(cx: &mut Context, f: &Fields<'_>) -> Self {
        Self {
            uid: f.uid(cx),
            label: f.required_text(cx, "label", TextRule::REQUIRED),
            link: f.required_link(cx, "link"),
        }
    }
}

/// Root content of a page story.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "component", rename = "page")]
pub struct Page {
    #[serde(rename = "_uid")]
    pub uid: String,
    pub body: Vec<Block>,
    pub seo_title: String,
    pub seo_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_image: Option<Asset>,
}

impl Page {
    pub(crate) fn read(cx: &mut Context, f: &Fields<'_>) -> Self {
        Self {
            uid: f.uid(cx),
            body: f.blocks(cx, "body", PAGE_SECTIONS, Cardinality::ANY),
            seo_title: f.required_text(cx, "seo_title", TextRule::between(1, 60)),
            seo_description: f.required_text(cx, "seo_description", TextRule::between(1, 160)),
            og_image: f.asset(cx, "og_image"),
        }
    }
}

// GlobalSettings lives in `settings.rs`; it is also a block so it can be validated standalone.
pub use crate::settings::GlobalSettings;

/// Any validated content block.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Block {
    HeroSection(HeroSection),
    FeatureBlock(FeatureBlock),
    FeaturesSection(FeaturesSection),
    StatBlock(StatBlock),
    ClinicalDataSection(ClinicalDataSection),
    ResourceLink(ResourceLink),
    InvestorResourcesSection(InvestorResourcesSection),
    FooterLink(FooterLink),
    FooterSection(FooterSection),
    ContactFormSection(ContactFormSection),
    NavItem(NavItem),
    GlobalSettings(GlobalSettings),
    Page(Page),
}

impl Block {
    pub fn component(&self) -> Component {
        match self {
            Block::HeroSection(_) => Component::HeroSection,
            Block::FeatureBlock(_) => Component::FeatureBlock,
            Block::FeaturesSection(_) => Component::FeaturesSection,
            Block::StatBlock(_) => Component::StatBlock,
            Block::ClinicalDataSection(_) => Component::ClinicalDataSection,
            Block::ResourceLink(_) => Component::ResourceLink,
            Block::InvestorResourcesSection(_) => Component::InvestorResourcesSection,
            Block::FooterLink(_) => Component::FooterLink,
            Block::FooterSection(_) => Component::FooterSection,
            Block::ContactFormSection(_) => Component::ContactFormSection,
            Block::NavItem(_) => Component::NavItem,
            Block::GlobalSettings(_) => Component::GlobalSettings,
            Block::Page(_) => Component::Page,
        }
    }

    pub fn uid(&self) -> &str {
        match self {
            Block::HeroSection(b) => &b.uid,
            Block::FeatureBlock(b) => &b.uid,
            Block::FeaturesSection(b) => &b.uid,
            Block::StatBlock(b) => &b.uid,
            Block::ClinicalDataSection(b) => &b.uid,
            Block::ResourceLink(b) => &b.uid,
            Block::InvestorResourcesSection(b) => &b.uid,
            Block::FooterLink(b) => &b.uid,
            Block::FooterSection(b) => &b.uid,
            Block::ContactFormSection(b) => &b.uid,
            Block::NavItem(b) => &b.uid,
            Block::GlobalSettings(b) => &b.uid,
            Block::Page(b) => &b.uid,
        }
    }

    /// Reads a block whose discriminator has already been checked.
    pub(crate) fn read(cx: &mut Context, component: Component, f: &Fields<'_>) -> Self {
        match component {
            Component::HeroSection => Block::HeroSection(HeroSection::read(cx, f)),
            Component::FeatureBlock => Block::FeatureBlock(FeatureBlock::read(cx, f)),
            Component::FeaturesSection => Block::FeaturesSection(FeaturesSection::read(cx, f)),
            Component::StatBlock => Block::StatBlock(StatBlock::read(cx, f)),
            Component::ClinicalDataSection => {
                Block::ClinicalDataSection(ClinicalDataSection::read(cx, f))
            }
            Component::ResourceLink => Block::ResourceLink(ResourceLink::read(cx, f)),
            Component::InvestorResourcesSection => {
                Block::InvestorResourcesSection(InvestorResourcesSection::read(cx, f))
            }
            Component::FooterLink => Block::FooterLink(FooterLink::read(cx, f)),
            Component::FooterSection => Block::FooterSection(FooterSection::read(cx, f)),
            Component::ContactFormSection => {
                Block::ContactFormSection(ContactFormSection::read(cx, f))
            }
            Component::NavItem => Block::NavItem(NavItem::read(cx, f)),
            Component::GlobalSettings => Block::GlobalSettings(GlobalSettings::read(cx, f)),
            Component::Page => Block::Page(Page::read(cx, f)),
        }
    }

    /// Validates one child of a whitelisted block list.
    ///
    /// A child that cannot be typed (not an object, missing or unknown discriminator) or that
    /// is not in `allowed` rejects only its own position: the problem is reported at `path` and
    /// `None` is returned, leaving the parent to carry on with its siblings.
    pub(crate) fn validate_nested(
        cx: &mut Context,
        value: &Value,
        path: &str,
        allowed: &[Component],
    ) -> Option<Self> {
        let Some(map) = value.as_object() else {
            cx.report(path, ViolationKind::WrongType { expected: "block object" });
            return None;
        };

        let component = match read_component(map, path) {
            Ok(component) => component,
            Err(StructuralError::UnknownComponent { component, .. }) => {
                cx.report(path, ViolationKind::UnknownComponent { component });
                return None;
            }
            Err(_) => {
                cx.report(path, ViolationKind::MissingComponent);
                return None;
            }
        };

        if !allowed.contains(&component) {
            cx.report(
                child_path(path, "component"),
                ViolationKind::ComponentNotAllowed {
                    component: component.as_str().to_string(),
                },
            );
            return None;
        }

        Some(Block::read(cx, component, &Fields::new(map, path)))
    }
}

/// Validates any single block against the schema its own discriminator selects.
pub fn validate_block(raw: &Value) -> Result<Block, ValidationFailure> {
    let map = raw.as_object().ok_or_else(|| StructuralError::NotAnObject {
        path: String::new(),
    })?;
    let component = read_component(map, "")?;

    let mut cx = Context::new();
    let block = Block::read(&mut cx, component, &Fields::new(map, ""));
    cx.finish(block)
}
