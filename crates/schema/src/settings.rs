//! Site-wide settings (navigation, logo, footer) stored as a `global_settings` story.

use crate::blocks::{expect_root, Block, Component, NavItem};
use crate::common::Asset;
use crate::error::ValidationFailure;
use crate::fields::{Cardinality, Context, Fields, TextRule};
use crate::richtext::RichtextNode;
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "component", rename = "global_settings")]
pub struct GlobalSettings {
    #[serde(rename = "_uid")]
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<Asset>,
    pub navigation: Vec<NavItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer_text: Option<RichtextNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
}

impl GlobalSettings {
    pub(crate) fn read(cx: &mut Context, f: &Fields<'_>) -> Self {
        Self {
            uid: f.uid(cx),
            logo: f.asset(cx, "logo"),
            navigation: f
                .blocks(cx, "navigation", &[Component::NavItem], Cardinality::ANY)
                .into_iter()
                .filter_map(|b| match b {
                    Block::NavItem(item) => Some(item),
                    _ => None,
                })
                .collect(),
            footer_text: f.optional_richtext(cx, "footer_text"),
            contact_email: f.optional_text(cx, "contact_email", TextRule::ANY),
            copyright: f.optional_text(cx, "copyright", TextRule::ANY),
        }
    }
}

/// Validates the content object of the settings story.
pub fn validate_global_settings(raw: &Value) -> Result<GlobalSettings, ValidationFailure> {
    let map = expect_root(raw, "", Component::GlobalSettings)?;
    let mut cx = Context::new();
    let settings = GlobalSettings::read(&mut cx, &Fields::new(map, ""));
    cx.finish(settings)
}
