//! Asset and link field types shared by several blocks.

use crate::error::{child_path, ViolationKind};
use crate::fields::Context;
use serde::Serialize;
use serde_json::Value;

/// Host serving CMS-managed images through the image service.
const IMAGE_SERVICE_HOST: &str = "a.storyblok.com";

/// An uploaded CMS asset (image or document).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Asset {
    pub filename: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

impl Asset {
    /// Validates a non-null asset value.
    ///
    /// An asset object with an empty `filename` is what the CMS sends for a cleared asset field,
    /// so it is treated the same as `null`: absent, not a violation.
    pub(crate) fn from_value(cx: &mut Context, value: &Value, path: &str) -> Option<Self> {
        let Some(map) = value.as_object() else {
            cx.report(path, ViolationKind::WrongType { expected: "asset object" });
            return None;
        };

        let filename = match map.get("filename") {
            Some(Value::String(f)) if f.is_empty() => return None,
            Some(Value::String(f)) => f.clone(),
            None | Some(Value::Null) => return None,
            Some(_) => {
                cx.report(
                    child_path(path, "filename"),
                    ViolationKind::WrongType { expected: "string" },
                );
                return None;
            }
        };

        let alt = match map.get("alt") {
            None | Some(Value::Null) => None,
            Some(Value::String(a)) => Some(a.clone()),
            Some(_) => {
                cx.report(
                    child_path(path, "alt"),
                    ViolationKind::WrongType { expected: "string" },
                );
                None
            }
        };

        Some(Self { filename, alt })
    }

    /// Builds a resized WebP URL through the CMS image service.
    ///
    /// Height is left at `0` so the service keeps the aspect ratio. Assets hosted elsewhere are
    /// returned unchanged.
    pub fn image_url(&self, width: u32, quality: Option<u8>) -> String {
        if !self.filename.contains(IMAGE_SERVICE_HOST) {
            return self.filename.clone();
        }
        let filters = match quality {
            Some(q) => format!("/filters:quality({q}):format(webp)"),
            None => "/filters:format(webp)".to_string(),
        };
        format!("{}/m/{width}x0{filters}", self.filename)
    }
}

/// A CMS multilink (internal story, external URL, email or asset).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Link {
    pub linktype: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl Default for Link {
    fn default() -> Self {
        Self {
            linktype: "url".into(),
            url: None,
            cached_url: None,
            target: None,
        }
    }
}

impl Link {
    pub(crate) fn from_value(cx: &mut Context, value: &Value, path: &str) -> Option<Self> {
        let Some(map) = value.as_object() else {
            cx.report(path, ViolationKind::WrongType { expected: "link object" });
            return None;
        };

        let mut text = |key: &str| match map.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                cx.report(
                    child_path(path, key),
                    ViolationKind::WrongType { expected: "string" },
                );
                None
            }
        };

        Some(Self {
            linktype: text("linktype").unwrap_or_else(|| "url".into()),
            url: text("url"),
            cached_url: text("cached_url"),
            target: text("target"),
        })
    }

    /// The navigable destination, or `None` if the link is empty.
    ///
    /// A non-empty `url` wins over `cached_url`. Story links become root-relative paths and email
    /// links get a `mailto:` prefix.
    pub fn href(&self) -> Option<String> {
        let destination = self
            .url
            .as_deref()
            .filter(|u| !u.is_empty())
            .or_else(|| self.cached_url.as_deref().filter(|u| !u.is_empty()))?;

        Some(match self.linktype.as_str() {
            "email" if !destination.starts_with("mailto:") => format!("mailto:{destination}"),
            "story" if !destination.starts_with('/') => format!("/{destination}"),
            _ => destination.to_string(),
        })
    }

    /// Returns true if the link opens in a new browsing context.
    pub fn opens_new_tab(&self) -> bool {
        self.target.as_deref() == Some("_blank")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_filename_is_an_absent_asset() {
        let mut cx = Context::new();
        let asset = Asset::from_value(&mut cx, &json!({ "id": null, "filename": "" }), "logo");
        assert!(asset.is_none());
        assert!(cx.finish(()).is_ok());
    }

    #[test]
    fn asset_keeps_filename_and_alt() {
        let mut cx = Context::new();
        let asset = Asset::from_value(
            &mut cx,
            &json!({ "filename": "https://a.storyblok.com/f/1/logo.png", "alt": "NexusBio", "id": 7 }),
            "logo",
        )
        .expect("asset");
        assert_eq!(asset.alt.as_deref(), Some("NexusBio"));
        assert!(cx.finish(()).is_ok());
    }

    #[test]
    fn non_object_asset_is_reported() {
        let mut cx = Context::new();
        assert!(Asset::from_value(&mut cx, &json!("logo.png"), "logo").is_none());
        assert!(cx.finish(()).is_err());
    }

    #[test]
    fn image_url_uses_image_service_for_cms_assets() {
        let asset = Asset {
            filename: "https://a.storyblok.com/f/1/hero.jpg".into(),
            alt: None,
        };
        assert_eq!(
            asset.image_url(1920, Some(75)),
            "https://a.storyblok.com/f/1/hero.jpg/m/1920x0/filters:quality(75):format(webp)"
        );
        assert_eq!(
            asset.image_url(640, None),
            "https://a.storyblok.com/f/1/hero.jpg/m/640x0/filters:format(webp)"
        );
    }

    #[test]
    fn image_url_leaves_external_assets_alone() {
        let asset = Asset {
            filename: "https://cdn.example.com/hero.jpg".into(),
            alt: None,
        };
        assert_eq!(asset.image_url(800, Some(80)), "https://cdn.example.com/hero.jpg");
    }

    #[test]
    fn link_defaults_linktype_and_resolves_href() {
        let mut cx = Context::new();
        let link = Link::from_value(&mut cx, &json!({ "url": "#data" }), "cta_link").expect("link");
        assert_eq!(link.linktype, "url");
        assert_eq!(link.href().as_deref(), Some("#data"));
    }

    #[test]
    fn story_and_email_links_are_normalised() {
        let story = Link {
            linktype: "story".into(),
            url: Some(String::new()),
            cached_url: Some("investors".into()),
            target: None,
        };
        assert_eq!(story.href().as_deref(), Some("/investors"));

        let email = Link {
            linktype: "email".into(),
            url: Some("ir@nexusbio.com".into()),
            cached_url: None,
            target: None,
        };
        assert_eq!(email.href().as_deref(), Some("mailto:ir@nexusbio.com"));
    }

    #[test]
    fn empty_link_has_no_href() {
        assert!(Link::default().href().is_none());
    }
}
