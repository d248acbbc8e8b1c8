//! Fallback policy: turning a validation outcome into something a renderer can use.
//!
//! Under [`FallbackPolicy::Lenient`] a document that fails field constraints is still served,
//! as its original raw payload, together with the structured errors. Under
//! [`FallbackPolicy::Strict`] it is rejected. Structural failures are rejected under both.

use crate::blocks::{validate_block, Block};
use crate::error::{ValidationError, ValidationErrors, ValidationFailure};
use crate::settings::{validate_global_settings, GlobalSettings};
use crate::story::{validate_story, Story};
use crate::SchemaError;
use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;

/// What to do with a document that violates field constraints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Log the violations and serve the raw payload.
    #[default]
    Lenient,
    /// Refuse the document.
    Strict,
}

impl FallbackPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            FallbackPolicy::Lenient => "lenient",
            FallbackPolicy::Strict => "strict",
        }
    }
}

/// A validation mode name other than `lenient` or `strict`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown validation mode '{0}' (expected 'lenient' or 'strict')")]
pub struct UnknownPolicy(pub String);

impl FromStr for FallbackPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(FallbackPolicy::Lenient),
            "strict" => Ok(FallbackPolicy::Strict),
            other => Err(UnknownPolicy(other.to_string())),
        }
    }
}

/// The outcome of validating a document under a fallback policy.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolved<T> {
    /// The document passed every constraint.
    Valid(T),
    /// The document failed field constraints and is passed through untyped.
    Fallback {
        raw: Value,
        errors: ValidationErrors,
    },
}

impl<T> Resolved<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, Resolved::Valid(_))
    }

    pub fn valid(&self) -> Option<&T> {
        match self {
            Resolved::Valid(value) => Some(value),
            Resolved::Fallback { .. } => None,
        }
    }

    pub fn into_valid(self) -> Option<T> {
        match self {
            Resolved::Valid(value) => Some(value),
            Resolved::Fallback { .. } => None,
        }
    }

    /// Violations behind a fallback; empty for a valid document.
    pub fn errors(&self) -> &[ValidationError] {
        match self {
            Resolved::Valid(_) => &[],
            Resolved::Fallback { errors, .. } => errors.as_slice(),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolved<U> {
        match self {
            Resolved::Valid(value) => Resolved::Valid(f(value)),
            Resolved::Fallback { raw, errors } => Resolved::Fallback { raw, errors },
        }
    }
}

impl<T: Serialize> Resolved<T> {
    /// The document as CMS-shaped JSON: the normalised typed value, or the raw fallback.
    pub fn to_json(&self) -> Result<Value, SchemaError> {
        match self {
            Resolved::Valid(value) => Ok(serde_json::to_value(value)?),
            Resolved::Fallback { raw, .. } => Ok(raw.clone()),
        }
    }
}

fn apply_policy<T>(
    resource: &str,
    raw: &Value,
    outcome: Result<T, ValidationFailure>,
    policy: FallbackPolicy,
) -> Result<Resolved<T>, SchemaError> {
    match outcome {
        Ok(value) => Ok(Resolved::Valid(value)),
        Err(ValidationFailure::Structural(err)) => {
            tracing::error!(resource, error = %err, "content is structurally invalid");
            Err(SchemaError::Structural(err))
        }
        Err(ValidationFailure::Invalid(errors)) => {
            for error in &errors {
                tracing::warn!(
                    resource,
                    path = %error.path,
                    kind = %error.kind,
                    policy = policy.as_str(),
                    "content validation failed"
                );
            }
            match policy {
                FallbackPolicy::Lenient => Ok(Resolved::Fallback {
                    raw: raw.clone(),
                    errors,
                }),
                FallbackPolicy::Strict => Err(SchemaError::Rejected(errors)),
            }
        }
    }
}

/// Validates a story and applies `policy` to any field violations.
pub fn resolve_story(raw: &Value, policy: FallbackPolicy) -> Result<Resolved<Story>, SchemaError> {
    let resource = raw
        .get("full_slug")
        .and_then(Value::as_str)
        .unwrap_or("<unknown story>");
    apply_policy(resource, raw, validate_story(raw), policy)
}

/// Validates the settings content and applies `policy` to any field violations.
pub fn resolve_global_settings(
    raw: &Value,
    policy: FallbackPolicy,
) -> Result<Resolved<GlobalSettings>, SchemaError> {
    apply_policy("global_settings", raw, validate_global_settings(raw), policy)
}

/// Validates a single block and applies `policy` to any field violations.
pub fn resolve_block(raw: &Value, policy: FallbackPolicy) -> Result<Resolved<Block>, SchemaError> {
    let resource = raw
        .get("component")
        .and_then(Value::as_str)
        .unwrap_or("<block>");
    apply_policy(resource, raw, validate_block(raw), policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{StructuralError, ViolationKind};
    use crate::story::tests::home_story;
    use serde_json::json;

    fn story_missing_disclaimer() -> Value {
        let mut raw = home_story();
        raw["content"]["body"][0]
            .as_object_mut()
            .expect("hero object")
            .remove("legal_disclaimer");
        raw
    }

    #[test]
    fn valid_story_resolves_typed() {
        let resolved = resolve_story(&home_story(), FallbackPolicy::Lenient).expect("resolved");
        assert!(resolved.is_valid());
        assert!(resolved.errors().is_empty());
        assert_eq!(resolved.valid().expect("typed").slug, "home");
    }

    #[test]
    fn lenient_policy_passes_raw_through_unchanged() {
        let raw = story_missing_disclaimer();
        let resolved = resolve_story(&raw, FallbackPolicy::Lenient).expect("fallback");

        match &resolved {
            Resolved::Fallback { raw: passed, errors } => {
                assert_eq!(passed, &raw);
                assert_eq!(errors.len(), 1);
                assert_eq!(errors.as_slice()[0].kind, ViolationKind::Missing);
            }
            Resolved::Valid(_) => panic!("expected fallback"),
        }
        assert_eq!(resolved.to_json().expect("json"), raw);
    }

    #[test]
    fn strict_policy_rejects_with_the_same_errors() {
        let err = resolve_story(&story_missing_disclaimer(), FallbackPolicy::Strict)
            .expect_err("strict rejects");
        match err {
            SchemaError::Rejected(errors) => {
                assert_eq!(errors.at("content.body.0.legal_disclaimer").count(), 1);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn structural_errors_never_fall_back() {
        let raw = json!({ "_uid": "x", "component": "carousel" });
        for policy in [FallbackPolicy::Lenient, FallbackPolicy::Strict] {
            let err = resolve_block(&raw, policy).expect_err("structural");
            assert!(matches!(
                err,
                SchemaError::Structural(StructuralError::UnknownComponent { .. })
            ));
        }

        let err = resolve_global_settings(&json!([]), FallbackPolicy::Lenient)
            .expect_err("structural");
        assert!(matches!(
            err,
            SchemaError::Structural(StructuralError::NotAnObject { .. })
        ));
    }

    fn settings_with_unlabelled_nav_item() -> Value {
        json!({
            "_uid": "settings",
            "component": "global_settings",
            "copyright": "© 2025 NexusBio",
            "navigation": [
                { "_uid": "n1", "component": "nav_item", "link": { "url": "/pipeline" } }
            ]
        })
    }

    #[test]
    fn lenient_settings_fall_back_to_raw() {
        let raw = settings_with_unlabelled_nav_item();
        let resolved = resolve_global_settings(&raw, FallbackPolicy::Lenient).expect("fallback");

        match resolved {
            Resolved::Fallback { raw: passed, errors } => {
                assert_eq!(passed, raw);
                let missing: Vec<_> = errors.at("navigation.0.label").collect();
                assert_eq!(missing.len(), 1);
                assert_eq!(missing[0].kind, ViolationKind::Missing);
                assert_eq!(
                    missing[0].to_string(),
                    "navigation.0.label: required field is missing"
                );
            }
            Resolved::Valid(_) => panic!("expected fallback"),
        }
    }

    #[test]
    fn strict_settings_are_rejected() {
        let err = resolve_global_settings(&settings_with_unlabelled_nav_item(), FallbackPolicy::Strict)
            .expect_err("strict rejects");
        assert!(matches!(err, SchemaError::Rejected(ref errors) if errors.len() == 1));
    }

    #[test]
    fn resolve_is_idempotent_for_valid_documents() {
        let first = resolve_story(&home_story(), FallbackPolicy::Strict).expect("valid");
        let json = first.to_json().expect("json");
        let second = resolve_story(&json, FallbackPolicy::Strict).expect("still valid");
        assert_eq!(first, second);
        assert_eq!(second.to_json().expect("json"), json);
    }

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!("STRICT".parse::<FallbackPolicy>(), Ok(FallbackPolicy::Strict));
        assert_eq!(" lenient ".parse::<FallbackPolicy>(), Ok(FallbackPolicy::Lenient));
        assert_eq!(
            "Loose".parse::<FallbackPolicy>(),
            Err(UnknownPolicy("loose".into()))
        );
        assert_eq!(FallbackPolicy::default(), FallbackPolicy::Lenient);
    }

    #[test]
    fn map_keeps_fallback_payload() {
        let resolved: Resolved<u32> = Resolved::Fallback {
            raw: json!({ "a": 1 }),
            errors: ValidationErrors::default(),
        };
        let mapped = resolved.map(|n| n.to_string());
        assert!(!mapped.is_valid());
        assert!(mapped.into_valid().is_none());
    }
}
