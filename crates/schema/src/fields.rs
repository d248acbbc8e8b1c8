//! Field readers used by every block validator.
//!
//! A [`Fields`] wraps one JSON object at a known path and reads typed fields out of it. Every
//! read reports violations into the shared [`Context`] and always returns a value, so a single
//! pass walks the whole document and collects every problem.

use crate::blocks::{Block, Component};
use crate::common::{Asset, Link};
use crate::error::{child_path, ValidationError, ValidationErrors, ValidationFailure, ViolationKind};
use crate::richtext::RichtextNode;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::HashSet;
use uuid::Uuid;

/// Mutable state for one validation pass over a content tree.
#[derive(Debug, Default)]
pub(crate) struct Context {
    errors: Vec<ValidationError>,
    uids: HashSet<String>,
}

impl Context {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn report(&mut self, path: impl Into<String>, kind: ViolationKind) {
        self.errors.push(ValidationError::new(path, kind));
    }

    /// Records a block `_uid`; returns false if it was already seen in this tree.
    fn claim_uid(&mut self, uid: &str) -> bool {
        self.uids.insert(uid.to_string())
    }

    /// Returns `value` if no violations were reported during the pass.
    pub(crate) fn finish<T>(self, value: T) -> Result<T, ValidationFailure> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(ValidationFailure::Invalid(ValidationErrors::from_vec(
                self.errors,
            )))
        }
    }
}

/// Character-count bounds for a text field.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TextRule {
    pub min: usize,
    pub max: Option<usize>,
}

impl TextRule {
    /// Non-empty, unbounded.
    pub const REQUIRED: TextRule = TextRule { min: 1, max: None };
    /// Any length.
    pub const ANY: TextRule = TextRule { min: 0, max: None };

    pub const fn between(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    pub const fn at_most(max: usize) -> Self {
        Self {
            min: 0,
            max: Some(max),
        }
    }
}

/// Count bounds for a nested block list.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Cardinality {
    pub min: usize,
    pub max: Option<usize>,
}

impl Cardinality {
    pub const ANY: Cardinality = Cardinality { min: 0, max: None };

    pub const fn between(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }
}

/// An enumerated option field (CMS `option` type).
pub(crate) trait OptionSet: Sized + Copy {
    const VALUES: &'static [&'static str];

    fn from_value(value: &str) -> Option<Self>;
}

/// Reads typed fields out of one JSON object.
pub(crate) struct Fields<'a> {
    map: &'a Map<String, Value>,
    path: String,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(map: &'a Map<String, Value>, path: impl Into<String>) -> Self {
        Self {
            map,
            path: path.into(),
        }
    }

    pub(crate) fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn path_of(&self, key: &str) -> String {
        child_path(&self.path, key)
    }

    /// Returns the raw value for `key`, treating JSON `null` as absent.
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn check_length(&self, cx: &mut Context, key: &str, value: &str, rule: TextRule) {
        let actual = value.chars().count();
        if actual < rule.min {
            cx.report(
                self.path_of(key),
                ViolationKind::TooShort {
                    min: rule.min,
                    actual,
                },
            );
        }
        if let Some(max) = rule.max {
            if actual > max {
                cx.report(self.path_of(key), ViolationKind::TooLong { max, actual });
            }
        }
    }

    fn string_value(&self, cx: &mut Context, key: &str) -> Option<&'a str> {
        match self.get(key)? {
            Value::String(s) => Some(s.as_str()),
            _ => {
                cx.report(
                    self.path_of(key),
                    ViolationKind::WrongType { expected: "string" },
                );
                None
            }
        }
    }

    /// The block's `_uid`: required, non-empty, unique within the tree.
    pub(crate) fn uid(&self, cx: &mut Context) -> String {
        let uid = self.required_text(cx, "_uid", TextRule::REQUIRED);
        if !uid.is_empty() && !cx.claim_uid(&uid) {
            cx.report(
                self.path_of("_uid"),
                ViolationKind::DuplicateUid { uid: uid.clone() },
            );
        }
        uid
    }

    pub(crate) fn required_text(&self, cx: &mut Context, key: &str, rule: TextRule) -> String {
        if self.get(key).is_none() {
            cx.report(self.path_of(key), ViolationKind::Missing);
            return String::new();
        }
        match self.string_value(cx, key) {
            Some(value) => {
                self.check_length(cx, key, value, rule);
                value.to_string()
            }
            None => String::new(),
        }
    }

    pub(crate) fn optional_text(
        &self,
        cx: &mut Context,
        key: &str,
        rule: TextRule,
    ) -> Option<String> {
        let value = self.string_value(cx, key)?;
        self.check_length(cx, key, value, rule);
        Some(value.to_string())
    }

    /// Resolves an absent field to `default` before the length rule is applied.
    pub(crate) fn text_or_default(
        &self,
        cx: &mut Context,
        key: &str,
        default: &str,
        rule: TextRule,
    ) -> String {
        let value = if self.get(key).is_none() {
            default
        } else {
            match self.string_value(cx, key) {
                Some(value) => value,
                None => return default.to_string(),
            }
        };
        self.check_length(cx, key, value, rule);
        value.to_string()
    }

    pub(crate) fn bool_or_default(&self, cx: &mut Context, key: &str, default: bool) -> bool {
        match self.get(key) {
            None => default,
            Some(Value::Bool(b)) => *b,
            Some(_) => {
                cx.report(
                    self.path_of(key),
                    ViolationKind::WrongType { expected: "boolean" },
                );
                default
            }
        }
    }

    fn option_value<O: OptionSet>(&self, cx: &mut Context, key: &str) -> Option<O> {
        let value = self.string_value(cx, key)?;
        let parsed = O::from_value(value);
        if parsed.is_none() {
            cx.report(
                self.path_of(key),
                ViolationKind::NotInSet {
                    allowed: O::VALUES,
                    actual: value.to_string(),
                },
            );
        }
        parsed
    }

    pub(crate) fn required_option<O: OptionSet>(&self, cx: &mut Context, key: &str) -> Option<O> {
        if self.get(key).is_none() {
            cx.report(self.path_of(key), ViolationKind::Missing);
            return None;
        }
        self.option_value(cx, key)
    }

    pub(crate) fn option_or_default<O: OptionSet>(
        &self,
        cx: &mut Context,
        key: &str,
        default: O,
    ) -> O {
        if self.get(key).is_none() {
            return default;
        }
        self.option_value(cx, key).unwrap_or(default)
    }

    /// An asset field; `null` is the same as absent and never a violation.
    pub(crate) fn asset(&self, cx: &mut Context, key: &str) -> Option<Asset> {
        let value = self.get(key)?;
        Asset::from_value(cx, value, &self.path_of(key))
    }

    pub(crate) fn required_link(&self, cx: &mut Context, key: &str) -> Link {
        match self.get(key) {
            None => {
                cx.report(self.path_of(key), ViolationKind::Missing);
                Link::default()
            }
            Some(value) => Link::from_value(cx, value, &self.path_of(key)).unwrap_or_default(),
        }
    }

    pub(crate) fn required_richtext(&self, cx: &mut Context, key: &str) -> RichtextNode {
        let Some(value) = self.get(key) else {
            cx.report(self.path_of(key), ViolationKind::Missing);
            return RichtextNode::empty_doc();
        };
        match RichtextNode::from_value(cx, value, &self.path_of(key)) {
            Some(node) => {
                if !node.has_text() {
                    cx.report(self.path_of(key), ViolationKind::EmptyRichtext);
                }
                node
            }
            None => RichtextNode::empty_doc(),
        }
    }

    pub(crate) fn optional_richtext(&self, cx: &mut Context, key: &str) -> Option<RichtextNode> {
        let value = self.get(key)?;
        RichtextNode::from_value(cx, value, &self.path_of(key))
    }

    /// A nested block list restricted to `allowed` components.
    ///
    /// Children that fail structurally (not an object, missing or unknown discriminator) or
    /// are not whitelisted are reported at their own index and left out of the result.
    pub(crate) fn blocks(
        &self,
        cx: &mut Context,
        key: &str,
        allowed: &[Component],
        cardinality: Cardinality,
    ) -> Vec<Block> {
        let list_path = self.path_of(key);
        let items = match self.get(key) {
            None => &[][..],
            Some(Value::Array(items)) => items.as_slice(),
            Some(_) => {
                cx.report(list_path, ViolationKind::WrongType { expected: "array" });
                return Vec::new();
            }
        };

        let actual = items.len();
        if actual < cardinality.min {
            cx.report(
                list_path.clone(),
                ViolationKind::TooFewBlocks {
                    min: cardinality.min,
                    actual,
                },
            );
        }
        if let Some(max) = cardinality.max {
            if actual > max {
                cx.report(list_path.clone(), ViolationKind::TooManyBlocks { max, actual });
            }
        }

        items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                Block::validate_nested(cx, item, &child_path(&list_path, &i.to_string()), allowed)
            })
            .collect()
    }

    /// A list of plain strings; absent means empty.
    pub(crate) fn string_list(&self, cx: &mut Context, key: &str) -> Vec<String> {
        let items = match self.get(key) {
            None => return Vec::new(),
            Some(Value::Array(items)) => items,
            Some(_) => {
                cx.report(self.path_of(key), ViolationKind::WrongType { expected: "array" });
                return Vec::new();
            }
        };

        items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| match item {
                Value::String(s) => Some(s.clone()),
                _ => {
                    cx.report(
                        child_path(&self.path_of(key), &i.to_string()),
                        ViolationKind::WrongType { expected: "string" },
                    );
                    None
                }
            })
            .collect()
    }

    pub(crate) fn required_u64(&self, cx: &mut Context, key: &str) -> u64 {
        match self.get(key) {
            None => {
                cx.report(self.path_of(key), ViolationKind::Missing);
                0
            }
            Some(value) => value.as_u64().unwrap_or_else(|| {
                cx.report(
                    self.path_of(key),
                    ViolationKind::WrongType {
                        expected: "unsigned integer",
                    },
                );
                0
            }),
        }
    }

    pub(crate) fn optional_u64(&self, cx: &mut Context, key: &str) -> Option<u64> {
        let value = self.get(key)?;
        let parsed = value.as_u64();
        if parsed.is_none() {
            cx.report(
                self.path_of(key),
                ViolationKind::WrongType {
                    expected: "unsigned integer",
                },
            );
        }
        parsed
    }

    pub(crate) fn required_uuid(&self, cx: &mut Context, key: &str) -> Uuid {
        let raw = self.required_text(cx, key, TextRule::ANY);
        if raw.is_empty() {
            return Uuid::nil();
        }
        Uuid::parse_str(&raw).unwrap_or_else(|_| {
            cx.report(self.path_of(key), ViolationKind::InvalidUuid { value: raw });
            Uuid::nil()
        })
    }

    fn parse_timestamp(&self, cx: &mut Context, key: &str, raw: &str) -> Option<DateTime<Utc>> {
        match DateTime::parse_from_rfc3339(raw) {
            Ok(ts) => Some(ts.with_timezone(&Utc)),
            Err(_) => {
                cx.report(
                    self.path_of(key),
                    ViolationKind::InvalidTimestamp {
                        value: raw.to_string(),
                    },
                );
                None
            }
        }
    }

    pub(crate) fn required_timestamp(&self, cx: &mut Context, key: &str) -> DateTime<Utc> {
        let raw = self.required_text(cx, key, TextRule::ANY);
        if raw.is_empty() {
            return DateTime::<Utc>::default();
        }
        self.parse_timestamp(cx, key, &raw)
            .unwrap_or(DateTime::<Utc>::default())
    }

    /// A nullable timestamp; `null` means "not yet published".
    pub(crate) fn nullable_timestamp(&self, cx: &mut Context, key: &str) -> Option<DateTime<Utc>> {
        let raw = self.string_value(cx, key)?;
        self.parse_timestamp(cx, key, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn with_fields<T>(value: Value, f: impl FnOnce(&mut Context, &Fields<'_>) -> T) -> (T, Vec<ValidationError>) {
        let map = value.as_object().expect("fixture must be an object").clone();
        let fields = Fields::new(&map, "blok");
        let mut cx = Context::new();
        let out = f(&mut cx, &fields);
        (out, cx.errors)
    }

    #[test]
    fn required_text_reports_missing_and_null_alike() {
        let (_, errors) = with_fields(json!({ "b": null }), |cx, f| {
            f.required_text(cx, "a", TextRule::REQUIRED);
            f.required_text(cx, "b", TextRule::REQUIRED);
        });
        assert_eq!(
            errors,
            vec![
                ValidationError::new("blok.a", ViolationKind::Missing),
                ValidationError::new("blok.b", ViolationKind::Missing),
            ]
        );
    }

    #[test]
    fn required_text_counts_characters_not_bytes() {
        let (value, errors) = with_fields(json!({ "t": "héllo" }), |cx, f| {
            f.required_text(cx, "t", TextRule::between(1, 5))
        });
        assert_eq!(value, "héllo");
        assert!(errors.is_empty());
    }

    #[test]
    fn empty_string_violates_minimum() {
        let (_, errors) = with_fields(json!({ "t": "" }), |cx, f| {
            f.required_text(cx, "t", TextRule::between(1, 10))
        });
        assert_eq!(
            errors,
            vec![ValidationError::new(
                "blok.t",
                ViolationKind::TooShort { min: 1, actual: 0 }
            )]
        );
    }

    #[test]
    fn default_is_checked_like_a_supplied_value() {
        let (value, errors) = with_fields(json!({}), |cx, f| {
            f.text_or_default(cx, "cta", "A default that is far too long", TextRule::at_most(5))
        });
        assert_eq!(value, "A default that is far too long");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0].kind, ViolationKind::TooLong { max: 5, .. }));
    }

    #[test]
    fn bool_default_applies_when_absent() {
        let (value, errors) = with_fields(json!({}), |cx, f| f.bool_or_default(cx, "flag", true));
        assert!(value);
        assert!(errors.is_empty());
    }

    #[test]
    fn wrong_type_is_reported() {
        let (_, errors) = with_fields(json!({ "flag": "yes", "t": 3 }), |cx, f| {
            f.bool_or_default(cx, "flag", false);
            f.optional_text(cx, "t", TextRule::ANY);
        });
        assert_eq!(
            errors,
            vec![
                ValidationError::new("blok.flag", ViolationKind::WrongType { expected: "boolean" }),
                ValidationError::new("blok.t", ViolationKind::WrongType { expected: "string" }),
            ]
        );
    }

    #[test]
    fn nullable_timestamp_accepts_null() {
        let (value, errors) = with_fields(json!({ "published_at": null }), |cx, f| {
            f.nullable_timestamp(cx, "published_at")
        });
        assert!(value.is_none());
        assert!(errors.is_empty());
    }

    #[test]
    fn invalid_timestamp_is_reported() {
        let (_, errors) = with_fields(json!({ "created_at": "yesterday" }), |cx, f| {
            f.required_timestamp(cx, "created_at")
        });
        assert_eq!(
            errors,
            vec![ValidationError::new(
                "blok.created_at",
                ViolationKind::InvalidTimestamp {
                    value: "yesterday".into()
                }
            )]
        );
    }

    #[test]
    fn duplicate_uid_is_reported_once_per_reuse() {
        let map_a = json!({ "_uid": "same" });
        let map_b = json!({ "_uid": "same" });
        let mut cx = Context::new();
        let a = map_a.as_object().expect("object");
        let b = map_b.as_object().expect("object");
        Fields::new(a, "a").uid(&mut cx);
        Fields::new(b, "b").uid(&mut cx);

        assert_eq!(
            cx.errors,
            vec![ValidationError::new(
                "b._uid",
                ViolationKind::DuplicateUid { uid: "same".into() }
            )]
        );
    }
}
