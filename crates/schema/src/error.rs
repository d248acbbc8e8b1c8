//! Validation error types.
//!
//! Two families of failure are kept apart:
//! - [`StructuralError`]: the payload has no usable typed shape at all (not an object, no
//!   discriminator, unknown discriminator at the root). These are always reported and can never
//!   be degraded into a fallback.
//! - [`ValidationError`]: a field-level constraint violation at a dotted path. These are
//!   collected for the whole document in one pass.

use serde::Serialize;
use std::fmt;

/// Renders a dotted field path, using `<root>` for the document itself.
pub(crate) fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}

/// Joins a parent path and a child key into a dotted path.
pub(crate) fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

/// The kind of constraint a field violated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    /// A required field is absent or `null`.
    Missing,
    /// The field is present with the wrong JSON type.
    WrongType { expected: &'static str },
    TooShort { min: usize, actual: usize },
    TooLong { max: usize, actual: usize },
    /// An option field holds a value outside its enumerated set.
    NotInSet {
        allowed: &'static [&'static str],
        actual: String,
    },
    /// A required richtext field contains no text.
    EmptyRichtext,
    TooFewBlocks { min: usize, actual: usize },
    TooManyBlocks { max: usize, actual: usize },
    /// A known block type appears where the parent's whitelist does not permit it.
    ComponentNotAllowed { component: String },
    /// A nested block names a discriminator outside the known set.
    UnknownComponent { component: String },
    /// A nested block carries no `component` discriminator.
    MissingComponent,
    /// A `_uid` was already used elsewhere in the same content tree.
    DuplicateUid { uid: String },
    InvalidTimestamp { value: String },
    InvalidUuid { value: String },
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::Missing => write!(f, "required field is missing"),
            ViolationKind::WrongType { expected } => write!(f, "expected {expected}"),
            ViolationKind::TooShort { min, actual } => {
                write!(f, "must be at least {min} characters (got {actual})")
            }
            ViolationKind::TooLong { max, actual } => {
                write!(f, "must be at most {max} characters (got {actual})")
            }
            ViolationKind::NotInSet { allowed, actual } => {
                write!(f, "'{actual}' is not one of [{}]", allowed.join(", "))
            }
            ViolationKind::EmptyRichtext => write!(f, "richtext must contain text"),
            ViolationKind::TooFewBlocks { min, actual } => {
                write!(f, "requires at least {min} blocks (got {actual})")
            }
            ViolationKind::TooManyBlocks { max, actual } => {
                write!(f, "allows at most {max} blocks (got {actual})")
            }
            ViolationKind::ComponentNotAllowed { component } => {
                write!(f, "component '{component}' is not allowed here")
            }
            ViolationKind::UnknownComponent { component } => {
                write!(f, "unknown component '{component}'")
            }
            ViolationKind::MissingComponent => write!(f, "missing component discriminator"),
            ViolationKind::DuplicateUid { uid } => write!(f, "duplicate _uid '{uid}'"),
            ViolationKind::InvalidTimestamp { value } => {
                write!(f, "'{value}' is not an RFC 3339 timestamp")
            }
            ViolationKind::InvalidUuid { value } => write!(f, "'{value}' is not a UUID"),
        }
    }
}

/// A single field-constraint violation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `content.body.0.legal_disclaimer`.
    pub path: String,
    #[serde(flatten)]
    pub kind: ViolationKind,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Returns true if the error is reported at exactly `path`.
    pub fn is_at(&self, path: &str) -> bool {
        self.path == path
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", display_path(&self.path), self.kind)
    }
}

/// Every constraint violation found in one validation pass, in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub(crate) fn from_vec(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0
    }

    /// Returns the errors reported at exactly `path`.
    pub fn at<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a ValidationError> + 'a {
        self.0.iter().filter(move |e| e.is_at(path))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.0.len())?;
        for (i, error) in self.0.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A payload with no usable typed shape.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StructuralError {
    #[error("{}: expected a JSON object", display_path(.path))]
    NotAnObject { path: String },

    #[error("{}: missing `component` discriminator", display_path(.path))]
    MissingComponent { path: String },

    #[error("{}: unknown component '{component}'", display_path(.path))]
    UnknownComponent { path: String, component: String },

    #[error("{}: expected component '{expected}', got '{actual}'", display_path(.path))]
    UnexpectedComponent {
        path: String,
        expected: &'static str,
        actual: String,
    },
}

/// Why a payload could not be turned into a typed value.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    #[error("structural error: {0}")]
    Structural(#[from] StructuralError),

    #[error("{0}")]
    Invalid(ValidationErrors),
}

impl ValidationFailure {
    /// Returns the constraint violations, if this is a field-level failure.
    pub fn errors(&self) -> Option<&ValidationErrors> {
        match self {
            ValidationFailure::Invalid(errors) => Some(errors),
            ValidationFailure::Structural(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_path_joins_with_dots() {
        assert_eq!(child_path("", "content"), "content");
        assert_eq!(child_path("content.body", "0"), "content.body.0");
    }

    #[test]
    fn errors_display_lists_every_violation() {
        let errors = ValidationErrors::from_vec(vec![
            ValidationError::new("headline", ViolationKind::Missing),
            ValidationError::new(
                "cta_text",
                ViolationKind::TooLong {
                    max: 30,
                    actual: 31,
                },
            ),
        ]);

        let rendered = errors.to_string();
        assert!(rendered.starts_with("2 validation error(s)"));
        assert!(rendered.contains("headline: required field is missing"));
        assert!(rendered.contains("cta_text: must be at most 30 characters (got 31)"));
    }

    #[test]
    fn structural_error_uses_root_marker() {
        let err = StructuralError::NotAnObject {
            path: String::new(),
        };
        assert_eq!(err.to_string(), "<root>: expected a JSON object");
    }

    #[test]
    fn validation_error_serialises_flat() {
        let error = ValidationError::new(
            "content.body.0.features",
            ViolationKind::TooFewBlocks { min: 3, actual: 2 },
        );
        let json = serde_json::to_value(&error).expect("serialise");
        assert_eq!(
            json,
            serde_json::json!({
                "path": "content.body.0.features",
                "kind": "too_few_blocks",
                "min": 3,
                "actual": 2
            })
        );
    }
}
