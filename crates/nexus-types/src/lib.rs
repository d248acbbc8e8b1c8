//! Small validated primitives shared across the NexusBio content crates.

/// Why a string was refused by one of the validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// Nothing left after trimming whitespace
    #[error("text must not be blank")]
    Empty,

    /// The input exceeded the maximum permitted length
    #[error("Text exceeds maximum length of {max} characters")]
    TooLong { max: usize },

    /// The input contained characters outside the permitted set
    #[error("Text contains invalid characters: {0}")]
    InvalidCharacters(String),
}

/// Trimmed text with at least one visible character.
///
/// Used for user-submitted form fields once they have been sanitised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Wraps the trimmed form of `input`.
    ///
    /// # Arguments
    ///
    /// * `input` - Raw text, typically a form field after sanitising
    ///
    /// # Returns
    ///
    /// The trimmed text, or [`TextError::Empty`] when nothing visible remains.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        match input.as_ref().trim() {
            "" => Err(TextError::Empty),
            text => Ok(Self(text.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// A CMS story slug that is safe to embed in a Content Delivery API path.
///
/// Slugs are embedded into `cdn/stories/{slug}`, so construction applies the same kind of
/// guardrails as any other URI component:
/// - surrounding `/` are stripped, and the remainder must not be empty
/// - the length is bounded
/// - only ASCII alphanumerics plus `-`, `_`, `.` and `/` are allowed
/// - empty segments and `.`/`..` segments are rejected
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Slug(String);

impl Slug {
    pub const MAX_LEN: usize = 255;

    /// Validates and wraps a slug.
    ///
    /// # Arguments
    ///
    /// * `input` - A full slug such as `about/investors`; leading and trailing `/` are ignored
    ///
    /// # Returns
    ///
    /// The normalised slug, or:
    /// - [`TextError::Empty`] if nothing is left after stripping
    /// - [`TextError::TooLong`] beyond [`Slug::MAX_LEN`] bytes
    /// - [`TextError::InvalidCharacters`] for disallowed characters or relative segments
    pub fn parse(input: impl AsRef<str>) -> Result<Self, TextError> {
        let slug = input.as_ref().trim().trim_matches('/');

        if slug.is_empty() {
            return Err(TextError::Empty);
        }

        if slug.len() > Self::MAX_LEN {
            return Err(TextError::TooLong { max: Self::MAX_LEN });
        }

        let ok = slug.bytes().all(|b| {
            matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'-' | b'_' | b'.' | b'/')
        });
        if !ok {
            return Err(TextError::InvalidCharacters(
                "only alphanumeric, '-', '_', '.' and '/' allowed".into(),
            ));
        }

        if slug
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(TextError::InvalidCharacters(
                "slug contains an empty or relative path segment".into(),
            ));
        }

        Ok(Self(slug.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Slug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for Slug {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  Investor Relations  ").expect("valid text");
        assert_eq!(text.as_str(), "Investor Relations");
    }

    #[test]
    fn non_empty_text_rejects_whitespace_only() {
        assert_eq!(NonEmptyText::new("   ").expect_err("should reject"), TextError::Empty);
    }

    #[test]
    fn non_empty_text_deserialize_rejects_empty() {
        let err = serde_json::from_str::<NonEmptyText>("\"\"").expect_err("should reject");
        assert!(err.to_string().contains("must not be blank"));
    }

    #[test]
    fn slug_accepts_nested_paths() {
        assert_eq!(Slug::parse("home").expect("valid").as_str(), "home");
        assert_eq!(
            Slug::parse("/investors/annual-report_2024/").expect("valid").as_str(),
            "investors/annual-report_2024"
        );
    }

    #[test]
    fn slug_rejects_empty() {
        assert_eq!(Slug::parse("").expect_err("empty"), TextError::Empty);
        assert_eq!(Slug::parse("///").expect_err("only slashes"), TextError::Empty);
    }

    #[test]
    fn slug_rejects_query_injection() {
        let err = Slug::parse("home?version=draft").expect_err("should reject '?'");
        assert!(matches!(err, TextError::InvalidCharacters(_)));

        let err = Slug::parse("home page").expect_err("should reject space");
        assert!(matches!(err, TextError::InvalidCharacters(_)));
    }

    #[test]
    fn slug_rejects_relative_segments() {
        let err = Slug::parse("investors/../admin").expect_err("should reject '..'");
        assert!(matches!(err, TextError::InvalidCharacters(msg) if msg.contains("relative")));

        let err = Slug::parse("investors//deck").expect_err("should reject empty segment");
        assert!(matches!(err, TextError::InvalidCharacters(_)));
    }

    #[test]
    fn slug_rejects_too_long() {
        let long = "a".repeat(Slug::MAX_LEN + 1);
        assert_eq!(
            Slug::parse(long).expect_err("too long"),
            TextError::TooLong { max: Slug::MAX_LEN }
        );
    }
}
