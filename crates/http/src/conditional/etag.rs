//! Entity tags as defined by RFC 7232 §2.3.

use std::borrow::Cow;
use std::fmt;
use std::fmt::{Display, Formatter};

const WEAK_TAG_PREFIX: &str = "W/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ETagKind {
    Strong,
    Weak,
}

impl ETagKind {
    /// Compares two tags with this kind's comparison function.
    ///
    /// ```text
    /// +--------+--------+-------------------+-----------------+
    /// | ETag 1 | ETag 2 | Strong Comparison | Weak Comparison |
    /// +--------+--------+-------------------+-----------------+
    /// | W/"1"  | W/"1"  | no match          | match           |
    /// | W/"1"  | W/"2"  | no match          | no match        |
    /// | W/"1"  | "1"    | no match          | match           |
    /// | "1"    | "1"    | match             | match           |
    /// +--------+--------+-------------------+-----------------+
    /// ```
    pub fn compare(self, a: &ETag, b: &ETag) -> bool {
        match self {
            Self::Strong => a.kind == Self::Strong && b.kind == Self::Strong && a.data == b.data,
            Self::Weak => a.data == b.data,
        }
    }
}

/// An opaque validator token plus its strength.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ETag {
    kind: ETagKind,
    data: Cow<'static, str>,
    /// Set only on the bare `*` token, never on a quoted `"*"` tag.
    wildcard: bool,
}

impl ETag {
    /// The `*` tag: no current representation, or a wildcard depending on context.
    pub const NO_REPRESENTATION: ETag = ETag { kind: ETagKind::Strong, data: Cow::Borrowed("*"), wildcard: true };

    pub fn new(data: impl Into<Cow<'static, str>>, kind: ETagKind) -> Self {
        Self { kind, data: data.into(), wildcard: false }
    }

    pub fn strong(data: impl Into<Cow<'static, str>>) -> Self {
        Self::new(data, ETagKind::Strong)
    }

    pub fn weak(data: impl Into<Cow<'static, str>>) -> Self {
        Self::new(data, ETagKind::Weak)
    }

    /// Parses a header token such as `"abc"`, `W/"abc"` or `*`.
    ///
    /// Never fails: anything that is neither weak nor `*` is a strong tag
    /// over the unquoted text.
    pub fn from(value: &str) -> Self {
        if let Some(weak) = value.strip_prefix(WEAK_TAG_PREFIX) {
            return Self::weak(remove_quotes(weak).to_string());
        }

        if value == Self::NO_REPRESENTATION.data {
            return Self::NO_REPRESENTATION;
        }

        Self::strong(remove_quotes(value).to_string())
    }

    pub fn kind(&self) -> ETagKind {
        self.kind
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn is_no_representation(&self) -> bool {
        self.wildcard
    }

    pub fn strong_matches(&self, other: &ETag) -> bool {
        ETagKind::Strong.compare(self, other)
    }

    pub fn weak_matches(&self, other: &ETag) -> bool {
        ETagKind::Weak.compare(self, other)
    }
}

impl Display for ETag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.wildcard {
            return f.write_str(&self.data);
        }

        match self.kind {
            ETagKind::Weak => write!(f, "{WEAK_TAG_PREFIX}\"{}\"", self.data),
            ETagKind::Strong => write!(f, "\"{}\"", self.data),
        }
    }
}

fn remove_quotes(value: &str) -> &str {
    value.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')).unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_table() {
        let cases = [
            (r#"W/"1""#, r#"W/"1""#, false, true),
            (r#"W/"1""#, r#"W/"2""#, false, false),
            (r#"W/"1""#, r#""1""#, false, true),
            (r#""1""#, r#""1""#, true, true),
        ];

        for (a, b, strong, weak) in cases {
            let (a, b) = (ETag::from(a), ETag::from(b));
            assert_eq!(ETagKind::Strong.compare(&a, &b), strong, "strong {a} vs {b}");
            assert_eq!(ETagKind::Weak.compare(&a, &b), weak, "weak {a} vs {b}");
            assert_eq!(ETagKind::Strong.compare(&b, &a), strong, "strong {b} vs {a}");
            assert_eq!(ETagKind::Weak.compare(&b, &a), weak, "weak {b} vs {a}");
        }
    }

    #[test]
    fn parse_strips_quotes_and_prefix() {
        assert_eq!(ETag::from(r#""abc""#), ETag::strong("abc"));
        assert_eq!(ETag::from("abc"), ETag::strong("abc"));
        assert_eq!(ETag::from(r#"W/"abc""#), ETag::weak("abc"));
        assert_eq!(ETag::from("W/abc"), ETag::weak("abc"));
        assert_eq!(ETag::from(r#"""#), ETag::strong(r#"""#));
    }

    #[test]
    fn star_is_no_representation() {
        assert!(ETag::from("*").is_no_representation());
        assert!(!ETag::from("W/*").is_no_representation());
        assert_eq!(ETag::NO_REPRESENTATION.to_string(), "*");
    }

    #[test]
    fn quoted_star_is_an_ordinary_tag() {
        let quoted = ETag::from(r#""*""#);

        assert!(!quoted.is_no_representation());
        assert_eq!(quoted, ETag::strong("*"));
        assert_ne!(quoted, ETag::NO_REPRESENTATION);
        assert_eq!(quoted.to_string(), r#""*""#);
    }

    #[test]
    fn renders_with_quotes() {
        assert_eq!(ETag::strong("SOMETHING").to_string(), r#""SOMETHING""#);
        assert_eq!(ETag::weak("1").to_string(), r#"W/"1""#);
        assert_eq!(ETag::from(&ETag::weak("x").to_string()), ETag::weak("x"));
    }
}
