//! Canonical references and the single-reference parser.

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::resolver::BookResolver;

/// Single reference: book words, chapter, separator, start, optional end,
/// optional parenthetical note.
#[allow(clippy::expect_used)]
static RE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([1-3]?\s*[a-zA-Z]+(?:\s+[a-zA-Z]+)*)\.?\s*([0-9]+)[\s:.]([0-9]+)(?:-([0-9]+))?(?:\s*\(.+?\))?",
    )
    .expect("valid regex: RE_REFERENCE")
});

/// Whitespace hugging a `:`, `.` or `-` separator.
#[allow(clippy::expect_used)]
static RE_SEPARATOR_SPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*([:.\-])\s*").expect("valid regex: RE_SEPARATOR_SPACE")
});

/// A resolved book + chapter + verse range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalReference {
    /// Canonical book name (e.g., "Genesis", "1 Corinthians").
    pub book: String,
    /// Chapter number.
    pub chapter: u32,
    /// Starting verse.
    pub start_verse: u32,
    /// Ending verse (same as start for single verse).
    pub end_verse: u32,
}

impl CanonicalReference {
    /// Create a reference for a single verse.
    pub fn single(book: impl Into<String>, chapter: u32, verse: u32) -> Self {
        Self {
            book: book.into(),
            chapter,
            start_verse: verse,
            end_verse: verse,
        }
    }

    /// Create a reference for a verse range; `None` if `end < start`.
    pub fn range(book: impl Into<String>, chapter: u32, start: u32, end: u32) -> Option<Self> {
        (end >= start).then(|| Self {
            book: book.into(),
            chapter,
            start_verse: start,
            end_verse: end,
        })
    }

    /// Whether this covers exactly one verse.
    pub const fn is_single_verse(&self) -> bool {
        self.start_verse == self.end_verse
    }

    /// The verse numbers covered, inclusive.
    pub const fn verses(&self) -> std::ops::RangeInclusive<u32> {
        self.start_verse..=self.end_verse
    }

    /// Canonical rendering `"{book} {chapter}:{start}[-{end}]"`, also used as
    /// the de-duplication key during extraction.
    pub fn reference_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CanonicalReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_verse() {
            write!(f, "{} {}:{}", self.book, self.chapter, self.start_verse)
        } else {
            write!(
                f,
                "{} {}:{}-{}",
                self.book, self.chapter, self.start_verse, self.end_verse
            )
        }
    }
}

/// Parses one citation-like string into a [`CanonicalReference`].
///
/// Implementations must be pure: same input, same output, no I/O.
pub trait ReferenceParser: Send + Sync {
    /// Parse a single reference, or `None` when the text is not one.
    fn parse_reference(&self, text: &str) -> Option<CanonicalReference>;

    /// Get the name of this parser (for debugging/logging).
    fn name(&self) -> &'static str {
        "ReferenceParser"
    }
}

/// Default parser: regex-driven, books canonicalized through a [`BookResolver`].
#[derive(Debug, Clone)]
pub struct StandardParser {
    resolver: Arc<BookResolver>,
}

impl StandardParser {
    /// Create a parser resolving book names with `resolver`.
    pub const fn new(resolver: Arc<BookResolver>) -> Self {
        Self { resolver }
    }

    /// Parser over the standard alias table.
    pub fn standard() -> Self {
        Self::new(Arc::new(BookResolver::standard()))
    }

    /// The resolver this parser canonicalizes with.
    pub fn resolver(&self) -> &Arc<BookResolver> {
        &self.resolver
    }
}

impl Default for StandardParser {
    fn default() -> Self {
        Self::standard()
    }
}

impl ReferenceParser for StandardParser {
    fn parse_reference(&self, text: &str) -> Option<CanonicalReference> {
        let text = text.trim().replace(['\u{2013}', '\u{2014}'], "-");
        let text = RE_SEPARATOR_SPACE.replace_all(&text, "$1");

        let caps = RE_REFERENCE.captures(&text)?;
        let book_token = caps.get(1)?.as_str();
        let chapter: u32 = caps.get(2)?.as_str().parse().ok()?;
        let start: u32 = caps.get(3)?.as_str().parse().ok()?;
        if chapter == 0 || start == 0 {
            return None;
        }

        let end = match caps.get(4) {
            Some(m) => m.as_str().parse().ok()?,
            None => start,
        };

        CanonicalReference::range(self.resolver.resolve(book_token), chapter, start, end)
    }

    fn name(&self) -> &'static str {
        "StandardParser"
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    fn parse(text: &str) -> Option<CanonicalReference> {
        StandardParser::standard().parse_reference(text)
    }

    #[test]
    fn test_parse_single_verse() {
        assert_eq!(parse("Genesis 1:1"), Some(CanonicalReference::single("Genesis", 1, 1)));
    }

    #[test]
    fn test_parse_numbered_book_range() {
        let r = parse("1 Cor 13:4-7").unwrap();
        assert_eq!(r.book, "1 Corinthians");
        assert_eq!(r.chapter, 13);
        assert_eq!(r.start_verse, 4);
        assert_eq!(r.end_verse, 7);
    }

    #[test]
    fn test_invalid_range_rejected() {
        assert_eq!(parse("Genesis 1:5-2"), None);
    }

    #[test]
    fn test_not_a_reference() {
        assert_eq!(parse("not a reference"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn test_chapter_only_not_parsed() {
        assert_eq!(parse("Genesis 1"), None);
    }

    #[test]
    fn test_dot_and_space_separators() {
        assert_eq!(parse("Isa 65.17"), Some(CanonicalReference::single("Isaiah", 65, 17)));
        assert_eq!(parse("Isa65.17"), Some(CanonicalReference::single("Isaiah", 65, 17)));
        assert_eq!(parse("Gen 1 1"), Some(CanonicalReference::single("Genesis", 1, 1)));
        assert_eq!(parse("Gen. 1:1"), Some(CanonicalReference::single("Genesis", 1, 1)));
    }

    #[test]
    fn test_whitespace_tolerant() {
        let expected = CanonicalReference::range("Genesis", 1, 1, 3);
        assert_eq!(parse("Genesis 1 : 1 - 3"), expected);
        assert_eq!(parse("  Genesis   1:1-3  "), expected);
        assert_eq!(parse("Genesis 1:1\u{2013}3"), expected);
    }

    #[test]
    fn test_parenthetical_note_ignored() {
        let r = parse("Luke 1:76-79 (NRSV)").unwrap();
        assert_eq!(r.reference_string(), "Luke 1:76-79");
    }

    #[test]
    fn test_zero_and_overflow_rejected() {
        assert_eq!(parse("Genesis 0:1"), None);
        assert_eq!(parse("Genesis 1:0"), None);
        assert_eq!(parse("Genesis 1:99999999999"), None);
    }

    #[test]
    fn test_unknown_book_falls_back() {
        assert_eq!(parse("Xyz 1:1"), Some(CanonicalReference::single("Xyz", 1, 1)));
    }

    #[test]
    fn test_round_trip() {
        let refs = [
            CanonicalReference::single("Genesis", 1, 1),
            CanonicalReference::range("1 Corinthians", 13, 4, 7).unwrap(),
            CanonicalReference::range("Song of Solomon", 2, 1, 3).unwrap(),
            CanonicalReference::single("3 John", 1, 14),
            CanonicalReference::single("Xyz", 4, 2),
        ];
        for r in refs {
            assert_eq!(parse(&r.reference_string()), Some(r.clone()), "{r}");
        }
    }

    #[test]
    fn test_display_and_range_constructor() {
        assert_eq!(CanonicalReference::single("Genesis", 1, 1).to_string(), "Genesis 1:1");
        assert_eq!(
            CanonicalReference::range("Psalms", 23, 1, 6).unwrap().reference_string(),
            "Psalms 23:1-6"
        );
        assert!(CanonicalReference::range("Psalms", 23, 6, 1).is_none());
        assert_eq!(
            CanonicalReference::range("Psalms", 23, 1, 3).unwrap().verses().collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }
}
