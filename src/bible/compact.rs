//! Cross-reference dataset formats.
//!
//! Two schemes show up in cross-reference data: compact space-less keys such
//! as `Isa65.17` (with ranges like `Col1.16-Col.1.17`), and Treasury of
//! Scripture Knowledge lists such as `ge 1:1; ex 3:14,15`.

use std::sync::LazyLock;

use regex::Regex;

use super::books::{book_by_number, book_number};
use super::reference::{CanonicalReference, ReferenceParser};
use super::resolver::{normalize_token, BookResolver, TSK_ABBREVIATIONS};

/// Book prefix (optionally numbered) followed by the chapter/verse digits.
#[allow(clippy::expect_used)]
static RE_COMPACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([1-3]?[a-zA-Z]+)([0-9]+.*)$").expect("valid regex: RE_COMPACT")
});

/// Key prefix for each canonical book, in canonical order.
///
/// Every prefix is unique and known to the standard resolver, so keys read
/// back through [`parse_compact`] to the same book.
#[rustfmt::skip]
pub const COMPACT_ABBREVIATIONS: [&str; 66] = [
    "Gen", "Exo", "Lev", "Num", "Deu", "Jos", "Judg", "Rut", "1Sam", "2Sam",
    "1Kgs", "2Kgs", "1Chr", "2Chr", "Ezr", "Neh", "Est", "Job", "Psa", "Pro",
    "Ecc", "Song", "Isa", "Jer", "Lam", "Eze", "Dan", "Hos", "Joe", "Amo",
    "Oba", "Jon", "Mic", "Nah", "Hab", "Zep", "Hag", "Zec", "Mal",
    "Mat", "Mar", "Luk", "Joh", "Act", "Rom", "1Cor", "2Cor", "Gal", "Eph",
    "Phil", "Col", "1Thess", "2Thess", "1Tim", "2Tim", "Tit", "Phm", "Heb", "Jas",
    "1Pet", "2Pet", "1Jn", "2Jn", "3Jn", "Jude", "Rev",
];

/// One TSK segment: abbreviation, chapter, verse, optional end, remainder.
#[allow(clippy::expect_used)]
static RE_TSK_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([1-3]?[a-zA-Z]+)\s+([0-9]+):([0-9]+)(?:-([0-9]+))?(.*)$")
        .expect("valid regex: RE_TSK_SEGMENT")
});

/// Parse a compact key like `Isa65.17`.
///
/// Ranges spanning two references keep only the first one.
pub fn parse_compact(text: &str, parser: &dyn ReferenceParser) -> Option<CanonicalReference> {
    let text = text.trim();
    let head = text.split('-').next().unwrap_or(text);

    if let Some(caps) = RE_COMPACT.captures(head) {
        let readable = format!("{} {}", &caps[1], caps[2].replacen('.', ":", 1));
        return parser.parse_reference(&readable);
    }

    parser.parse_reference(text)
}

/// Compact lookup key for a reference, e.g. `Gen1.1` or `1Cor13.4`.
///
/// Canonical books use [`COMPACT_ABBREVIATIONS`]; any other book name falls
/// back to its words joined without spaces.
pub fn compact_key(reference: &CanonicalReference) -> String {
    let stem = book_number(&reference.book)
        .and_then(|n| usize::try_from(n).ok()?.checked_sub(1))
        .and_then(|idx| COMPACT_ABBREVIATIONS.get(idx))
        .map_or_else(
            || reference.book.split_whitespace().collect(),
            |abbr| (*abbr).to_string(),
        );
    format!("{stem}{}.{}", reference.chapter, reference.start_verse)
}

/// Storage id for a TSK entry: `"{book} {chapter}:{verse}"`.
pub fn tsk_id(book_number: u32, chapter: u32, verse: u32) -> Option<String> {
    book_by_number(book_number).map(|book| format!("{book} {chapter}:{verse}"))
}

/// A TSK reference with its abbreviation expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TskReference {
    /// Canonical book name.
    pub book: String,
    /// The reference with the full book name (`"Genesis 1:1-3"`).
    pub reference: String,
    /// The text as it appeared in the dataset.
    pub original: String,
}

/// Parse `"ge 1:1"` style text using the TSK abbreviation table only.
pub fn parse_tsk_reference(text: &str) -> Option<TskReference> {
    let mut parts = text.split_whitespace();
    let abbrev = normalize_token(parts.next()?);
    let numbers = parts.next()?;

    let (_, book) = TSK_ABBREVIATIONS.iter().find(|(a, _)| *a == abbrev)?;
    Some(TskReference {
        book: (*book).to_string(),
        reference: format!("{book} {numbers}"),
        original: text.to_string(),
    })
}

/// One linkable item in a TSK reference list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TskLink {
    /// Text as displayed (`"ge 1:1-3"`, `"15"`, `"4-6"`).
    pub label: String,
    /// Reference the item points at (`"Genesis 1:1"`).
    pub target: String,
}

/// Split a TSK list into link targets.
///
/// Trailing comma items reuse the segment's book and chapter; a range item
/// links to its first verse. Segments that do not look like references are
/// skipped.
pub fn tsk_links(text: &str, resolver: &BookResolver) -> Vec<TskLink> {
    let mut links = Vec::new();

    for segment in text.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let Some(caps) = RE_TSK_SEGMENT.captures(segment) else {
            continue;
        };
        let abbrev = &caps[1];
        let chapter = &caps[2];
        let start = &caps[3];
        let book = resolver.resolve(abbrev);

        let label = caps.get(4).map_or_else(
            || format!("{abbrev} {chapter}:{start}"),
            |end| format!("{abbrev} {chapter}:{start}-{}", end.as_str()),
        );
        links.push(TskLink {
            label,
            target: format!("{book} {chapter}:{start}"),
        });

        let remainder = caps.get(5).map_or("", |m| m.as_str());
        for extra in remainder.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let first_verse = match extra.split_once('-') {
                Some((a, b)) if is_number(a) && is_number(b) => a,
                None if is_number(extra) => extra,
                _ => continue,
            };
            links.push(TskLink {
                label: extra.to_string(),
                target: format!("{book} {chapter}:{first_verse}"),
            });
        }
    }

    links
}

fn is_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::bible::reference::StandardParser;

    #[test]
    fn test_parse_compact() {
        let parser = StandardParser::standard();
        assert_eq!(
            parse_compact("Isa65.17", &parser),
            Some(CanonicalReference::single("Isaiah", 65, 17))
        );
        assert_eq!(
            parse_compact("Col1.16-Col.1.17", &parser),
            Some(CanonicalReference::single("Colossians", 1, 16))
        );
        assert_eq!(
            parse_compact("John 3:16", &parser),
            Some(CanonicalReference::single("John", 3, 16))
        );
        assert_eq!(parse_compact("nonsense", &parser), None);
    }

    #[test]
    fn test_compact_key() {
        assert_eq!(compact_key(&CanonicalReference::single("Genesis", 1, 1)), "Gen1.1");
        assert_eq!(
            compact_key(&CanonicalReference::range("1 Corinthians", 13, 4, 7).unwrap()),
            "1Cor13.4"
        );
        assert_eq!(compact_key(&CanonicalReference::single("1 John", 4, 8)), "1Jn4.8");
        assert_eq!(compact_key(&CanonicalReference::single("Xyz Abc", 2, 3)), "XyzAbc2.3");
    }

    #[test]
    fn test_compact_key_reads_back_for_every_book() {
        let parser = StandardParser::standard();
        for book in crate::bible::books::CANONICAL_BOOKS {
            let reference = CanonicalReference::single(book, 3, 4);
            let key = compact_key(&reference);
            assert_eq!(parse_compact(&key, &parser), Some(reference), "key {key:?}");
        }
    }

    #[test]
    fn test_tsk_id() {
        assert_eq!(tsk_id(1, 1, 1).as_deref(), Some("Genesis 1:1"));
        assert_eq!(tsk_id(66, 22, 21).as_deref(), Some("Revelation 22:21"));
        assert_eq!(tsk_id(0, 1, 1), None);
    }

    #[test]
    fn test_parse_tsk_reference() {
        let r = parse_tsk_reference("jud 5:1").unwrap();
        assert_eq!(r.book, "Judges");
        assert_eq!(r.reference, "Judges 5:1");
        assert_eq!(r.original, "jud 5:1");
        assert!(parse_tsk_reference("gen").is_none());
        assert!(parse_tsk_reference("xx 1:1").is_none());
    }

    #[test]
    fn test_tsk_links() {
        let resolver = BookResolver::standard().with_tsk_aliases();
        let links = tsk_links("ge 1:1-3,5,7-9; ex 3:14; see also", &resolver);
        let targets: Vec<_> = links.iter().map(|l| l.target.as_str()).collect();
        assert_eq!(
            targets,
            vec!["Genesis 1:1", "Genesis 1:5", "Genesis 1:7", "Exodus 3:14"]
        );
        assert_eq!(links[0].label, "ge 1:1-3");
        assert_eq!(links[2].label, "7-9");
    }
}
