//! Robust multi-reference extraction from free text.
//!
//! Input is split into blocks on `;` and newlines. Each block is scanned for
//! full references (book, chapter, verse, optional range, optional trailing
//! verse list). Whatever follows the last full reference in a block is then
//! scanned for bare `chapter:verse` and `verse` fragments, which borrow their
//! book from the block or from the most recently emitted reference.
//!
//! The book context of a block never leaks into the next one. Output order is
//! first-seen, and each reference string is emitted once per call.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use super::reference::{CanonicalReference, ReferenceParser, StandardParser};
use super::resolver::BookResolver;
use crate::error::{Error, Result};

/// Block separators: semicolons (with surrounding space) or newline runs.
#[allow(clippy::expect_used)]
static RE_BLOCK_SPLIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*;\s*|\n+").expect("valid regex: RE_BLOCK_SPLIT")
});

/// Full reference with an optional trailing list of verses or verse ranges.
///
/// Groups: 1 book, 2 chapter, 3 start verse, 4 end verse, 5 trailing list.
#[allow(clippy::expect_used)]
static RE_FULL_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\b(?:[1-3]\s*)?[a-zA-Z]+(?:(?:\s+|\s+of\s+)[a-zA-Z]+)*\.?)\s*([0-9]+)[\s:.]([0-9]+)(?:-([0-9]+))?((?:[,\s]\s*[0-9]+(?:-[0-9]+)?)*)",
    )
    .expect("valid regex: RE_FULL_REFERENCE")
});

/// Bare `chapter:verse[-end]` (groups 1-3) or bare `verse[-end]` (groups 4-5).
#[allow(clippy::expect_used)]
static RE_FRAGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+)[\s:.]([0-9]+)(?:-([0-9]+))?|([0-9]+)(?:-([0-9]+))?")
        .expect("valid regex: RE_FRAGMENT")
});

/// A whole block of the form `<book> <chapter>`.
#[allow(clippy::expect_used)]
static RE_CHAPTER_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:([1-3])\s*)?([a-zA-Z][a-zA-Z\s]*?)\s+([0-9]+)$")
        .expect("valid regex: RE_CHAPTER_ONLY")
});

/// The hyphenated second half of a cross-book range ("-Col 1:17", "-Col.1.17").
#[allow(clippy::expect_used)]
static RE_COMPOUND_TAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9])[ \t]*-[ \t]*(?:[1-3][ \t]*)?[a-zA-Z]+\.?[ \t]*[0-9]+(?:[ \t:.][0-9]+)?")
        .expect("valid regex: RE_COMPOUND_TAIL")
});

/// Spaced `:`, `.` or `-` between two numbers.
#[allow(clippy::expect_used)]
static RE_NUMBER_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9])[ \t]*([:.\-])[ \t]*([0-9])")
        .expect("valid regex: RE_NUMBER_SEPARATOR")
});

/// First word at the start of a string.
#[allow(clippy::expect_used)]
static RE_LEADING_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([a-zA-Z]+)").expect("valid regex: RE_LEADING_WORD")
});

/// Items of a trailing verse list.
#[allow(clippy::expect_used)]
static RE_LIST_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[,\s]+").expect("valid regex: RE_LIST_SEPARATOR")
});

/// A reference found by the extractor, with the text that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedReference {
    /// The canonical reference.
    #[serde(flatten)]
    pub reference: CanonicalReference,
    /// Input segment the reference came from (diagnostics only).
    pub source_text: String,
    /// Canonical rendering, also the de-duplication key.
    pub reference_string: String,
}

/// A whole-chapter reference such as "Psalms 23".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChapterReference {
    /// Canonical book name.
    pub book: String,
    /// Chapter number.
    pub chapter: u32,
}

impl fmt::Display for ChapterReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.book, self.chapter)
    }
}

/// Result of one extraction pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    /// Resolved references in first-seen order.
    pub references: Vec<ExtractedReference>,
    /// Whole-chapter prompts in first-seen order.
    pub chapters: Vec<ChapterReference>,
    /// Reference-like fragments that could not be resolved.
    pub unparsed: Vec<String>,
}

impl Extraction {
    /// Whether nothing at all was found.
    pub fn is_empty(&self) -> bool {
        self.references.is_empty() && self.chapters.is_empty() && self.unparsed.is_empty()
    }

    /// The canonical references without their extraction metadata.
    pub fn canonical_references(&self) -> impl Iterator<Item = &CanonicalReference> {
        self.references.iter().map(|r| &r.reference)
    }

    /// Reference strings in output order.
    pub fn reference_strings(&self) -> Vec<&str> {
        self.references.iter().map(|r| r.reference_string.as_str()).collect()
    }
}

/// Accumulates output and the per-call de-duplication sets.
#[derive(Default)]
struct ExtractionState {
    out: Extraction,
    seen_references: HashSet<String>,
    seen_chapters: HashSet<String>,
    seen_unparsed: HashSet<String>,
}

impl ExtractionState {
    fn push_reference(&mut self, reference: CanonicalReference, source_text: String) {
        let reference_string = reference.reference_string();
        if self.seen_references.insert(reference_string.clone()) {
            self.out.references.push(ExtractedReference {
                reference,
                source_text,
                reference_string,
            });
        }
    }

    fn push_chapter(&mut self, chapter: ChapterReference) {
        if self.seen_chapters.insert(chapter.to_string()) {
            self.out.chapters.push(chapter);
        }
    }

    fn push_unparsed(&mut self, fragment: &str) {
        if self.seen_unparsed.insert(fragment.to_string()) {
            self.out.unparsed.push(fragment.to_string());
        }
    }

    fn last_reference(&self) -> Option<&CanonicalReference> {
        self.out.references.last().map(|r| &r.reference)
    }
}

/// Extracts every reference from a block of free text.
#[derive(Clone)]
pub struct Extractor {
    parser: Arc<dyn ReferenceParser>,
    resolver: Arc<BookResolver>,
}

impl fmt::Debug for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extractor")
            .field("parser", &self.parser.name())
            .field("aliases", &self.resolver.len())
            .finish()
    }
}

impl Extractor {
    /// Create an extractor from its two collaborators.
    pub fn new(parser: Arc<dyn ReferenceParser>, resolver: Arc<BookResolver>) -> Self {
        Self { parser, resolver }
    }

    /// Extractor over a [`StandardParser`] sharing `resolver`.
    pub fn with_resolver(resolver: Arc<BookResolver>) -> Self {
        let parser = StandardParser::new(Arc::clone(&resolver));
        Self::new(Arc::new(parser), resolver)
    }

    /// Extractor over the standard alias table.
    pub fn standard() -> Self {
        Self::with_resolver(Arc::new(BookResolver::standard()))
    }

    /// Start building an extractor from separately supplied parts.
    pub fn builder() -> ExtractorBuilder {
        ExtractorBuilder::default()
    }

    /// The resolver used to canonicalize book names.
    pub fn resolver(&self) -> &Arc<BookResolver> {
        &self.resolver
    }

    /// Scan `text` and split it into resolved references, chapter prompts
    /// and unparsed fragments. Never fails on malformed input.
    pub fn extract(&self, text: &str) -> Extraction {
        if text.trim().is_empty() {
            return Extraction::default();
        }

        let normalized = normalize_input(text);
        let mut state = ExtractionState::default();

        for block in RE_BLOCK_SPLIT.split(&normalized) {
            let block = block.trim();
            if !block.is_empty() {
                self.scan_block(block, &mut state);
            }
        }

        tracing::debug!(
            "Extracted {} references, {} chapters, {} unparsed",
            state.out.references.len(),
            state.out.chapters.len(),
            state.out.unparsed.len()
        );
        state.out
    }

    fn scan_block(&self, block: &str, state: &mut ExtractionState) {
        // Book context only lives for the duration of one block.
        let mut block_book: Option<String> = None;
        let mut yielded = false;
        let mut pos = 0;

        while let Some(caps) = RE_FULL_REFERENCE.captures_at(block, pos) {
            let Some(whole) = caps.get(0) else { break };
            let (trailing, match_end) = self.trailing_list(block, &caps);
            pos = match_end;
            yielded = true;

            let raw_book = self.book_token(caps[1].trim().trim_end_matches('.').trim_end());
            let chapter = &caps[2];
            let mut primary = format!("{raw_book} {chapter}:{}", &caps[3]);
            if let Some(end) = caps.get(4) {
                primary.push('-');
                primary.push_str(end.as_str());
            }

            let Some(parsed) = self.parser.parse_reference(&primary) else {
                state.push_unparsed(block[whole.start()..match_end].trim());
                continue;
            };

            let parsed = self.canonicalize(parsed);
            let book = parsed.book.clone();
            block_book = Some(book.clone());
            state.push_reference(parsed, primary);

            for item in RE_LIST_SEPARATOR.split(trailing).filter(|s| !s.is_empty()) {
                match self.parser.parse_reference(&format!("{book} {chapter}:{item}")) {
                    Some(extra) => {
                        let source = format!("{raw_book} {chapter}:{item}");
                        state.push_reference(self.canonicalize(extra), source);
                    }
                    None => state.push_unparsed(item),
                }
            }
        }

        if pos == 0 {
            if let Some(chapter) = self.chapter_only(block) {
                state.push_chapter(chapter);
                return;
            }
        }

        let remaining = block[pos..].trim();
        for caps in RE_FRAGMENT.captures_iter(remaining) {
            yielded = true;
            self.resolve_fragment(&caps, block_book.as_deref(), state);
        }

        if !yielded {
            state.push_unparsed(block);
        }
    }

    /// Resolve a bare fragment against the current context.
    fn resolve_fragment(
        &self,
        caps: &Captures<'_>,
        block_book: Option<&str>,
        state: &mut ExtractionState,
    ) {
        let (candidate, source) = if let (Some(chapter), Some(verse)) = (caps.get(1), caps.get(2)) {
            let source = caps[0].trim().to_string();
            let Some(book) = block_book else {
                state.push_unparsed(&source);
                return;
            };
            let mut candidate = format!("{book} {}:{}", chapter.as_str(), verse.as_str());
            if let Some(end) = caps.get(3) {
                candidate.push('-');
                candidate.push_str(end.as_str());
            }
            (candidate, source)
        } else if let Some(verse) = caps.get(4) {
            let mut source = verse.as_str().to_string();
            if let Some(end) = caps.get(5) {
                source.push('-');
                source.push_str(end.as_str());
            }
            let context = state.last_reference().map(|r| (r.book.clone(), r.chapter));
            let Some((book, chapter)) = context else {
                state.push_unparsed(&source);
                return;
            };
            (format!("{book} {chapter}:{source}"), source)
        } else {
            return;
        };

        match self.parser.parse_reference(&candidate) {
            Some(parsed) => {
                let parsed = self.canonicalize(parsed);
                state.push_reference(parsed, source);
            }
            None => state.push_unparsed(&source),
        }
    }

    /// Trailing list text and the end of the match.
    ///
    /// A lone `1`-`3` closing the list that is really the numeral of a
    /// following numbered book ("John 3:16, 1 John 4:8") is handed back to
    /// the scanner instead of being read as a verse.
    fn trailing_list<'t>(&self, block: &'t str, caps: &Captures<'t>) -> (&'t str, usize) {
        let Some(list) = caps.get(5).filter(|m| !m.is_empty()) else {
            let end = caps.get(0).map_or(0, |m| m.end());
            return ("", end);
        };

        let end = list.end();
        let bytes = block.as_bytes();
        let digit = end - 1;
        let lone_numeral = matches!(bytes[digit], b'1'..=b'3')
            && digit > list.start()
            && !bytes[digit - 1].is_ascii_digit()
            && bytes[digit - 1] != b'-';

        if lone_numeral {
            let next_word = RE_LEADING_WORD
                .captures(&block[end..])
                .and_then(|c| c.get(1))
                .map(|m| m.as_str());
            if let Some(word) = next_word {
                if self.resolver.is_known(&format!("{} {word}", &block[digit..end])) {
                    return (&block[list.start()..digit], digit);
                }
            }
        }

        (list.as_str(), end)
    }

    /// Longest known book name at the end of a greedy book token.
    ///
    /// "see also John" becomes "John"; an unknown token is kept whole so
    /// the resolver fallback still applies.
    fn book_token<'a>(&self, raw: &'a str) -> &'a str {
        if self.resolver.is_known(raw) {
            return raw;
        }
        let mut rest = raw;
        while let Some((_, tail)) = rest.split_once(char::is_whitespace) {
            rest = tail.trim_start();
            if self.resolver.is_known(rest) {
                return rest;
            }
        }
        raw
    }

    /// A `Book chapter` block. An unnumbered book token must be capitalized
    /// or at least three letters long, so prose like "is 5" stays a verse
    /// fragment instead of becoming Isaiah 5.
    fn chapter_only(&self, block: &str) -> Option<ChapterReference> {
        let caps = RE_CHAPTER_ONLY.captures(block)?;
        let word = caps[2].trim();
        let book = match caps.get(1) {
            Some(numeral) => format!("{} {word}", numeral.as_str()),
            None if word.len() < 3 && word.starts_with(|c: char| c.is_ascii_lowercase()) => {
                return None;
            }
            None => word.to_string(),
        };
        let canonical = self.resolver.lookup(&book)?;
        let chapter: u32 = caps[3].parse().ok().filter(|&c| c > 0)?;
        Some(ChapterReference {
            book: canonical.to_string(),
            chapter,
        })
    }

    fn canonicalize(&self, mut reference: CanonicalReference) -> CanonicalReference {
        reference.book = self.resolver.resolve(&reference.book);
        reference
    }
}

/// Builds an [`Extractor`], reporting missing wiring as a configuration error.
#[derive(Default)]
pub struct ExtractorBuilder {
    parser: Option<Arc<dyn ReferenceParser>>,
    resolver: Option<Arc<BookResolver>>,
}

impl ExtractorBuilder {
    /// Supply the single-reference parser.
    #[must_use]
    pub fn parser(mut self, parser: Arc<dyn ReferenceParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Supply the book resolver; defaults to the standard table.
    #[must_use]
    pub fn resolver(mut self, resolver: Arc<BookResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Finish wiring. Fails only when no parser was supplied.
    pub fn build(self) -> Result<Extractor> {
        let parser = self.parser.ok_or_else(|| {
            Error::config(
                "No reference parser supplied to the extractor",
                "Call ExtractorBuilder::parser before build",
            )
        })?;
        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(BookResolver::standard()));
        Ok(Extractor::new(parser, resolver))
    }
}

/// Unify dashes, cut cross-book range tails down to their first reference
/// and close up spaces around separators between numbers (`1:1 - 3`).
fn normalize_input(text: &str) -> String {
    let text = text.replace(['\u{2013}', '\u{2014}'], "-");
    let text = RE_COMPOUND_TAIL.replace_all(&text, "${1}");
    RE_NUMBER_SEPARATOR.replace_all(&text, "${1}${2}${3}").into_owned()
}
