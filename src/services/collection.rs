//! Verse collections: named lists with one reference per line.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::bible::reference::{CanonicalReference, ReferenceParser};
use crate::constants::files::COLLECTION_EXTENSION;

#[allow(clippy::expect_used)]
static RE_NAME_GAPS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[_\s]+").expect("valid regex: RE_NAME_GAPS"));

/// Outcome for one line of collection text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reference", rename_all = "kebab-case")]
pub enum LineStatus {
    /// Blank line.
    Empty,
    /// Parsed into a reference.
    Valid(CanonicalReference),
    /// Not a reference the parser understands.
    InvalidFormat,
}

/// One validated line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineValidation {
    /// 1-based line number.
    pub line_number: usize,
    /// The line as written.
    pub original_text: String,
    /// What the parser made of it.
    pub status: LineStatus,
}

/// Result of validating collection text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionValidation {
    /// Every line, in order.
    pub lines: Vec<LineValidation>,
    /// True when no line is [`LineStatus::InvalidFormat`].
    pub is_valid: bool,
}

impl CollectionValidation {
    /// Lines that failed to parse.
    pub fn problems(&self) -> impl Iterator<Item = &LineValidation> {
        self.lines
            .iter()
            .filter(|l| l.status == LineStatus::InvalidFormat)
    }

    /// Parsed references in line order.
    pub fn references(&self) -> impl Iterator<Item = &CanonicalReference> {
        self.lines.iter().filter_map(|l| match &l.status {
            LineStatus::Valid(r) => Some(r),
            _ => None,
        })
    }
}

/// Validate text line by line.
pub fn validate_lines(text: &str, parser: &dyn ReferenceParser) -> CollectionValidation {
    let lines: Vec<LineValidation> = text
        .split('\n')
        .enumerate()
        .map(|(i, line)| {
            let trimmed = line.trim();
            let status = if trimmed.is_empty() {
                LineStatus::Empty
            } else {
                parser
                    .parse_reference(trimmed)
                    .map_or(LineStatus::InvalidFormat, LineStatus::Valid)
            };
            LineValidation {
                line_number: i + 1,
                original_text: line.trim_end_matches('\r').to_string(),
                status,
            }
        })
        .collect();

    let is_valid = !lines.iter().any(|l| l.status == LineStatus::InvalidFormat);
    CollectionValidation { lines, is_valid }
}

/// A named, ordered list of references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Collection name.
    pub name: String,
    /// Entries in order.
    pub entries: Vec<CanonicalReference>,
}

impl Collection {
    /// Create a collection.
    pub fn new(name: impl Into<String>, entries: Vec<CanonicalReference>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }

    /// Build from text, keeping the lines that parse.
    pub fn from_text(name: impl Into<String>, text: &str, parser: &dyn ReferenceParser) -> Self {
        let validation = validate_lines(text, parser);
        let name = name.into();
        let skipped = validation.problems().count();
        if skipped > 0 {
            tracing::warn!("Collection '{name}': skipped {skipped} unparsable line(s)");
        }
        Self::new(name, validation.references().cloned().collect())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the collection has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collection name suggested by a file name: `.txt` dropped, runs of `_` and
/// whitespace collapsed to one space.
pub fn proposed_name(file_name: &str) -> String {
    let suffix_len = COLLECTION_EXTENSION.len() + 1;
    let stem = match file_name.len().checked_sub(suffix_len) {
        Some(cut)
            if file_name.is_char_boundary(cut)
                && file_name[cut..].eq_ignore_ascii_case(&format!(".{COLLECTION_EXTENSION}")) =>
        {
            &file_name[..cut]
        }
        _ => file_name,
    };
    RE_NAME_GAPS.replace_all(stem, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::bible::reference::StandardParser;

    #[test]
    fn test_validate_lines() {
        let parser = StandardParser::standard();
        let v = validate_lines("Gen 1:1\n\nnot a verse\n1 Cor 13:4-7", &parser);

        assert!(!v.is_valid);
        assert_eq!(v.lines.len(), 4);
        assert_eq!(
            v.lines[0].status,
            LineStatus::Valid(CanonicalReference::single("Genesis", 1, 1))
        );
        assert_eq!(v.lines[1].status, LineStatus::Empty);
        assert_eq!(v.lines[2].status, LineStatus::InvalidFormat);
        assert_eq!(v.lines[2].line_number, 3);

        let problems: Vec<_> = v.problems().map(|l| l.original_text.as_str()).collect();
        assert_eq!(problems, vec!["not a verse"]);
    }

    #[test]
    fn test_valid_text() {
        let parser = StandardParser::standard();
        let v = validate_lines("John 3:16\r\nRom 8:28\r\n", &parser);
        assert!(v.is_valid);
        assert_eq!(v.references().count(), 2);
        assert_eq!(v.lines[0].original_text, "John 3:16");
    }

    #[test]
    fn test_from_text_keeps_valid_lines() {
        let parser = StandardParser::standard();
        let c = Collection::from_text("Memory", "Ps 23:1\nbogus\nJohn 1:1-3", &parser);
        assert_eq!(c.len(), 2);
        assert_eq!(c.entries[1].reference_string(), "John 1:1-3");
    }

    #[test]
    fn test_proposed_name() {
        assert_eq!(proposed_name("memory_verses_2024.txt"), "memory verses 2024");
        assert_eq!(proposed_name("Advent  Readings.TXT"), "Advent Readings");
        assert_eq!(proposed_name("plain"), "plain");
    }
}
