//! Plain text export of collections with their verse text.

use std::fmt;
use std::str::FromStr;

use crate::bible::reference::CanonicalReference;
use crate::bible::store::VerseStore;
use crate::constants::export::{
    DEFAULT_ENTRY_SEPARATOR, DEFAULT_REF_TEXT_SEPARATOR, EM_DASH_RULE,
};
use crate::error::{Error, Result};
use crate::services::collection::Collection;

/// Prefix written before each exported entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BulletStyle {
    /// No prefix.
    #[default]
    None,
    /// `☐ `
    Square,
    /// `● `
    Disc,
    /// `- `
    Dash,
    /// `1. `, `2. `, ...
    Numbered,
    /// `A. `, ..., `Z. `, `AA. `
    AlphaUpper,
    /// `a. `, ..., `z. `, `aa. `
    AlphaLower,
}

impl BulletStyle {
    /// All styles, in menu order.
    pub const ALL: [Self; 7] = [
        Self::None,
        Self::Square,
        Self::Disc,
        Self::Dash,
        Self::Numbered,
        Self::AlphaUpper,
        Self::AlphaLower,
    ];

    /// Prefix for the 1-based `position` within the exported range.
    pub fn prefix(self, position: usize) -> String {
        match self {
            Self::None => String::new(),
            Self::Square => "\u{2610} ".to_string(),
            Self::Disc => "\u{25CF} ".to_string(),
            Self::Dash => "- ".to_string(),
            Self::Numbered => format!("{position}. "),
            Self::AlphaUpper => alphabetic(position, b'A'),
            Self::AlphaLower => alphabetic(position, b'a'),
        }
    }

    /// Name used on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Square => "square",
            Self::Disc => "disc",
            Self::Dash => "dash",
            Self::Numbered => "numbered",
            Self::AlphaUpper => "alpha_upper",
            Self::AlphaLower => "alpha_lower",
        }
    }
}

impl fmt::Display for BulletStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BulletStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|style| style.name() == wanted)
            .ok_or_else(|| Error::Msg(format!("unknown bullet style '{s}'")))
    }
}

/// Spreadsheet-style letters: 1 -> A, 26 -> Z, 27 -> AA.
fn alphabetic(position: usize, base: u8) -> String {
    if position == 0 {
        return String::new();
    }
    let mut letters = Vec::new();
    let mut n = position;
    while n > 0 {
        n -= 1;
        let offset = u8::try_from(n % 26).unwrap_or_default();
        letters.push(char::from(base + offset));
        n /= 26;
    }
    letters.iter().rev().collect::<String>() + ". "
}

/// Export settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// First entry to export, 1-based.
    pub start_entry: usize,
    /// Last entry to export, inclusive; 0 (or below `start_entry`) means
    /// through the end.
    pub end_entry: usize,
    /// Entry prefix.
    pub bullet: BulletStyle,
    /// Between a reference and its text.
    pub ref_text_separator: String,
    /// Between entries. `---` is written as three em dashes.
    pub entry_separator: String,
    /// Write `--- Collection: {name} ---` before each collection.
    pub per_collection_header: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            start_entry: 1,
            end_entry: 0,
            bullet: BulletStyle::None,
            ref_text_separator: DEFAULT_REF_TEXT_SEPARATOR.to_string(),
            entry_separator: DEFAULT_ENTRY_SEPARATOR.to_string(),
            per_collection_header: false,
        }
    }
}

impl ExportOptions {
    /// Turn typed `\n` and `\t` escapes into the characters they name.
    pub fn unescape(separator: &str) -> String {
        separator.replace("\\n", "\n").replace("\\t", "\t")
    }

    fn effective_entry_separator(&self) -> String {
        self.entry_separator.replace("---", EM_DASH_RULE)
    }

    fn range(&self, len: usize) -> std::ops::Range<usize> {
        let start = self.start_entry.saturating_sub(1).min(len);
        let end = if self.end_entry == 0 || self.end_entry < self.start_entry {
            len
        } else {
            self.end_entry.min(len)
        };
        start..end.max(start)
    }
}

/// Verse texts of a reference joined by spaces; empty when none were found.
fn entry_text(
    store: &dyn VerseStore,
    reference: &CanonicalReference,
    translation_id: &str,
) -> Result<String> {
    Ok(store
        .lookup(reference, translation_id)?
        .iter()
        .map(|v| v.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" "))
}

/// Render collections with text from one or more translations.
///
/// Entries with no text in any selected translation are left out.
pub fn export_collections(
    collections: &[Collection],
    store: &dyn VerseStore,
    translation_ids: &[String],
    options: &ExportOptions,
) -> Result<String> {
    if translation_ids.is_empty() {
        return Err(Error::config(
            "No translation selected for export",
            "Pass at least one translation id",
        ));
    }

    let names: Vec<String> = {
        let infos = store.translations();
        translation_ids
            .iter()
            .map(|id| {
                infos
                    .iter()
                    .find(|info| info.id.eq_ignore_ascii_case(id))
                    .map_or_else(|| id.clone(), |info| info.name.clone())
            })
            .collect()
    };

    let entry_sep = options.effective_entry_separator();
    let ref_sep = &options.ref_text_separator;
    let mut pieces: Vec<String> = Vec::new();

    for collection in collections {
        if collection.is_empty() {
            pieces.push(format!(
                "Collection \"{}\" is empty or not found.",
                collection.name
            ));
            continue;
        }

        let mut header = options
            .per_collection_header
            .then(|| format!("--- Collection: {} ---", collection.name));

        let range = options.range(collection.len());
        if range.is_empty() {
            if let Some(header) = header {
                pieces.push(format!(
                    "{header}\n(No entries in selected range for \"{}\")",
                    collection.name
                ));
            } else if collections.len() > 1 {
                pieces.push(format!(
                    "(No entries for \"{}\" in selected range)",
                    collection.name
                ));
            }
            continue;
        }

        for (i, reference) in collection.entries[range].iter().enumerate() {
            let bullet = options.bullet.prefix(i + 1);

            let body = if translation_ids.len() > 1 {
                let mut lines = Vec::new();
                for (id, name) in translation_ids.iter().zip(&names) {
                    let text = entry_text(store, reference, id)?;
                    if !text.is_empty() {
                        lines.push(format!("\t({name}){ref_sep}{text}"));
                    }
                }
                (!lines.is_empty())
                    .then(|| format!("{bullet}{reference}\n{}", lines.join("\n")))
            } else {
                let text = entry_text(store, reference, &translation_ids[0])?;
                (!text.is_empty()).then(|| format!("{bullet}{reference}{ref_sep}{text}"))
            };

            if let Some(body) = body {
                match header.take() {
                    Some(header) => pieces.push(format!("{header}\n{body}")),
                    None => pieces.push(body),
                }
            }
        }

        if let Some(header) = header {
            pieces.push(header);
        }
    }

    tracing::debug!(
        "Exported {} collection(s) as {} piece(s)",
        collections.len(),
        pieces.len()
    );
    Ok(pieces.join(&entry_sep).trim().to_string())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::bible::store::{InMemoryStore, Translation};

    fn store() -> InMemoryStore {
        let mut kjv = Translation::new("KJV", "King James Version");
        kjv.insert("John", 3, 16, "For God so loved the world");
        kjv.insert("John", 11, 35, "Jesus wept.");
        kjv.insert("Genesis", 1, 1, "In the beginning");
        kjv.insert("Genesis", 1, 2, "And the earth was without form");

        let mut web = Translation::new("WEB", "World English Bible");
        web.insert("John", 11, 35, "Jesus wept.");

        let mut store = InMemoryStore::new();
        store.add(kjv);
        store.add(web);
        store
    }

    fn collection() -> Collection {
        Collection::new(
            "Memory",
            vec![
                CanonicalReference::single("John", 3, 16),
                CanonicalReference::single("Acts", 1, 1),
                CanonicalReference::range("Genesis", 1, 1, 2).unwrap(),
                CanonicalReference::single("John", 11, 35),
            ],
        )
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_alphabetic_bullets() {
        assert_eq!(BulletStyle::AlphaUpper.prefix(1), "A. ");
        assert_eq!(BulletStyle::AlphaUpper.prefix(26), "Z. ");
        assert_eq!(BulletStyle::AlphaUpper.prefix(27), "AA. ");
        assert_eq!(BulletStyle::AlphaLower.prefix(28), "ab. ");
        assert_eq!(BulletStyle::AlphaLower.prefix(0), "");
    }

    #[test]
    fn test_bullet_parsing() {
        assert_eq!("alpha-upper".parse::<BulletStyle>().unwrap(), BulletStyle::AlphaUpper);
        assert_eq!("Square".parse::<BulletStyle>().unwrap(), BulletStyle::Square);
        assert!("stars".parse::<BulletStyle>().is_err());
        assert_eq!(BulletStyle::Disc.prefix(3), "\u{25CF} ");
    }

    #[test]
    fn test_single_translation_export() {
        let options = ExportOptions {
            bullet: BulletStyle::Numbered,
            ..ExportOptions::default()
        };
        let out = export_collections(&[collection()], &store(), &ids(&["KJV"]), &options).unwrap();
        assert_eq!(
            out,
            "1. John 3:16 - For God so loved the world\n\n\
             3. Genesis 1:1-2 - In the beginning And the earth was without form\n\n\
             4. John 11:35 - Jesus wept."
        );
    }

    #[test]
    fn test_multi_translation_export() {
        let options = ExportOptions {
            start_entry: 4,
            ref_text_separator: ": ".to_string(),
            ..ExportOptions::default()
        };
        let out =
            export_collections(&[collection()], &store(), &ids(&["KJV", "WEB"]), &options).unwrap();
        assert_eq!(
            out,
            "John 11:35\n\t(King James Version): Jesus wept.\n\t(World English Bible): Jesus wept."
        );
    }

    #[test]
    fn test_header_and_em_dash_separator() {
        let options = ExportOptions {
            end_entry: 1,
            entry_separator: "\n---\n".to_string(),
            per_collection_header: true,
            ..ExportOptions::default()
        };
        let empty = Collection::new("Empty", Vec::new());
        let out = export_collections(&[collection(), empty], &store(), &ids(&["KJV"]), &options)
            .unwrap();
        assert_eq!(
            out,
            "--- Collection: Memory ---\nJohn 3:16 - For God so loved the world\n\
             \u{2014}\u{2014}\u{2014}\n\
             Collection \"Empty\" is empty or not found."
        );
    }

    #[test]
    fn test_empty_range_notices() {
        let options = ExportOptions {
            start_entry: 10,
            ..ExportOptions::default()
        };
        let two = [collection(), collection()];
        let out = export_collections(&two, &store(), &ids(&["KJV"]), &options).unwrap();
        assert_eq!(
            out,
            "(No entries for \"Memory\" in selected range)\n\n\
             (No entries for \"Memory\" in selected range)"
        );

        let with_header = ExportOptions {
            per_collection_header: true,
            ..options
        };
        let out = export_collections(&two[..1], &store(), &ids(&["KJV"]), &with_header).unwrap();
        assert_eq!(
            out,
            "--- Collection: Memory ---\n(No entries in selected range for \"Memory\")"
        );
    }

    #[test]
    fn test_requires_translation() {
        let err = export_collections(&[collection()], &store(), &[], &ExportOptions::default());
        assert!(matches!(err, Err(Error::Config { .. })));
    }

    #[test]
    fn test_unescape_separator() {
        assert_eq!(ExportOptions::unescape("\\n\\t-"), "\n\t-");
    }
}
