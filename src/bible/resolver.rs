//! Book name resolution.
//!
//! Maps whatever a user typed for a book ("gen", "1 Cor", "i corinthians",
//! "1jn") to one of the canonical names in [`CANONICAL_BOOKS`]. The alias
//! table is plain data held by a [`BookResolver`] value; callers build one
//! explicitly and may merge further schemes (TSK codes, JSON overlays) into
//! it without touching the parsers.

use std::collections::HashMap;
use std::path::Path;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use super::books::CANONICAL_BOOKS;
use crate::error::{Error, Result};

/// Returned by [`BookResolver::resolve`] for an empty token.
pub const UNKNOWN_BOOK: &str = "Unknown Book";

/// Standard aliases: full names, common abbreviations and Zefania short codes.
///
/// Keys are already normalized (lower-case, single spaces).
#[rustfmt::skip]
pub const STANDARD_ALIASES: &[(&str, &str)] = &[
    // Old Testament
    ("gen", "Genesis"), ("ge", "Genesis"), ("gn", "Genesis"),
    ("exo", "Exodus"), ("ex", "Exodus"), ("exod", "Exodus"),
    ("lev", "Leviticus"), ("lv", "Leviticus"),
    ("num", "Numbers"), ("nm", "Numbers"), ("nu", "Numbers"),
    ("deu", "Deuteronomy"), ("deut", "Deuteronomy"), ("dt", "Deuteronomy"),
    ("jos", "Joshua"), ("josh", "Joshua"), ("jsh", "Joshua"),
    ("jdg", "Judges"), ("judg", "Judges"), ("jdgs", "Judges"),
    ("rut", "Ruth"), ("rth", "Ruth"),
    ("1sa", "1 Samuel"), ("1sam", "1 Samuel"), ("1 sam", "1 Samuel"), ("1 sm", "1 Samuel"),
    ("i samuel", "1 Samuel"), ("1st samuel", "1 Samuel"),
    ("2sa", "2 Samuel"), ("2sam", "2 Samuel"), ("2 sam", "2 Samuel"), ("2 sm", "2 Samuel"),
    ("ii samuel", "2 Samuel"), ("2nd samuel", "2 Samuel"),
    ("1ki", "1 Kings"), ("1kgs", "1 Kings"), ("1 kgs", "1 Kings"),
    ("i kings", "1 Kings"), ("1st kings", "1 Kings"),
    ("2ki", "2 Kings"), ("2kgs", "2 Kings"), ("2 kgs", "2 Kings"),
    ("ii kings", "2 Kings"), ("2nd kings", "2 Kings"),
    ("1ch", "1 Chronicles"), ("1chr", "1 Chronicles"), ("1 ch", "1 Chronicles"),
    ("i chronicles", "1 Chronicles"), ("1st chronicles", "1 Chronicles"),
    ("2ch", "2 Chronicles"), ("2chr", "2 Chronicles"), ("2 ch", "2 Chronicles"),
    ("ii chronicles", "2 Chronicles"), ("2nd chronicles", "2 Chronicles"),
    ("ezr", "Ezra"),
    ("neh", "Nehemiah"), ("ne", "Nehemiah"),
    ("est", "Esther"), ("esth", "Esther"), ("es", "Esther"),
    ("jb", "Job"),
    ("psa", "Psalms"), ("psalm", "Psalms"), ("ps", "Psalms"), ("pss", "Psalms"),
    ("pro", "Proverbs"), ("prov", "Proverbs"), ("prv", "Proverbs"),
    ("ecc", "Ecclesiastes"), ("eccl", "Ecclesiastes"), ("eccles", "Ecclesiastes"),
    ("ec", "Ecclesiastes"), ("qoheleth", "Ecclesiastes"),
    ("sng", "Song of Solomon"), ("song of songs", "Song of Solomon"), ("sos", "Song of Solomon"),
    ("song", "Song of Solomon"), ("canticles", "Song of Solomon"), ("cant", "Song of Solomon"),
    ("isa", "Isaiah"), ("is", "Isaiah"),
    ("jer", "Jeremiah"), ("je", "Jeremiah"), ("jerem", "Jeremiah"),
    ("lam", "Lamentations"), ("la", "Lamentations"),
    ("eze", "Ezekiel"), ("ezek", "Ezekiel"), ("ez", "Ezekiel"),
    ("dan", "Daniel"), ("da", "Daniel"), ("dn", "Daniel"),
    ("hos", "Hosea"), ("ho", "Hosea"),
    ("joe", "Joel"), ("jl", "Joel"),
    ("amo", "Amos"), ("am", "Amos"),
    ("oba", "Obadiah"), ("obad", "Obadiah"), ("ob", "Obadiah"),
    ("jon", "Jonah"),
    ("mic", "Micah"), ("mi", "Micah"),
    ("nah", "Nahum"), ("na", "Nahum"),
    ("hab", "Habakkuk"), ("hk", "Habakkuk"),
    ("zep", "Zephaniah"), ("zeph", "Zephaniah"), ("zp", "Zephaniah"),
    ("hag", "Haggai"), ("hg", "Haggai"),
    ("zec", "Zechariah"), ("zech", "Zechariah"), ("zc", "Zechariah"),
    ("mal", "Malachi"), ("ml", "Malachi"),
    // New Testament
    ("mat", "Matthew"), ("mt", "Matthew"), ("matt", "Matthew"),
    ("mar", "Mark"), ("mrk", "Mark"), ("mk", "Mark"),
    ("luk", "Luke"), ("lk", "Luke"),
    ("joh", "John"), ("jn", "John"),
    ("act", "Acts"), ("ac", "Acts"),
    ("rom", "Romans"), ("ro", "Romans"), ("rm", "Romans"),
    ("1co", "1 Corinthians"), ("1cor", "1 Corinthians"), ("1 cor", "1 Corinthians"),
    ("i corinthians", "1 Corinthians"), ("1st corinthians", "1 Corinthians"),
    ("2co", "2 Corinthians"), ("2cor", "2 Corinthians"), ("2 cor", "2 Corinthians"),
    ("ii corinthians", "2 Corinthians"), ("2nd corinthians", "2 Corinthians"),
    ("gal", "Galatians"), ("ga", "Galatians"),
    ("eph", "Ephesians"), ("ephes", "Ephesians"),
    ("phi", "Philippians"), ("php", "Philippians"), ("phil", "Philippians"),
    ("col", "Colossians"), ("cl", "Colossians"),
    ("1th", "1 Thessalonians"), ("1thes", "1 Thessalonians"), ("1thess", "1 Thessalonians"),
    ("1 thess", "1 Thessalonians"), ("i thessalonians", "1 Thessalonians"),
    ("1st thessalonians", "1 Thessalonians"),
    ("2th", "2 Thessalonians"), ("2thes", "2 Thessalonians"), ("2thess", "2 Thessalonians"),
    ("2 thess", "2 Thessalonians"), ("ii thessalonians", "2 Thessalonians"),
    ("2nd thessalonians", "2 Thessalonians"),
    ("1ti", "1 Timothy"), ("1tim", "1 Timothy"), ("1 tim", "1 Timothy"),
    ("i timothy", "1 Timothy"), ("1st timothy", "1 Timothy"),
    ("2ti", "2 Timothy"), ("2tim", "2 Timothy"), ("2 tim", "2 Timothy"),
    ("ii timothy", "2 Timothy"), ("2nd timothy", "2 Timothy"),
    ("tit", "Titus"), ("ti", "Titus"),
    ("phm", "Philemon"), ("philem", "Philemon"), ("phmn", "Philemon"),
    ("heb", "Hebrews"), ("hb", "Hebrews"),
    ("jas", "James"), ("jm", "James"), ("jam", "James"),
    ("1pe", "1 Peter"), ("1pet", "1 Peter"), ("1 pet", "1 Peter"),
    ("i peter", "1 Peter"), ("1st peter", "1 Peter"),
    ("2pe", "2 Peter"), ("2pet", "2 Peter"), ("2 pet", "2 Peter"),
    ("ii peter", "2 Peter"), ("2nd peter", "2 Peter"),
    ("1jn", "1 John"), ("1 jn", "1 John"), ("i john", "1 John"), ("1st john", "1 John"),
    ("2jn", "2 John"), ("2 jn", "2 John"), ("ii john", "2 John"), ("2nd john", "2 John"),
    ("3jn", "3 John"), ("3 jn", "3 John"), ("iii john", "3 John"), ("3rd john", "3 John"),
    ("jud", "Jude"), ("jd", "Jude"),
    ("rev", "Revelation"), ("re", "Revelation"), ("revs", "Revelation"),
    ("revelations", "Revelation"), ("apocalypse", "Revelation"), ("apoc", "Revelation"),
];

/// Treasury of Scripture Knowledge abbreviations.
///
/// Merged over the standard table by [`BookResolver::with_tsk_aliases`];
/// note that `jud` means Judges here but Jude in the standard table.
#[rustfmt::skip]
pub const TSK_ABBREVIATIONS: &[(&str, &str)] = &[
    ("ge", "Genesis"), ("ex", "Exodus"), ("le", "Leviticus"), ("nu", "Numbers"),
    ("de", "Deuteronomy"), ("jos", "Joshua"), ("jud", "Judges"), ("ru", "Ruth"),
    ("1sa", "1 Samuel"), ("2sa", "2 Samuel"), ("1ki", "1 Kings"), ("2ki", "2 Kings"),
    ("1ch", "1 Chronicles"), ("2ch", "2 Chronicles"), ("ezr", "Ezra"), ("ne", "Nehemiah"),
    ("es", "Esther"), ("job", "Job"), ("ps", "Psalms"), ("pr", "Proverbs"),
    ("ec", "Ecclesiastes"), ("so", "Song of Solomon"), ("isa", "Isaiah"), ("jer", "Jeremiah"),
    ("la", "Lamentations"), ("eze", "Ezekiel"), ("da", "Daniel"), ("ho", "Hosea"),
    ("joe", "Joel"), ("am", "Amos"), ("ob", "Obadiah"), ("jon", "Jonah"),
    ("mic", "Micah"), ("na", "Nahum"), ("hab", "Habakkuk"), ("zep", "Zephaniah"),
    ("hag", "Haggai"), ("zec", "Zechariah"), ("mal", "Malachi"), ("mt", "Matthew"),
    ("mr", "Mark"), ("lu", "Luke"), ("joh", "John"), ("ac", "Acts"),
    ("ro", "Romans"), ("1co", "1 Corinthians"), ("2co", "2 Corinthians"), ("ga", "Galatians"),
    ("eph", "Ephesians"), ("php", "Philippians"), ("col", "Colossians"), ("1th", "1 Thessalonians"),
    ("2th", "2 Thessalonians"), ("1ti", "1 Timothy"), ("2ti", "2 Timothy"), ("tit", "Titus"),
    ("phm", "Philemon"), ("heb", "Hebrews"), ("jas", "James"), ("1pe", "1 Peter"),
    ("2pe", "2 Peter"), ("1jo", "1 John"), ("2jo", "2 John"), ("3jo", "3 John"),
    ("jude", "Jude"), ("re", "Revelation"),
];

/// Lower-case a book token and collapse internal whitespace to single spaces.
pub fn normalize_token(token: &str) -> String {
    token.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Book alias table with lookup, fallback and merge operations.
#[derive(Debug, Clone, Default)]
pub struct BookResolver {
    aliases: HashMap<String, String>,
}

impl BookResolver {
    /// A resolver with no aliases at all; every token falls back.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard table: every canonical name, its space-free spelling
    /// ("1John", "SongofSolomon") and [`STANDARD_ALIASES`].
    pub fn standard() -> Self {
        let mut resolver = Self::from_aliases(STANDARD_ALIASES.iter().copied());
        resolver.merge(CANONICAL_BOOKS.iter().map(|&b| (b, b)));
        resolver.merge(CANONICAL_BOOKS.iter().map(|&b| (b.replace(' ', ""), b)));
        resolver
    }

    /// Build a resolver from `(alias, canonical)` pairs.
    pub fn from_aliases<I, A, C>(aliases: I) -> Self
    where
        I: IntoIterator<Item = (A, C)>,
        A: AsRef<str>,
        C: Into<String>,
    {
        let mut resolver = Self::empty();
        resolver.merge(aliases);
        resolver
    }

    /// Merge the TSK abbreviation scheme over the current table.
    #[must_use]
    pub fn with_tsk_aliases(mut self) -> Self {
        self.merge(TSK_ABBREVIATIONS.iter().copied());
        self
    }

    /// Add or replace one alias.
    pub fn insert(&mut self, alias: &str, canonical: impl Into<String>) {
        self.aliases.insert(normalize_token(alias), canonical.into());
    }

    /// Merge `(alias, canonical)` pairs; later entries win.
    pub fn merge<I, A, C>(&mut self, aliases: I)
    where
        I: IntoIterator<Item = (A, C)>,
        A: AsRef<str>,
        C: Into<String>,
    {
        for (alias, canonical) in aliases {
            self.insert(alias.as_ref(), canonical);
        }
    }

    /// Merge a JSON object of `{ "alias": "Canonical Name" }` from disk.
    ///
    /// Returns the number of aliases merged.
    pub fn load_overlay(&mut self, path: &Path) -> Result<usize> {
        let content = fs_err::read_to_string(path)
            .map_err(|e| Error::io(e, path.to_path_buf()))?;
        let overlay: HashMap<String, String> = serde_json::from_str(&content)
            .map_err(|e| Error::parse(e.to_string(), path.to_path_buf()))?;
        let count = overlay.len();
        self.merge(overlay);
        tracing::info!("Merged {count} book aliases from {}", path.display());
        Ok(count)
    }

    /// Strict lookup: the canonical name for `token`, if the table knows it.
    ///
    /// Tries the normalized token first, then the token with all spaces
    /// removed so "1 cor" finds "1cor".
    pub fn lookup(&self, token: &str) -> Option<&str> {
        let normalized = normalize_token(token);
        if let Some(canonical) = self.aliases.get(&normalized) {
            return Some(canonical.as_str());
        }
        let no_space = normalized.replace(' ', "");
        self.aliases.get(&no_space).map(String::as_str)
    }

    /// Whether the table resolves `token`.
    pub fn is_known(&self, token: &str) -> bool {
        self.lookup(token).is_some()
    }

    /// Resolve a book token to its canonical name.
    ///
    /// Never fails: an unknown token comes back whitespace-collapsed with its
    /// first letter capitalized, and downstream lookups simply find no verses.
    pub fn resolve(&self, token: &str) -> String {
        if let Some(canonical) = self.lookup(token) {
            return canonical.to_string();
        }
        let collapsed = token.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            return UNKNOWN_BOOK.to_string();
        }
        capitalize_first(&collapsed)
    }

    /// Canonical names ranked by fuzzy similarity to `token`.
    ///
    /// Aliases count toward the canonical name they map to, so "corin" ranks
    /// both Corinthians books and "psal" ranks Psalms.
    pub fn suggest(&self, token: &str, limit: usize) -> Vec<String> {
        let query = normalize_token(token);
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }

        let matcher = SkimMatcherV2::default();
        let mut best: HashMap<&str, i64> = HashMap::new();

        let candidates = self
            .aliases
            .iter()
            .map(|(alias, canonical)| (alias.as_str(), canonical.as_str()));
        for (choice, canonical) in candidates {
            if let Some(score) = matcher.fuzzy_match(choice, &query) {
                let entry = best.entry(canonical).or_insert(score);
                *entry = (*entry).max(score);
            }
        }

        let mut scored: Vec<_> = best.into_iter().collect();
        scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        scored.into_iter().take(limit).map(|(name, _)| name.to_string()).collect()
    }

    /// Number of aliases in the table.
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use std::io::Write;

    #[test]
    fn test_case_and_whitespace_insensitive() {
        let r = BookResolver::standard();
        assert_eq!(r.resolve(" GEN "), "Genesis");
        assert_eq!(r.resolve("gen"), "Genesis");
        assert_eq!(r.resolve("Song   of\tSongs"), "Song of Solomon");
    }

    #[test]
    fn test_numbered_variants() {
        let r = BookResolver::standard();
        for token in ["1co", "1 Corinthians", "i corinthians", "1st Corinthians", "1 cor", "1Cor"] {
            assert_eq!(r.resolve(token), "1 Corinthians", "token {token:?}");
        }
        assert_eq!(r.resolve("1jn"), "1 John");
        assert_eq!(r.resolve("iii john"), "3 John");
        assert_eq!(r.resolve("2nd kings"), "2 Kings");
    }

    #[test]
    fn test_space_free_numbered_names() {
        let r = BookResolver::standard();
        for book in CANONICAL_BOOKS.iter().filter(|b| b.starts_with(['1', '2', '3'])) {
            let joined = book.replace(' ', "");
            assert_eq!(r.resolve(&joined), *book, "token {joined:?}");
            assert_eq!(r.resolve(&joined.to_lowercase()), *book, "token {joined:?}");
        }
        assert_eq!(r.resolve("SongofSolomon"), "Song of Solomon");
    }

    #[test]
    fn test_every_canonical_name_is_idempotent() {
        let r = BookResolver::standard();
        for book in CANONICAL_BOOKS {
            assert_eq!(r.resolve(book), book);
            assert_eq!(r.resolve(&r.resolve(book)), book);
        }
    }

    #[test]
    fn test_fallback_capitalizes() {
        let r = BookResolver::standard();
        assert_eq!(r.resolve("xyz"), "Xyz");
        assert_eq!(r.resolve("Xyz"), "Xyz");
        assert_eq!(r.resolve("see  also John"), "See also John");
        assert_eq!(r.resolve(&r.resolve("xyz")), "Xyz");
        assert_eq!(r.resolve("   "), UNKNOWN_BOOK);
    }

    #[test]
    fn test_lookup_is_strict() {
        let r = BookResolver::standard();
        assert_eq!(r.lookup("Rev"), Some("Revelation"));
        assert_eq!(r.lookup("xyz"), None);
        assert!(!BookResolver::empty().is_known("Genesis"));
    }

    #[test]
    fn test_tsk_overlay_overrides_jud() {
        let standard = BookResolver::standard();
        assert_eq!(standard.resolve("jud"), "Jude");
        let tsk = BookResolver::standard().with_tsk_aliases();
        assert_eq!(tsk.resolve("jud"), "Judges");
        assert_eq!(tsk.resolve("mr"), "Mark");
        assert_eq!(tsk.resolve("1jo"), "1 John");
    }

    #[test]
    fn test_custom_table_injection() {
        let r = BookResolver::from_aliases([("mk", "Mark"), ("Gospel of Mark", "Mark")]);
        assert_eq!(r.resolve("gospel  of mark"), "Mark");
        assert_eq!(r.resolve("gen"), "Gen");
    }

    #[test]
    fn test_load_overlay() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"Gn": "Genesis", "qoh": "Ecclesiastes"}}"#).unwrap();
        let mut r = BookResolver::empty();
        let merged = r.load_overlay(file.path()).unwrap();
        assert_eq!(merged, 2);
        assert_eq!(r.resolve("QOH"), "Ecclesiastes");
        assert_eq!(r.resolve("gn"), "Genesis");
    }

    #[test]
    fn test_load_overlay_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2, 3]").unwrap();
        let mut r = BookResolver::empty();
        assert!(matches!(r.load_overlay(file.path()), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_suggest_ranks_books() {
        let r = BookResolver::standard();
        let suggestions = r.suggest("corinth", 3);
        assert!(suggestions.contains(&"1 Corinthians".to_string()));
        assert!(suggestions.contains(&"2 Corinthians".to_string()));
        assert!(r.suggest("", 3).is_empty());
    }
}
