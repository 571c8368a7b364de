//! Translations and verse lookup.
//!
//! A [`VerseStore`] answers "give me these verses from that translation".
//! [`InMemoryStore`] holds translations handed to it directly, while
//! [`TranslationLibrary`] reads them from a directory on first use.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use super::import;
use super::reference::CanonicalReference;
use super::resolver::BookResolver;
use crate::constants::files::TRANSLATION_EXTENSIONS;
use crate::error::{Error, Result};

/// A single verse with its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verse {
    /// Canonical book name.
    pub book: String,
    /// Chapter number.
    pub chapter: u32,
    /// Verse number.
    pub verse: u32,
    /// Verse text.
    pub text: String,
}

impl Verse {
    /// `"{book} {chapter}:{verse}"`.
    pub fn reference(&self) -> String {
        format!("{} {}:{}", self.book, self.chapter, self.verse)
    }
}

/// Summary of a loaded translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationInfo {
    /// Identifier used to request the translation (the file stem).
    pub id: String,
    /// Human readable name.
    pub name: String,
    /// Number of verses held.
    pub verse_count: usize,
}

#[derive(Debug, Clone, Default)]
struct BookEntry {
    name: String,
    chapters: BTreeMap<u32, BTreeMap<u32, String>>,
}

/// One translation's verses, indexed by book, chapter and verse.
#[derive(Debug, Clone)]
pub struct Translation {
    id: String,
    name: String,
    /// Keyed by lower-cased book name.
    books: HashMap<String, BookEntry>,
    verse_count: usize,
}

impl Translation {
    /// Create an empty translation.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            books: HashMap::new(),
            verse_count: 0,
        }
    }

    /// Identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add or replace a verse.
    pub fn insert(&mut self, book: &str, chapter: u32, verse: u32, text: impl Into<String>) {
        let book = book.trim();
        let entry = self
            .books
            .entry(book.to_lowercase())
            .or_insert_with(|| BookEntry {
                name: book.to_string(),
                chapters: BTreeMap::new(),
            });
        if entry
            .chapters
            .entry(chapter)
            .or_default()
            .insert(verse, text.into())
            .is_none()
        {
            self.verse_count += 1;
        }
    }

    /// Verses `start..=end` of a chapter, sorted by number. Missing verses
    /// are skipped; an unknown book or chapter gives an empty list.
    pub fn verses(&self, book: &str, chapter: u32, start: u32, end: u32) -> Vec<Verse> {
        let Some(entry) = self.books.get(&book.trim().to_lowercase()) else {
            return Vec::new();
        };
        let Some(verses) = entry.chapters.get(&chapter) else {
            return Vec::new();
        };
        if end < start {
            return Vec::new();
        }

        verses
            .range(start..=end)
            .map(|(&verse, text)| Verse {
                book: entry.name.clone(),
                chapter,
                verse,
                text: text.clone(),
            })
            .collect()
    }

    /// Book names, sorted.
    pub fn books(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.books.values().map(|b| b.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Total verses held.
    pub const fn verse_count(&self) -> usize {
        self.verse_count
    }

    /// Whether no verses were loaded.
    pub const fn is_empty(&self) -> bool {
        self.verse_count == 0
    }

    /// Summary for listings.
    pub fn info(&self) -> TranslationInfo {
        TranslationInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            verse_count: self.verse_count,
        }
    }
}

/// Trait for verse lookup providers.
///
/// Different implementations can provide verses from various sources
/// (files on disk, embedded data, test fixtures).
pub trait VerseStore {
    /// Verses `start..=end` of `book` `chapter` in the given translation.
    ///
    /// An unknown book yields an empty list. An unknown translation is an
    /// [`Error::Translation`].
    fn find_verses(
        &self,
        book: &str,
        chapter: u32,
        start: u32,
        end: u32,
        translation_id: &str,
    ) -> Result<Vec<Verse>>;

    /// Translations this store can serve.
    fn translations(&self) -> Vec<TranslationInfo>;

    /// Verses covered by a reference.
    fn lookup(&self, reference: &CanonicalReference, translation_id: &str) -> Result<Vec<Verse>> {
        self.find_verses(
            &reference.book,
            reference.chapter,
            reference.start_verse,
            reference.end_verse,
            translation_id,
        )
    }

    /// Every verse of a chapter.
    fn chapter(&self, book: &str, chapter: u32, translation_id: &str) -> Result<Vec<Verse>> {
        self.find_verses(book, chapter, 1, u32::MAX, translation_id)
    }

    /// Check if a specific translation is available.
    fn has_translation(&self, translation_id: &str) -> bool {
        self.translations()
            .iter()
            .any(|t| t.id.eq_ignore_ascii_case(translation_id))
    }
}

/// Translations held in memory, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    translations: Vec<Translation>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a translation, replacing one with the same id.
    pub fn add(&mut self, translation: Translation) {
        if let Some(existing) = self
            .translations
            .iter_mut()
            .find(|t| t.id.eq_ignore_ascii_case(&translation.id))
        {
            *existing = translation;
        } else {
            self.translations.push(translation);
        }
    }

    /// Remove a translation by id; returns whether one was removed.
    pub fn remove(&mut self, translation_id: &str) -> bool {
        let before = self.translations.len();
        self.translations
            .retain(|t| !t.id.eq_ignore_ascii_case(translation_id));
        before != self.translations.len()
    }

    /// Get a translation by id.
    pub fn get(&self, translation_id: &str) -> Option<&Translation> {
        self.translations
            .iter()
            .find(|t| t.id.eq_ignore_ascii_case(translation_id))
    }
}

impl VerseStore for InMemoryStore {
    fn find_verses(
        &self,
        book: &str,
        chapter: u32,
        start: u32,
        end: u32,
        translation_id: &str,
    ) -> Result<Vec<Verse>> {
        self.get(translation_id)
            .map(|t| t.verses(book, chapter, start, end))
            .ok_or_else(|| Error::Translation(translation_id.to_string()))
    }

    fn translations(&self) -> Vec<TranslationInfo> {
        self.translations.iter().map(Translation::info).collect()
    }
}

/// Directory of translation files, loaded lazily and cached.
#[derive(Debug)]
pub struct TranslationLibrary {
    data_path: PathBuf,
    resolver: Arc<BookResolver>,
    cache: RwLock<HashMap<String, Arc<Translation>>>,
}

impl TranslationLibrary {
    /// Create a library over `data_path`. Nothing is read until a lookup.
    pub fn new(data_path: impl Into<PathBuf>, resolver: Arc<BookResolver>) -> Self {
        Self {
            data_path: data_path.into(),
            resolver,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// The directory translations are read from.
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Translation files in the directory, sorted by file name.
    pub fn available(&self) -> Result<Vec<PathBuf>> {
        let entries = fs_err::read_dir(&self.data_path)
            .map_err(|e| Error::io(e, self.data_path.clone()))?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_translation_file(path))
            .collect();
        files.sort();
        Ok(files)
    }

    /// Get a translation, loading it on first use.
    ///
    /// `translation_id` matches a file stem or a full file name,
    /// case-insensitively.
    pub fn get(&self, translation_id: &str) -> Result<Arc<Translation>> {
        let key = translation_id.to_lowercase();
        if let Some(t) = self.read_cache()?.get(&key) {
            return Ok(Arc::clone(t));
        }

        let path = self
            .available()?
            .into_iter()
            .find(|path| file_matches(path, &key))
            .ok_or_else(|| Error::Translation(translation_id.to_string()))?;

        tracing::info!("Loading translation {} from {}", translation_id, path.display());
        let translation = Arc::new(import::load_file(&path, &self.resolver)?);
        tracing::debug!(
            "Loaded {} verses for {}",
            translation.verse_count(),
            translation.id()
        );

        self.cache
            .write()
            .map_err(|_| Error::Msg("translation cache lock poisoned".to_string()))?
            .insert(key, Arc::clone(&translation));
        Ok(translation)
    }

    /// Ids of translations currently cached.
    pub fn loaded(&self) -> Vec<String> {
        self.read_cache()
            .map(|cache| cache.values().map(|t| t.id().to_string()).collect())
            .unwrap_or_default()
    }

    fn read_cache(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, Arc<Translation>>>> {
        self.cache
            .read()
            .map_err(|_| Error::Msg("translation cache lock poisoned".to_string()))
    }
}

impl VerseStore for TranslationLibrary {
    fn find_verses(
        &self,
        book: &str,
        chapter: u32,
        start: u32,
        end: u32,
        translation_id: &str,
    ) -> Result<Vec<Verse>> {
        Ok(self.get(translation_id)?.verses(book, chapter, start, end))
    }

    /// Loads every file in the directory. Files that fail to load are
    /// logged and left out.
    fn translations(&self) -> Vec<TranslationInfo> {
        let files = match self.available() {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!("Cannot list translations: {e}");
                return Vec::new();
            }
        };

        files
            .iter()
            .filter_map(|path| {
                let id = import::translation_id(&path.file_name()?.to_string_lossy());
                match self.get(&id) {
                    Ok(t) => Some(t.info()),
                    Err(e) => {
                        tracing::warn!("Skipping {}: {e}", path.display());
                        None
                    }
                }
            })
            .collect()
    }
}

fn is_translation_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            TRANSLATION_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

fn file_matches(path: &Path, key: &str) -> bool {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase());
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_lowercase());
    stem.as_deref() == Some(key) || name.as_deref() == Some(key)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    fn sample() -> Translation {
        let mut t = Translation::new("TEST", "Test Bible");
        t.insert("Genesis", 1, 1, "In the beginning");
        t.insert("Genesis", 1, 3, "Let there be light");
        t.insert("Genesis", 1, 2, "The earth was without form");
        t.insert("John", 3, 16, "For God so loved");
        t
    }

    #[test]
    fn test_verses_sorted_and_case_insensitive() {
        let t = sample();
        let verses = t.verses("genesis", 1, 1, 3);
        let numbers: Vec<u32> = verses.iter().map(|v| v.verse).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(verses[0].book, "Genesis");
        assert_eq!(verses[0].reference(), "Genesis 1:1");
    }

    #[test]
    fn test_unknown_book_is_empty() {
        let t = sample();
        assert!(t.verses("Exodus", 1, 1, 3).is_empty());
        assert!(t.verses("Genesis", 9, 1, 3).is_empty());
    }

    #[test]
    fn test_verse_count_ignores_replacements() {
        let mut t = sample();
        assert_eq!(t.verse_count(), 4);
        t.insert("Genesis", 1, 1, "replaced");
        assert_eq!(t.verse_count(), 4);
        assert_eq!(t.verses("Genesis", 1, 1, 1)[0].text, "replaced");
    }

    #[test]
    fn test_in_memory_store() {
        let mut store = InMemoryStore::new();
        store.add(sample());

        let r = CanonicalReference::single("John", 3, 16);
        let verses = store.lookup(&r, "test").unwrap();
        assert_eq!(verses.len(), 1);

        let chapter = store.chapter("Genesis", 1, "TEST").unwrap();
        assert_eq!(chapter.len(), 3);

        assert!(store.has_translation("Test"));
        assert!(matches!(
            store.lookup(&r, "missing"),
            Err(Error::Translation(id)) if id == "missing"
        ));

        assert!(store.remove("TEST"));
        assert!(store.translations().is_empty());
    }

    #[test]
    fn test_library_loads_lazily() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Mini_Bible.json"),
            r#"{"Genesis": {"1": {"1": "In the beginning"}}}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let library = TranslationLibrary::new(dir.path(), Arc::new(BookResolver::standard()));
        assert!(library.loaded().is_empty());
        assert_eq!(library.available().unwrap().len(), 1);

        let verses = library.find_verses("Genesis", 1, 1, 1, "mini_bible").unwrap();
        assert_eq!(verses[0].text, "In the beginning");
        assert_eq!(library.loaded(), vec!["Mini_Bible".to_string()]);

        let infos = library.translations();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].name, "Mini Bible");

        assert!(matches!(
            library.find_verses("Genesis", 1, 1, 1, "KJV"),
            Err(Error::Translation(_))
        ));
    }
}
