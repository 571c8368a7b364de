//! Reading translation files into a [`Translation`].
//!
//! Two XML layouts are understood. The Zefania-like one nests `<b n>`,
//! `<c n>` and `<v n>` elements and may carry a title under
//! `<information>`. The numbered one nests `<book number>`,
//! `<chapter number>` and `<verse number>` inside `<bible translation>`.
//! JSON files map book, then chapter, then verse to text.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;

use super::books::display_book_by_number;
use super::resolver::BookResolver;
use super::store::Translation;
use crate::error::{Error, Result};

/// Verse numbers some Zefania files repeat at the start of the text.
#[allow(clippy::expect_used)]
static RE_LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s*").expect("valid regex: RE_LEADING_NUMBER"));

/// Bible data structure: Book -> Chapter -> Verse -> Text
type BibleData = HashMap<String, HashMap<String, HashMap<String, String>>>;

/// Translation id for a file name: the name without its extension.
pub fn translation_id(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map_or_else(|| file_name.to_string(), |s| s.to_string_lossy().into_owned())
}

/// Display name used when the file carries none: the id with `_` as spaces.
pub fn default_display_name(file_name: &str) -> String {
    translation_id(file_name).replace('_', " ")
}

/// Load a `.xml` or `.json` translation file.
pub fn load_file(path: &Path, resolver: &BookResolver) -> Result<Translation> {
    let content =
        fs_err::read_to_string(path).map_err(|e| Error::io(e, path.to_path_buf()))?;
    let file_name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "xml" => parse_xml(&content, &file_name, resolver),
        "json" => parse_json(&content, &file_name),
        _ => Err(Error::parse(
            format!("unsupported translation file type '{ext}'"),
            path.to_path_buf(),
        )),
    }
}

struct RawVerse {
    book: String,
    chapter: u32,
    verse: u32,
    text: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Layout {
    Zefania,
    Numbered,
}

/// Parse an XML translation. Book names from the Zefania layout go through
/// `resolver`; the numbered layout maps standard book numbers.
pub fn parse_xml(xml: &str, file_name: &str, resolver: &BookResolver) -> Result<Translation> {
    let file = || Some(PathBuf::from(file_name));
    let mut reader = Reader::from_str(xml);

    let mut zefania: Vec<RawVerse> = Vec::new();
    let mut numbered: Vec<RawVerse> = Vec::new();

    let mut zef_book: Option<String> = None;
    let mut zef_chapter: Option<u32> = None;
    let mut num_book: Option<String> = None;
    let mut num_chapter: Option<u32> = None;

    let mut open_verse: Option<(Layout, u32)> = None;
    let mut verse_text = String::new();

    let mut in_information = false;
    let mut in_title = false;
    let mut title_text = String::new();
    let mut title: Option<String> = None;
    let mut bible_name: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"b" => {
                    zef_book = attr(e, b"n").map(|n| resolver.resolve(&n));
                }
                b"c" => zef_chapter = attr_number(e, b"n"),
                b"v" if zef_book.is_some() && zef_chapter.is_some() => {
                    open_verse = attr_number(e, b"n").map(|n| (Layout::Zefania, n));
                    verse_text.clear();
                }
                b"bible" => bible_name = attr(e, b"translation"),
                b"book" => num_book = numbered_book(e),
                b"chapter" => num_chapter = attr_number(e, b"number"),
                b"verse" if num_book.is_some() && num_chapter.is_some() => {
                    open_verse = attr_number(e, b"number").map(|n| (Layout::Numbered, n));
                    verse_text.clear();
                }
                b"information" | b"identification" => in_information = true,
                b"title" if in_information && title.is_none() => {
                    in_title = true;
                    title_text.clear();
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"bible" => {
                bible_name = attr(e, b"translation");
            }
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(|e| Error::parse(e.to_string(), file()))?;
                if open_verse.is_some() {
                    verse_text.push_str(&text);
                } else if in_title {
                    title_text.push_str(&text);
                }
            }
            Ok(Event::CData(c)) => {
                let inner = c.into_inner();
                let text = String::from_utf8_lossy(&inner);
                if open_verse.is_some() {
                    verse_text.push_str(&text);
                } else if in_title {
                    title_text.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"v" | b"verse" => {
                    if let Some((layout, verse)) = open_verse.take() {
                        let (book, chapter, target) = match layout {
                            Layout::Zefania => (&zef_book, zef_chapter, &mut zefania),
                            Layout::Numbered => (&num_book, num_chapter, &mut numbered),
                        };
                        if let (Some(book), Some(chapter)) = (book, chapter) {
                            let trimmed = verse_text.trim();
                            let text = match layout {
                                Layout::Zefania => {
                                    RE_LEADING_NUMBER.replace(trimmed, "").into_owned()
                                }
                                Layout::Numbered => trimmed.to_string(),
                            };
                            target.push(RawVerse {
                                book: book.clone(),
                                chapter,
                                verse,
                                text,
                            });
                        }
                    }
                }
                b"b" => zef_book = None,
                b"c" => zef_chapter = None,
                b"book" => num_book = None,
                b"chapter" => num_chapter = None,
                b"title" if in_title => {
                    in_title = false;
                    let t = title_text.trim();
                    if !t.is_empty() {
                        title = Some(t.to_string());
                    }
                }
                b"information" | b"identification" => in_information = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::parse(
                    format!("XML error at position {}: {e}", reader.buffer_position()),
                    file(),
                ));
            }
            _ => {}
        }
    }

    let (verses, name) = if zefania.is_empty() {
        tracing::debug!("{file_name}: no Zefania verses, using numbered book layout");
        (numbered, bible_name)
    } else {
        (zefania, title)
    };

    if verses.is_empty() {
        return Err(Error::parse(
            "No verses found in XML after attempting all known formats",
            file(),
        ));
    }

    let mut translation = Translation::new(
        translation_id(file_name),
        name.unwrap_or_else(|| default_display_name(file_name)),
    );
    for v in verses {
        translation.insert(&v.book, v.chapter, v.verse, v.text);
    }
    Ok(translation)
}

/// Parse a JSON translation: `{ "Book": { "1": { "1": "text" } } }`.
///
/// Chapter or verse keys that are not numbers are skipped with a warning.
pub fn parse_json(json: &str, file_name: &str) -> Result<Translation> {
    let data: BibleData = serde_json::from_str(json)
        .map_err(|e| Error::parse(e.to_string(), PathBuf::from(file_name)))?;

    let mut translation =
        Translation::new(translation_id(file_name), default_display_name(file_name));
    for (book, chapters) in &data {
        for (chapter_key, verses) in chapters {
            let Ok(chapter) = chapter_key.trim().parse::<u32>() else {
                tracing::warn!("{file_name}: skipping chapter key '{chapter_key}' in {book}");
                continue;
            };
            for (verse_key, text) in verses {
                let Ok(verse) = verse_key.trim().parse::<u32>() else {
                    tracing::warn!(
                        "{file_name}: skipping verse key '{verse_key}' in {book} {chapter}"
                    );
                    continue;
                };
                translation.insert(book, chapter, verse, text.trim());
            }
        }
    }

    if translation.is_empty() {
        return Err(Error::parse("No verses found in JSON", PathBuf::from(file_name)));
    }
    Ok(translation)
}

fn attr(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| a.unescape_value().ok().map(|v| v.trim().to_string()))
        .filter(|v| !v.is_empty())
}

fn attr_number(e: &BytesStart<'_>, name: &[u8]) -> Option<u32> {
    attr(e, name)?.parse().ok()
}

fn numbered_book(e: &BytesStart<'_>) -> Option<String> {
    let raw = attr(e, b"number")?;
    match raw.parse::<u32>() {
        Ok(n) => Some(display_book_by_number(n)),
        Err(_) => {
            tracing::warn!("Book number {raw} not found in standard list");
            Some(format!("Book {raw}"))
        }
    }
}
