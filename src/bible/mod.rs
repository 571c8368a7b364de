//! Bible reference parsing, extraction and verse lookup.
//!
//! The parsing core is [`resolver`] (book names), [`reference`] (one
//! citation) and [`extract`] (every citation in free text). [`store`] and
//! [`import`] supply verse text for the services built on top.

pub mod books;
pub mod compact;
pub mod extract;
pub mod import;
pub mod reference;
pub mod resolver;
pub mod store;

pub use extract::{ChapterReference, ExtractedReference, Extraction, Extractor, ExtractorBuilder};
pub use reference::{CanonicalReference, ReferenceParser, StandardParser};
pub use resolver::BookResolver;
pub use store::{InMemoryStore, Translation, TranslationInfo, TranslationLibrary, Verse, VerseStore};
