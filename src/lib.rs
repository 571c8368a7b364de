//! `verseflow` - Bible reference parsing, extraction and verse lookup.
//!
//! The core turns free text such as `"Gen 1:1-3, 5; Jn 3:16"` into canonical
//! references ([`bible::Extractor`]), one citation at a time
//! ([`bible::StandardParser`]) or a whole paste at once, resolving book
//! abbreviations through an explicit [`bible::BookResolver`]. The services
//! layer validates collections, compiles prompts and exports text using a
//! [`bible::VerseStore`].

pub mod bible;
pub mod config;
pub mod constants;
pub mod error;
pub mod services;
