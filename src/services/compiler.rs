//! Bulk compilation of reference prompts into one text document.
//!
//! Each prompt line becomes a section headed `== {title} ==` with the verse
//! texts beneath it. Whole-chapter prompts such as `Ps 23` expand to every
//! verse of the chapter.

use crate::bible::extract::Extractor;
use crate::bible::store::VerseStore;
use crate::constants::compile::{NO_TEXT_NOTICE, SECTION_SEPARATOR};
use crate::error::Result;

/// One compiled prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledSection {
    /// The prompt line as given (trimmed).
    pub prompt: String,
    /// Heading text; canonical references joined by `"; "`.
    pub title: String,
    /// Verse texts in reference order.
    pub verses: Vec<String>,
}

impl CompiledSection {
    /// Whether any verse text was found for the prompt.
    pub fn is_found(&self) -> bool {
        !self.verses.is_empty()
    }

    /// Render the section.
    pub fn render(&self) -> String {
        if self.is_found() {
            format!("== {} ==\n\n{}", self.title, self.verses.join("\n"))
        } else {
            format!("== {} (No text found/loaded) ==\n\n{NO_TEXT_NOTICE}\n", self.prompt)
        }
    }
}

/// Output of [`compile`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compilation {
    /// Sections in prompt order.
    pub sections: Vec<CompiledSection>,
}

impl Compilation {
    /// Prompts that produced text.
    pub fn successful(&self) -> usize {
        self.sections.iter().filter(|s| s.is_found()).count()
    }

    /// Prompts that produced nothing.
    pub fn failed(&self) -> usize {
        self.sections.len() - self.successful()
    }

    /// All sections joined by the section separator.
    pub fn output(&self) -> String {
        self.sections
            .iter()
            .map(CompiledSection::render)
            .collect::<Vec<_>>()
            .join(SECTION_SEPARATOR)
            .trim()
            .to_string()
    }

    /// One-line status summary.
    pub fn summary(&self) -> String {
        format!(
            "Processed {} prompts. {} successful, {} failed/empty.",
            self.sections.len(),
            self.successful(),
            self.failed()
        )
    }
}

/// Compile every non-empty line of `prompts` against one translation.
///
/// Fails only when the store cannot serve `translation_id`.
pub fn compile(
    prompts: &str,
    store: &dyn VerseStore,
    translation_id: &str,
    extractor: &Extractor,
) -> Result<Compilation> {
    let mut compilation = Compilation::default();

    for prompt in prompts.lines().map(str::trim).filter(|p| !p.is_empty()) {
        let extraction = extractor.extract(prompt);
        let mut titles = Vec::new();
        let mut verses = Vec::new();

        // Bare "<book> <chapter>" prompts expand the chapter.
        if !prompt.contains([':', '.']) {
            for chapter in &extraction.chapters {
                titles.push(format!("{} Chapter {}", chapter.book, chapter.chapter));
                verses.extend(
                    store
                        .chapter(&chapter.book, chapter.chapter, translation_id)?
                        .into_iter()
                        .map(|v| v.text),
                );
            }
        }

        for extracted in &extraction.references {
            titles.push(extracted.reference_string.clone());
            verses.extend(
                store
                    .lookup(&extracted.reference, translation_id)?
                    .into_iter()
                    .map(|v| v.text)
                    .filter(|t| !t.is_empty()),
            );
        }

        if verses.is_empty() {
            tracing::warn!("Prompt \"{prompt}\" yielded no verse text");
        }

        compilation.sections.push(CompiledSection {
            prompt: prompt.to_string(),
            title: if titles.is_empty() {
                prompt.to_string()
            } else {
                titles.join("; ")
            },
            verses,
        });
    }

    tracing::debug!("{}", compilation.summary());
    Ok(compilation)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::bible::store::{InMemoryStore, Translation};
    use crate::error::Error;

    fn store() -> InMemoryStore {
        let mut t = Translation::new("KJV", "King James Version");
        t.insert("Psalms", 23, 1, "The LORD is my shepherd; I shall not want.");
        t.insert("Psalms", 23, 2, "He maketh me to lie down in green pastures.");
        t.insert("John", 3, 16, "For God so loved the world,");
        t.insert("John", 3, 17, "For God sent not his Son");
        let mut store = InMemoryStore::new();
        store.add(t);
        store
    }

    #[test]
    fn test_compile_sections() {
        let prompts = "John 3:16-17\n\nPs 23\nnothing here";
        let c = compile(prompts, &store(), "KJV", &Extractor::standard()).unwrap();

        assert_eq!(c.sections.len(), 3);
        assert_eq!(c.successful(), 2);
        assert_eq!(c.failed(), 1);
        assert_eq!(c.sections[1].title, "Psalms Chapter 23");
        assert_eq!(c.sections[1].verses.len(), 2);

        let out = c.output();
        assert!(out.starts_with(
            "== John 3:16-17 ==\n\nFor God so loved the world,\nFor God sent not his Son"
        ));
        assert!(out.contains("\n\n---\n\n== Psalms Chapter 23 ==\n\n"));
        assert!(out.ends_with(&format!(
            "== nothing here (No text found/loaded) ==\n\n{NO_TEXT_NOTICE}"
        )));
    }

    #[test]
    fn test_multiple_references_in_one_prompt() {
        let c = compile("John 3:16; Ps 23:2", &store(), "KJV", &Extractor::standard()).unwrap();
        assert_eq!(c.sections[0].title, "John 3:16; Psalms 23:2");
        assert_eq!(c.sections[0].verses.len(), 2);
    }

    #[test]
    fn test_missing_verses_fail_prompt() {
        let c = compile("Gen 1:1", &store(), "KJV", &Extractor::standard()).unwrap();
        assert_eq!(c.failed(), 1);
        assert_eq!(c.summary(), "Processed 1 prompts. 0 successful, 1 failed/empty.");
    }

    #[test]
    fn test_unknown_translation() {
        let err = compile("John 3:16", &store(), "NIV", &Extractor::standard());
        assert!(matches!(err, Err(Error::Translation(_))));
    }
}
