//! Application constants.
//!
//! Centralizes separators, notices and limits shared by the services and the CLI.

/// Reference extraction constants.
pub mod extract {
    /// Number of book suggestions offered for an unresolved book token.
    pub const MAX_BOOK_SUGGESTIONS: usize = 3;
}

/// Bulk compilation constants.
pub mod compile {
    /// Separator placed between compiled prompt sections.
    pub const SECTION_SEPARATOR: &str = "\n\n---\n\n";

    /// Body written under a prompt that produced no verse text.
    pub const NO_TEXT_NOTICE: &str =
        "(Could not retrieve text for this prompt. Check reference or translation.)";
}

/// Collection text export constants.
pub mod export {
    /// Default separator between a reference and its text.
    pub const DEFAULT_REF_TEXT_SEPARATOR: &str = " - ";

    /// Default separator between exported entries.
    pub const DEFAULT_ENTRY_SEPARATOR: &str = "\n\n";

    /// Three em dashes, substituted for `---` in entry separators.
    pub const EM_DASH_RULE: &str = "\u{2014}\u{2014}\u{2014}";
}

/// File handling constants.
pub mod files {
    /// Extensions recognized as translation files.
    pub const TRANSLATION_EXTENSIONS: &[&str] = &["xml", "json"];

    /// Extension of collection text files.
    pub const COLLECTION_EXTENSION: &str = "txt";

    /// Directory under the platform data dir where translations live.
    pub const DEFAULT_BIBLE_DIR: &str = "verseflow/bibles";
}
