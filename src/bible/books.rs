//! Canonical book names and their standard numbering.

/// The 66 canonical book names, in canonical order (Genesis = 1).
pub const CANONICAL_BOOKS: [&str; 66] = [
    "Genesis", "Exodus", "Leviticus", "Numbers", "Deuteronomy", "Joshua", "Judges", "Ruth",
    "1 Samuel", "2 Samuel", "1 Kings", "2 Kings", "1 Chronicles", "2 Chronicles", "Ezra",
    "Nehemiah", "Esther", "Job", "Psalms", "Proverbs", "Ecclesiastes", "Song of Solomon",
    "Isaiah", "Jeremiah", "Lamentations", "Ezekiel", "Daniel", "Hosea", "Joel", "Amos",
    "Obadiah", "Jonah", "Micah", "Nahum", "Habakkuk", "Zephaniah", "Haggai", "Zechariah",
    "Malachi",
    "Matthew", "Mark", "Luke", "John", "Acts", "Romans", "1 Corinthians", "2 Corinthians",
    "Galatians", "Ephesians", "Philippians", "Colossians", "1 Thessalonians",
    "2 Thessalonians", "1 Timothy", "2 Timothy", "Titus", "Philemon", "Hebrews", "James",
    "1 Peter", "2 Peter", "1 John", "2 John", "3 John", "Jude", "Revelation",
];

/// Book name for a standard 1-based book number.
pub fn book_by_number(number: u32) -> Option<&'static str> {
    let idx = usize::try_from(number).ok()?.checked_sub(1)?;
    CANONICAL_BOOKS.get(idx).copied()
}

/// Book name for a number, or `"Book {n}"` when it is outside 1-66.
pub fn display_book_by_number(number: u32) -> String {
    book_by_number(number).map_or_else(
        || {
            tracing::warn!("Book number {number} not found in standard list");
            format!("Book {number}")
        },
        str::to_string,
    )
}

/// Standard 1-based number of a canonical book name (case-insensitive).
pub fn book_number(name: &str) -> Option<u32> {
    CANONICAL_BOOKS
        .iter()
        .position(|b| b.eq_ignore_ascii_case(name.trim()))
        .and_then(|idx| u32::try_from(idx + 1).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbering_bounds() {
        assert_eq!(book_by_number(1), Some("Genesis"));
        assert_eq!(book_by_number(40), Some("Matthew"));
        assert_eq!(book_by_number(66), Some("Revelation"));
        assert_eq!(book_by_number(0), None);
        assert_eq!(book_by_number(67), None);
    }

    #[test]
    fn test_display_fallback() {
        assert_eq!(display_book_by_number(19), "Psalms");
        assert_eq!(display_book_by_number(99), "Book 99");
    }

    #[test]
    fn test_book_number_inverse() {
        for n in 1..=66 {
            let name = book_by_number(n).unwrap_or_default();
            assert_eq!(book_number(name), Some(n));
        }
        assert_eq!(book_number("song of solomon"), Some(22));
        assert_eq!(book_number("Gen"), None);
    }
}
