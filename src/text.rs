//! Arabic text utilities
//!
//! The listing pages carry company names and sector labels in Arabic. These
//! helpers normalize that text for comparison and storage, and detect
//! Arabic-bearing cells during row extraction.

/// Arabic combining diacritics stripped during normalization
const ARABIC_DIACRITICS: [char; 8] = [
    '\u{064B}', // fathatan
    '\u{064C}', // dammatan
    '\u{064D}', // kasratan
    '\u{064E}', // fatha
    '\u{064F}', // damma
    '\u{0650}', // kasra
    '\u{0651}', // shadda
    '\u{0652}', // sukun
];

/// Normalizes Arabic text for comparison and storage
///
/// Collapses runs of whitespace to a single space and strips the common
/// diacritic marks, so the same name scraped from two layouts compares equal.
pub fn normalize_arabic(text: &str) -> String {
    let collapsed: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .chars()
        .filter(|c| !ARABIC_DIACRITICS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Returns true if the text contains at least one Arabic-block character
pub fn is_arabic(text: &str) -> bool {
    text.chars()
        .any(|c| ('\u{0600}'..='\u{06FF}').contains(&c))
}
