//! Shared text helpers for CellarVault.

use std::collections::HashSet;
use std::hash::Hash;

/// Lower-case and trim a free-text value for comparisons.
pub fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Split free text into lower-cased words strictly longer than `min_len` characters.
///
/// Word boundaries are any non-alphanumeric character, so accented letters stay
/// inside their word ("ragù", "rosé").
pub fn significant_words(text: &str, min_len: usize) -> Vec<String> {
    text.to_lowercase()
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|word| word.chars().count() > min_len)
        .map(str::to_string)
        .collect()
}

/// Return true when the (already normalized) haystack contains any of the phrases.
pub fn contains_any(haystack: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| haystack.contains(phrase))
}

/// Keep the first occurrence of every value, preserving order.
pub fn unique_in_order<T, I>(values: I) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

/// Build an ASCII slug suitable for file names.
pub fn slugify(input: &str) -> String {
    let mut slug = String::new();
    let mut last_dash = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    slug.trim_matches('-').to_string()
}
