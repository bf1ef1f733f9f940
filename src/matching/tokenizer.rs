use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

lazy_static! {
    // Latin letters, digits and the accented letters common in catalog titles.
    // Matching runs after lower-casing, so the capitals never match. `ç` is not
    // in the set and splits words; existing similarity scores depend on this.
    static ref WORD: Regex =
        Regex::new("[A-Za-z0-9ÇéâêîôûàèùäëïöüÄß]+").expect("word pattern is valid");
}

/// Lower-case `text` and collect its words as a set.
///
/// Punctuation and whitespace separate words; repeated words collapse.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    let lowered = text.to_lowercase();
    WORD.find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}
