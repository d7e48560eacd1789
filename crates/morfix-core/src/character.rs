// Character classification and simple case mapping

// ---------------------------------------------------------------------------
// Simple case conversion
//
// Words are handled as `char` sequences. Case mapping is one-to-one: for the
// few characters whose Unicode mapping expands to several characters only the
// first one is kept, so lowering never changes a word's length and split
// positions computed on the lowercase form stay valid on the original.
// ---------------------------------------------------------------------------

/// Convert a character to its simple lowercase equivalent.
pub fn simple_lower(c: char) -> char {
    let mut iter = c.to_lowercase();
    iter.next().unwrap_or(c)
}

/// Convert a character to its simple uppercase equivalent.
pub fn simple_upper(c: char) -> char {
    let mut iter = c.to_uppercase();
    iter.next().unwrap_or(c)
}

/// Check whether a character is an uppercase letter.
pub fn is_upper(c: char) -> bool {
    c != simple_lower(c)
}

/// Check whether a character is a lowercase letter.
pub fn is_lower(c: char) -> bool {
    c != simple_upper(c)
}

/// Lowercase every character of `word`, keeping its length.
pub fn lower_chars(word: &[char]) -> Vec<char> {
    word.iter().map(|&c| simple_lower(c)).collect()
}

/// Uppercase every character of `word`, keeping its length.
pub fn upper_chars(word: &[char]) -> Vec<char> {
    word.iter().map(|&c| simple_upper(c)).collect()
}

/// Lowercase a string with the one-to-one mapping of [`simple_lower`].
pub fn lower_str(word: &str) -> String {
    word.chars().map(simple_lower).collect()
}

/// Compare two character slices for equality, ignoring character case.
pub fn equals_ignore_case(a: &[char], b: &[char]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .all(|(&ca, &cb)| simple_lower(ca) == simple_lower(cb))
}

// ---------------------------------------------------------------------------
// Dashes
// ---------------------------------------------------------------------------

/// Check whether a character belongs to the Unicode dash punctuation class (Pd).
///
/// A dash inside a word is treated as a forced boundary: the affix stage may
/// peel an affix off across it, and compound decomposition always splits there.
pub fn is_dash(c: char) -> bool {
    matches!(
        c,
        '-' | '\u{058A}'
            | '\u{05BE}'
            | '\u{1400}'
            | '\u{1806}'
            | '\u{2010}'
            | '\u{2011}'
            | '\u{2012}'
            | '\u{2013}' // EN DASH
            | '\u{2014}' // EM DASH
            | '\u{2015}'
            | '\u{2E17}'
            | '\u{2E1A}'
            | '\u{2E3A}'
            | '\u{2E3B}'
            | '\u{2E40}'
            | '\u{301C}'
            | '\u{3030}'
            | '\u{30A0}'
            | '\u{FE31}'
            | '\u{FE32}'
            | '\u{FE58}'
            | '\u{FE63}'
            | '\u{FF0D}'
    )
}
