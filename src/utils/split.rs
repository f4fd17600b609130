//! Delimiter-based string splitting.
//!
//! [`split_delimited`] cuts an input into the literal segments between
//! delimiter matches ("parts") and the matched delimiter spans themselves
//! ("separators"). The variable parser drives it twice: once with a
//! start/end pattern pair to locate declaration spans, and once with a bare
//! start pattern to cut a parameter list on commas.

/// Parts and separators produced by [`split_delimited`].
///
/// `parts.len() == separators.len() + 1` always holds, and interleaving the
/// two sequences (part, separator, part, ..., part) reconstructs the input
/// exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitText<'a> {
    pub parts: Vec<&'a str>,
    pub separators: Vec<&'a str>,
}

/// Split `input` on non-overlapping delimiter matches, earliest-start-first.
///
/// A delimiter is an occurrence of `pattern_start`, extended — when
/// `pattern_end` is given — to the next occurrence of `pattern_end` strictly
/// after the start match (inclusive of the end pattern itself). The search
/// for the end pattern does not nest: an embedded start pattern inside the
/// span is swallowed. If no end pattern occurrence follows a start match,
/// splitting stops and the remaining text becomes the final part.
#[must_use]
pub fn split_delimited<'a>(
    input: &'a str,
    pattern_start: &str,
    pattern_end: Option<&str>,
) -> SplitText<'a> {
    let mut parts = Vec::new();
    let mut separators = Vec::new();

    let mut current = 0;
    while let Some(found) = input[current..].find(pattern_start) {
        let index_start = current + found;
        let after_start = index_start + pattern_start.len();
        let index_end = match pattern_end {
            Some(end) => match input[after_start..].find(end) {
                Some(found_end) => after_start + found_end + end.len(),
                // unterminated delimiter, the rest stays literal text
                None => break,
            },
            None => after_start,
        };
        parts.push(&input[current..index_start]);
        separators.push(&input[index_start..index_end]);
        current = index_end;
    }
    parts.push(&input[current..]);

    SplitText { parts, separators }
}
