// src/matching.rs
//! Language-aware case folding and word-boundary keyword search.
//!
//! Both sides of a comparison (keyword and text) must be folded with the same
//! language before calling [`contains_word`].

/// Languages whose dotted/dotless I pairs differ from the Unicode default mapping.
fn uses_turkic_casing(language: &str) -> bool {
    let l = language.trim();
    l.eq_ignore_ascii_case("tr") || l.eq_ignore_ascii_case("az")
}

/// Lowercase `text` using rules appropriate for `language`.
///
/// Turkish/Azerbaijani map `İ → i` and `I → ı` before the generic Unicode lowering,
/// which would otherwise turn `İ` into `i̇` (i + U+0307) and `I` into `i`.
pub fn fold_case(text: &str, language: &str) -> String {
    if !uses_turkic_casing(language) {
        return text.to_lowercase();
    }
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            'İ' => out.push('i'),
            'I' => out.push('ı'),
            _ => out.extend(c.to_lowercase()),
        }
    }
    out
}

/// Fold case and collapse whitespace runs to single spaces, so multi-word keywords
/// survive line breaks and double spaces in the source text.
pub fn normalize_for_match(text: &str, language: &str) -> String {
    let folded = fold_case(text, language);
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[inline]
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

/// True if `needle` occurs in `haystack` with no alphanumeric character directly
/// before or after it. Operates on chars, so multi-byte letters are never split.
pub fn contains_word(haystack: &str, needle: &str) -> bool {
    find_word(haystack, needle).is_some()
}

/// Byte offset of the first boundary-respecting occurrence of `needle`.
pub fn find_word(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    let mut from = 0;
    while from <= haystack.len() {
        let pos = haystack[from..].find(needle)?;
        let start = from + pos;
        let end = start + needle.len();

        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !is_word_char(c));
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !is_word_char(c));
        if before_ok && after_ok {
            return Some(start);
        }

        // Advance by one char so overlapping candidates are still considered.
        let step = haystack[start..].chars().next().map_or(1, char::len_utf8);
        from = start + step;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turkish_fold_handles_dotted_and_dotless_i() {
        assert_eq!(fold_case("İSTANBUL", "TR"), "istanbul");
        assert_eq!(fold_case("ISPARTA", "tr"), "ısparta");
        assert_eq!(fold_case("ŞEHİT", "TR"), "şehit");
        // Generic lowering leaves a combining dot behind for İ.
        assert_eq!(fold_case("İ", "EN"), "i\u{307}");
        assert_eq!(fold_case("World ORDER", "EN"), "world order");
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(
            normalize_for_match("  The NEW\n world\t\torder ", "EN"),
            "the new world order"
        );
    }

    #[test]
    fn boundary_rejects_letters_and_digits() {
        assert!(contains_word("war is coming", "war"));
        assert!(!contains_word("a warm day", "war"));
        assert!(!contains_word("prewar era", "war"));
        assert!(!contains_word("war2 started", "war"));
        assert!(!contains_word("2war started", "war"));
        assert!(contains_word("(war)", "war"));
        assert!(contains_word("war", "war"));
    }

    #[test]
    fn boundary_is_unicode_aware() {
        // "ş" is a letter: "kardeş" must not match inside "kardeşlerimiz".
        assert!(!contains_word("kardeşlerimiz geldi", "kardeş"));
        assert!(contains_word("şehit olan kardeşlerimiz", "şehit"));
        // Non-ASCII letter right after the needle.
        assert!(!contains_word("savaşı", "savaş"));
        assert!(contains_word("savaş, barış", "savaş"));
    }

    #[test]
    fn overlapping_candidates_are_rescanned() {
        // First candidate at 1 is glued to "b"; the one at 3 is clean.
        assert_eq!(find_word("ba a a", "a a"), Some(3));
    }

    #[test]
    fn empty_needle_never_matches() {
        assert!(!contains_word("anything", ""));
        assert!(!contains_word("", "x"));
    }
}
