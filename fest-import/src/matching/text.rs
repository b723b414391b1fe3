//! Name normalization and edit-distance similarity used by both the
//! duplicate detector and the importer's musician identity-merge.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use strsim::normalized_levenshtein;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));

// Keeps `&` so the "& <word>" band suffix survives punctuation stripping.
static NAME_PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s&]").expect("valid regex"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

static BAND_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\sband|\s*&\s*\w+)\s*$").expect("valid regex"));

/// Tokens too generic to narrow a candidate query in this domain.
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "and", "for", "with", "festival", "fest", "swing", "blues", "jazz", "dance",
    ]
    .into_iter()
    .collect()
});

/// Edit-distance similarity in [0, 1]. Symmetric and reflexive; two inputs
/// that both normalize to empty compare as 1.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    normalized_levenshtein(&a, &b)
}

/// Significant tokens of a name, used to build `LIKE` candidate queries.
/// Never used for scoring.
pub fn keywords(s: &str) -> Vec<String> {
    let lowered = s.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, " ");

    let mut seen = HashSet::new();
    stripped
        .split_whitespace()
        .filter(|t| t.chars().count() > 2 && !STOP_WORDS.contains(t))
        .filter(|t| seen.insert(t.to_string()))
        .map(|t| t.to_string())
        .collect()
}

/// Lowercase, strip punctuation (keeping `&`), collapse whitespace.
pub fn normalize_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let stripped = NAME_PUNCTUATION.replace_all(&lowered, " ");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

fn strip_band_suffix(name: &str) -> String {
    BAND_SUFFIX.replace(name, "").trim().to_string()
}

/// Whether two musician names refer to the same performer: normalized
/// equality, then containment, then equality/containment after stripping a
/// trailing band suffix (`"band"` or `"& <word>"`) from both sides.
pub fn is_same_musician(a: &str, b: &str) -> bool {
    let na = normalize_name(a);
    let nb = normalize_name(b);

    if na.is_empty() || nb.is_empty() {
        return false;
    }
    if na == nb {
        return true;
    }
    if na.contains(&nb) || nb.contains(&na) {
        let sa = strip_band_suffix(&na);
        let sb = strip_band_suffix(&nb);
        if sa.is_empty() || sb.is_empty() {
            return false;
        }
        return sa == sb || sa.contains(&sb) || sb.contains(&sa);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn similarity_is_reflexive_and_symmetric() {
        assert_eq!(similarity("Herrang Dance Camp", "Herrang Dance Camp"), 1.0);
        let ab = similarity("Smokey Feet", "Smoky Feet");
        let ba = similarity("Smoky Feet", "Smokey Feet");
        assert_eq!(ab, ba);
        assert!(ab > 0.8 && ab < 1.0);
    }

    #[test]
    fn similarity_ignores_case_and_surrounding_whitespace() {
        assert_eq!(similarity("Jazz Festival", "jazz festival"), 1.0);
        assert_eq!(similarity("  Lindy Shock  ", "lindy shock"), 1.0);
    }

    #[test]
    fn similarity_of_two_empty_strings_is_one() {
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("   ", ""), 1.0);
    }

    #[test]
    fn keywords_drop_stop_words_and_short_tokens() {
        let kws = keywords("The Snowball - Swing & Blues Festival 2024");
        assert_eq!(kws, vec!["snowball", "2024"]);
    }

    #[test]
    fn keywords_deduplicate() {
        assert_eq!(keywords("Balboa Balboa Weekend"), vec!["balboa", "weekend"]);
    }

    #[test]
    fn normalize_name_strips_punctuation_but_keeps_ampersand() {
        assert_eq!(normalize_name("Mayka  Edjo!"), "mayka edjo");
        assert_eq!(
            normalize_name("Gordon Webster & Friends"),
            "gordon webster & friends"
        );
    }

    #[test]
    fn same_musician_on_exact_and_containment() {
        assert!(is_same_musician("Mayka Edjo", "mayka edjo"));
        assert!(is_same_musician("Mayka Edjo Band", "Mayka Edjo"));
        assert!(is_same_musician("Mayka Edjo", "Mayka Edjo Band"));
    }

    #[test]
    fn same_musician_strips_ampersand_suffix() {
        assert!(is_same_musician(
            "Gordon Webster & Friends",
            "Gordon Webster"
        ));
    }

    #[test]
    fn different_musicians_do_not_match() {
        assert!(!is_same_musician("Mayka Edjo", "Gordon Webster"));
        assert!(!is_same_musician("", "Gordon Webster"));
    }
}
