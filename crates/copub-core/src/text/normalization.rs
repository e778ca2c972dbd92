//! Name normalization for author matching

use std::collections::BTreeSet;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Linking particles dropped as whole tokens
const PARTICLES: [&str; 6] = ["de", "da", "do", "dos", "das", "e"];

/// Normalize a name for comparison
///
/// - Converts to lowercase
/// - Removes diacritics
/// - Turns punctuation into separators
/// - Drops linking particles ("de", "da", "do", "dos", "das", "e")
/// - Merges runs of single ASCII letter or digit initials (`"j a"` becomes `"ja"`)
/// - Collapses whitespace
///
/// `None` normalizes to the empty string. The function is idempotent.
pub fn normalize_name(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };

    let folded: String = text
        .to_lowercase()
        // Unicode normalize (NFD to separate combining characters)
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    let mut tokens: Vec<String> = folded.split_whitespace().map(str::to_string).collect();

    // Dropping a particle can make initials adjacent, and merged initials can spell a
    // particle, so iterate to a fixpoint. Each pass that changes anything shrinks the list.
    loop {
        let next = merge_initials(drop_particles(&tokens));
        if next.len() == tokens.len() {
            break;
        }
        tokens = next;
    }

    tokens.join(" ")
}

/// Normalize every name in an author list, dropping names that normalize to nothing
pub fn normalize_author_list<S: AsRef<str>>(authors: &[S]) -> BTreeSet<String> {
    authors
        .iter()
        .map(|a| normalize_name(Some(a.as_ref())))
        .filter(|a| !a.is_empty())
        .collect()
}

fn drop_particles(tokens: &[String]) -> Vec<String> {
    tokens
        .iter()
        .filter(|t| !PARTICLES.contains(&t.as_str()))
        .cloned()
        .collect()
}

fn is_initial(token: &str) -> bool {
    let mut chars = token.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_alphanumeric())
}

fn merge_initials(tokens: Vec<String>) -> Vec<String> {
    let mut result = Vec::with_capacity(tokens.len());
    let mut initials = String::new();

    for token in tokens {
        if is_initial(&token) {
            initials.push_str(&token);
            continue;
        }
        if !initials.is_empty() {
            result.push(std::mem::take(&mut initials));
        }
        result.push(token);
    }
    if !initials.is_empty() {
        result.push(initials);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(s: &str) -> String {
        normalize_name(Some(s))
    }

    #[test]
    fn test_normalize_case_and_whitespace() {
        assert_eq!(norm("  Maria   SOUZA "), "maria souza");
    }

    #[test]
    fn test_normalize_diacritics() {
        assert_eq!(norm("São Paulo"), norm("sao paulo"));
        assert_eq!(norm("Conceição Araújo"), "conceicao araujo");
    }

    #[test]
    fn test_normalize_drops_particles() {
        assert_eq!(norm("Maria da Silva"), "maria silva");
        assert_eq!(norm("João dos Santos e Souza"), "joao santos souza");
        assert_eq!(norm("Ana de Lima"), "ana lima");
    }

    #[test]
    fn test_particles_only_as_whole_tokens() {
        assert_eq!(norm("Dorea Dantas"), "dorea dantas");
        assert_eq!(norm("Edson"), "edson");
    }

    #[test]
    fn test_normalize_merges_initials() {
        assert_eq!(norm("Silva J A"), "silva ja");
        assert_eq!(norm("Silva, J.A."), "silva ja");
        assert_eq!(norm("Silva JA"), "silva ja");
        assert_eq!(norm("Silva J"), "silva j");
    }

    #[test]
    fn test_non_ascii_single_chars_are_not_initials() {
        assert_eq!(norm("\u{fb00} x"), "\u{fb00} x");
        assert_eq!(norm("Hansen \u{f8} K"), "hansen \u{f8} k");
        assert_eq!(norm("Hansen Ø K L"), "hansen \u{f8} kl");
    }

    #[test]
    fn test_normalize_punctuation_splits() {
        assert_eq!(norm("Souza-Lima R"), "souza lima r");
    }

    #[test]
    fn test_normalize_none_and_empty() {
        assert_eq!(normalize_name(None), "");
        assert_eq!(norm(""), "");
        assert_eq!(norm(" . , "), "");
    }

    #[test]
    fn test_normalize_fixpoint_cases() {
        // particle removal exposes adjacent initials
        assert_eq!(norm("a de b"), "ab");
        // merged initials spelling a particle are dropped
        assert_eq!(norm("Lima d a"), "lima");
        for input in ["a de b", "Lima d a", "x e y de z"] {
            let once = norm(input);
            assert_eq!(norm(&once), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_normalize_author_list() {
        let set = normalize_author_list(&["Silva JA", "Silva J A", "", "Lima B"]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("silva ja"));
        assert!(set.contains("lima b"));
    }
}
