//! Variant-based author matching

use std::collections::BTreeSet;

/// Variants at or below this many characters only match by equality
pub const MIN_CONTAINMENT_LEN: usize = 5;

/// Check whether any of a professor's name variants corresponds to an article author.
///
/// Both sets must already be normalized with [`crate::text::normalize_name`]. A pair
/// matches on equality, or, when the variant is longer than [`MIN_CONTAINMENT_LEN`]
/// characters, when either string contains the other. One matching pair is enough.
pub fn variants_match(variants: &BTreeSet<String>, authors: &BTreeSet<String>) -> bool {
    variants
        .iter()
        .any(|v| authors.iter().any(|a| pair_matches(v, a)))
}

fn pair_matches(variant: &str, author: &str) -> bool {
    if variant.is_empty() || author.is_empty() {
        return false;
    }
    if variant == author {
        return true;
    }
    variant.chars().count() > MIN_CONTAINMENT_LEN
        && (author.contains(variant) || variant.contains(author))
}
