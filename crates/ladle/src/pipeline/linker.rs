//! Ingredient linking: extract a candidate phrase from the line, then match
//! it against the master table in confidence-ordered tiers.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::record::{LinkCandidate, LinkMethod, LinkReason};
use crate::reference::normalize::{fold, singularize};
use crate::reference::ReferenceSnapshot;

/// Fuzzy score at or above which a match is accepted unattended.
pub const FUZZY_ACCEPT: f64 = 0.92;
/// Fuzzy score at or above which the row is routed to human review.
pub const FUZZY_REVIEW: f64 = 0.80;
/// Candidates considered in the fuzzy tier.
pub const FUZZY_TOP_K: usize = 5;

/// Ingredient-link block.
#[derive(Debug, Clone)]
pub struct LinkResult {
    pub ingredient_id: Option<String>,
    pub ingredient_canonical_name: Option<String>,
    pub link_confidence: f64,
    pub link_method: LinkMethod,
    pub link_reason: Option<LinkReason>,
    pub link_candidates: Vec<LinkCandidate>,
}

static RE_LEADING_OF: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^of\s+").expect("of regex"));
static RE_TO_TASTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*,?\s*(?:to\s+taste|as\s+needed)\s*$").expect("to-taste regex")
});
static RE_QTY_NOTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:heaping|scant|rounded|generous)\s+").expect("qty-note regex")
});
static RE_PAREN_SIZE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\([^)]*(?:inch|cm)[^)]*\)\s*").expect("paren size regex")
});
static RE_SIZE_DESCRIPTOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b[\d½¼¾⅓⅔⅕⅖⅗⅘⅙⅚⅛⅜⅝⅞/]+\s*-?\s*(?:inch|cm)\b\s*")
        .expect("size descriptor regex")
});
static RE_PIECE_OF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bpiece\s+").expect("piece regex"));
static RE_STRAY_UNIT_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:tablespoons?|teaspoons?|tbsp|tsp|cups?)\b\s*")
        .expect("stray unit regex")
});
static RE_JUICE_OF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^juice\s+of\s+[\d½¼¾⅓⅔⅕⅖⅗⅘⅙⅚⅛⅜⅝⅞\s/]*(.+)$").expect("juice regex")
});
static RE_PREP_TAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\s+peeled\s+and\s+\w+$|\s+cut\s+into\s+\w+$|\s+and\s+(?:minced|diced|chopped|sliced|grated)$",
    )
    .expect("prep tail regex")
});
static RE_AND_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+)\s+and\s+(\w+)").expect("and pair regex"));
static RE_SLASH_HEADS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w\s*/\s*\w").expect("slash heads regex"));
static RE_OR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bor\b").expect("or regex"));

/// Words describing preparation, not identity; legal around `and`.
const PREP_WORDS: &[&str] = &[
    "peeled", "minced", "chopped", "diced", "sliced", "cut", "trimmed", "grated", "shredded",
    "rinsed", "drained", "halved", "quartered", "crushed", "softened", "melted", "beaten",
];

/// Modifier words dropped during candidate normalization; they describe
/// quality or prep, never identity.
static MODIFIER_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "fresh", "organic", "large", "small", "medium", "chopped", "diced", "minced", "sliced",
        "shredded", "grated", "finely", "coarsely", "roughly", "thinly", "thickly", "ripe",
        "unripe", "raw", "cooked", "peeled", "unpeeled", "pitted", "seeded", "trimmed",
        "cleaned", "rinsed", "drained", "thawed", "frozen", "cold", "warm", "thin", "thick",
        "toasted", "pieces",
    ]
    .into_iter()
    .collect()
});

static RE_MODIFIER_PHRASES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:room temperature|cut into pieces|cut into|plus more|as needed|to taste)\b")
        .expect("modifier phrase regex")
});

/// Strip the parsed quantity and unit tokens plus size/prep noise, leaving
/// the candidate ingredient phrase.
pub fn extract_candidate(
    original_text: &str,
    qty_raw: Option<&str>,
    unit_raw: Option<&str>,
) -> String {
    let mut text = original_text.trim().to_string();

    if let Some(qty) = qty_raw.map(str::trim).filter(|q| !q.is_empty()) {
        let matches_prefix = text
            .get(..qty.len())
            .map(|prefix| prefix.eq_ignore_ascii_case(qty))
            .unwrap_or(false);
        if matches_prefix {
            text = text[qty.len()..].trim_start().to_string();
        }
    }

    if let Some(unit) = unit_raw.map(str::trim).filter(|u| !u.is_empty()) {
        text = remove_word_ci(&text, unit);
    }

    let text = RE_LEADING_OF.replace(&text, "");
    let text = RE_TO_TASTE.replace(&text, "");
    let text = RE_QTY_NOTE.replace_all(&text, "");
    let text = RE_PAREN_SIZE.replace_all(&text, "");
    let text = RE_SIZE_DESCRIPTOR.replace_all(&text, "");
    let text = RE_PIECE_OF.replace_all(&text, "");
    let text = RE_STRAY_UNIT_WORDS.replace_all(&text, "");

    let mut text = text.trim().to_string();
    let juiced = RE_JUICE_OF
        .captures(&text)
        .map(|caps| caps[1].trim().to_string());
    if let Some(fruit) = juiced {
        text = format!("{fruit} juice");
    }
    let text = RE_PREP_TAIL.replace_all(&text, "");

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether the candidate phrase names more than one ingredient.
pub fn has_multiple_heads(candidate: &str) -> bool {
    if RE_OR.is_match(candidate) {
        return true;
    }
    if RE_SLASH_HEADS.is_match(candidate) {
        return true;
    }
    for caps in RE_AND_PAIR.captures_iter(candidate) {
        let before = caps[1].to_lowercase();
        let after = caps[2].to_lowercase();
        if !PREP_WORDS.contains(&before.as_str()) && !PREP_WORDS.contains(&after.as_str()) {
            return true;
        }
    }
    // A comma separating two non-prep words also reads as a list of heads.
    if let Some(idx) = candidate.find(',') {
        let after = candidate[idx + 1..].split_whitespace().next();
        if let Some(word) = after {
            if !PREP_WORDS.contains(&word.to_lowercase().as_str())
                && !MODIFIER_WORDS.contains(word.to_lowercase().as_str())
            {
                return true;
            }
        }
    }
    false
}

/// Normalize the candidate for index lookup: fold, drop modifier words,
/// singularize.
pub fn normalize_candidate(candidate: &str) -> String {
    let text = RE_MODIFIER_PHRASES.replace_all(candidate, " ");
    let folded = fold(&text);
    let mut words: Vec<String> = folded
        .split_whitespace()
        .filter(|w| !MODIFIER_WORDS.contains(w))
        .map(singularize)
        .collect();
    // Drop a dangling "and" left behind by modifier removal.
    while words.last().map(|w| w == "and").unwrap_or(false) {
        words.pop();
    }
    words.join(" ")
}

/// Run the tiered match for one row.
pub fn link(
    snapshot: &ReferenceSnapshot,
    original_text: &str,
    qty_raw: Option<&str>,
    unit_raw: Option<&str>,
) -> LinkResult {
    let candidate = extract_candidate(original_text, qty_raw, unit_raw);
    let mut normalized = normalize_candidate(&candidate);

    // "2 eggs" parses its only noun as the unit; a count unit names the
    // thing being counted, so it doubles as the candidate.
    if normalized.is_empty() {
        if let Some(unit) = unit_raw {
            let norm = super::unit::normalize_unit(Some(unit), true);
            if norm.original_dimension == Some(crate::record::Dimension::Count) {
                normalized = normalize_candidate(unit);
            }
        }
    }

    if normalized.is_empty() {
        return unresolved(LinkReason::NoMatch);
    }

    // L0/L1: whole-phrase hits are unambiguous even for compound names.
    if let Some(ing) = snapshot.by_primary(&normalized) {
        return hit(ing, 1.0, LinkMethod::Exact);
    }
    if let Some(ing) = snapshot.by_alias(&normalized) {
        return hit(ing, 0.99, LinkMethod::Alias);
    }

    // Token-set tiers collapse word order and stopwords, so a multi-head
    // phrase must be flagged before it can masquerade as one ingredient.
    if has_multiple_heads(&candidate) {
        return unresolved(LinkReason::MultiIngredientLine);
    }

    if let Some(ing) = snapshot.by_keep_tokens(&normalized) {
        return hit(ing, 0.97, LinkMethod::Normalized);
    }

    let tokens = snapshot.meaning().token_set(&normalized);
    let top = snapshot.fuzzy_topk(&tokens, FUZZY_TOP_K);
    if let Some(&(best, score)) = top.first() {
        if score >= FUZZY_ACCEPT {
            return hit(best, score, LinkMethod::Fuzzy);
        }
        if score >= FUZZY_REVIEW {
            return LinkResult {
                ingredient_id: None,
                ingredient_canonical_name: None,
                link_confidence: score,
                link_method: LinkMethod::Review,
                link_reason: Some(LinkReason::LowConfidence),
                link_candidates: top
                    .iter()
                    .take(3)
                    .map(|(ing, s)| LinkCandidate {
                        ingredient_id: ing.ingredient_id.clone(),
                        primary_name: ing.primary_name.clone(),
                        score: *s,
                    })
                    .collect(),
            };
        }
    }

    unresolved(LinkReason::NoMatch)
}

fn hit(
    ingredient: &crate::reference::Ingredient,
    confidence: f64,
    method: LinkMethod,
) -> LinkResult {
    LinkResult {
        ingredient_id: Some(ingredient.ingredient_id.clone()),
        ingredient_canonical_name: Some(ingredient.primary_name.clone()),
        link_confidence: confidence,
        link_method: method,
        link_reason: None,
        link_candidates: Vec::new(),
    }
}

fn unresolved(reason: LinkReason) -> LinkResult {
    LinkResult {
        ingredient_id: None,
        ingredient_canonical_name: None,
        link_confidence: 0.0,
        link_method: LinkMethod::Unresolved,
        link_reason: Some(reason),
        link_candidates: Vec::new(),
    }
}

/// Remove the first standalone occurrence of `word` (case-insensitive),
/// including multi-word unit tokens like `fl oz`.
fn remove_word_ci(text: &str, word: &str) -> String {
    let lower_text = text.to_lowercase();
    let lower_word = word.to_lowercase();
    // Lowercasing can shift byte offsets for exotic scripts; bail out rather
    // than slice on mismatched indices.
    if lower_word.is_empty() || lower_text.len() != text.len() {
        return text.to_string();
    }
    let mut start = 0;
    while let Some(pos) = lower_text[start..].find(&lower_word) {
        let abs = start + pos;
        let end = abs + lower_word.len();
        let before_ok = abs == 0
            || !lower_text[..abs]
                .chars()
                .next_back()
                .map(char::is_alphanumeric)
                .unwrap_or(false);
        let after_ok = end == lower_text.len()
            || !lower_text[end..]
                .chars()
                .next()
                .map(char::is_alphanumeric)
                .unwrap_or(false);
        if before_ok && after_ok {
            let (Some(head), Some(tail)) = (text.get(..abs), text.get(end..)) else {
                return text.to_string();
            };
            let mut out = String::with_capacity(text.len());
            out.push_str(head.trim_end());
            out.push(' ');
            out.push_str(tail.trim_start());
            return out.trim().to_string();
        }
        start = end;
    }
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{Ingredient, MeaningTokens};

    fn ingredient(id: &str, name: &str, aliases: &[&str]) -> Ingredient {
        Ingredient {
            ingredient_id: id.to_string(),
            primary_name: name.to_string(),
            aliases: aliases.iter().map(|s| s.to_string()).collect(),
            category: None,
            default_form_id: None,
            form_overrides: Vec::new(),
        }
    }

    fn snapshot() -> ReferenceSnapshot {
        let meaning = MeaningTokens::new(
            [
                "chia", "seed", "flour", "purpose", "onion", "red", "mint", "leaf", "coconut",
                "flake", "banana", "goji", "berry", "cinnamon", "beef", "maca", "root", "powder",
                "ginger", "all",
            ]
            .map(String::from),
        );
        ReferenceSnapshot::from_parts(
            vec![
                ingredient("INGR_01091", "chia seeds", &["chia"]),
                ingredient("INGR_00037", "all-purpose flour", &["flour", "plain flour"]),
                ingredient("INGR_00204", "red onion", &["red onions"]),
                ingredient("INGR_00301", "mint", &["mint leaves", "fresh mint"]),
                ingredient("INGR_00562", "ground beef", &["minced beef"]),
                ingredient("INGR_00871", "cinnamon", &["ground cinnamon"]),
                ingredient("INGR_00990", "banana", &[]),
                ingredient("INGR_01200", "goji berries", &["goji"]),
            ],
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            meaning,
        )
    }

    #[test]
    fn extract_strips_qty_and_unit() {
        assert_eq!(
            extract_candidate("1/2 cup chia seeds", Some("1/2"), Some("cup")),
            "chia seeds"
        );
        assert_eq!(
            extract_candidate("1 tbsp dried goji berries", Some("1"), Some("tbsp")),
            "dried goji berries"
        );
    }

    #[test]
    fn extract_handles_of_and_prep_tails() {
        assert_eq!(
            extract_candidate("2 cups of flour", Some("2"), Some("cups")),
            "flour"
        );
        assert_eq!(
            extract_candidate("ginger peeled and minced", None, None),
            "ginger"
        );
        assert_eq!(
            extract_candidate("1 ripe banana cut into pieces", Some("1"), None),
            "ripe banana"
        );
    }

    #[test]
    fn extract_rewrites_juice_of() {
        assert_eq!(
            extract_candidate("juice of ½ lemon", None, None),
            "lemon juice"
        );
    }

    #[test]
    fn extract_drops_size_descriptors() {
        assert_eq!(
            extract_candidate("1 (2-inch) piece ginger", Some("1"), None),
            "ginger"
        );
    }

    #[test]
    fn exact_match_on_primary() {
        let snap = snapshot();
        let result = link(&snap, "1/2 cup chia seeds", Some("1/2"), Some("cup"));
        assert_eq!(result.link_method, LinkMethod::Exact);
        assert_eq!(result.ingredient_id.as_deref(), Some("INGR_01091"));
        assert_eq!(result.link_confidence, 1.0);
    }

    #[test]
    fn alias_match() {
        let snap = snapshot();
        let result = link(&snap, "200 g flour", Some("200"), Some("g"));
        assert_eq!(result.link_method, LinkMethod::Alias);
        assert_eq!(result.ingredient_id.as_deref(), Some("INGR_00037"));
        assert_eq!(result.link_confidence, 0.99);
    }

    #[test]
    fn normalized_match_survives_modifier_noise() {
        let snap = snapshot();
        // "minced red onions" -> modifiers dropped -> "red onion" via alias;
        // a reordered phrase still lands through the keep-tokens index.
        let result = link(&snap, "4 cups minced red onions", Some("4"), Some("cups"));
        assert!(matches!(
            result.link_method,
            LinkMethod::Exact | LinkMethod::Alias | LinkMethod::Normalized
        ));
        assert_eq!(result.ingredient_id.as_deref(), Some("INGR_00204"));
    }

    #[test]
    fn multi_ingredient_or_is_unresolved() {
        let snap = snapshot();
        let result = link(&snap, "coconut or coconut flakes", None, None);
        assert_eq!(result.link_method, LinkMethod::Unresolved);
        assert_eq!(result.link_reason, Some(LinkReason::MultiIngredientLine));
        assert!(result.ingredient_id.is_none());
    }

    #[test]
    fn salt_and_pepper_is_multi() {
        assert!(has_multiple_heads("salt and pepper"));
        assert!(!has_multiple_heads("ginger peeled and minced"));
        assert!(has_multiple_heads("parsley/cilantro"));
    }

    #[test]
    fn unknown_ingredient_is_no_match() {
        let snap = snapshot();
        let result = link(&snap, "1 cup maca root powder", Some("1"), Some("cup"));
        assert_eq!(result.link_method, LinkMethod::Unresolved);
        assert_eq!(result.link_reason, Some(LinkReason::NoMatch));
    }

    #[test]
    fn ground_beef_matches_exactly() {
        let snap = snapshot();
        let result = link(&snap, "½ lb ground beef", Some("½"), Some("lb"));
        assert_eq!(result.ingredient_id.as_deref(), Some("INGR_00562"));
    }

    #[test]
    fn linking_is_deterministic() {
        let snap = snapshot();
        let a = link(&snap, "1 tbsp goji berries", Some("1"), Some("tbsp"));
        let b = link(&snap, "1 tbsp goji berries", Some("1"), Some("tbsp"));
        assert_eq!(a.ingredient_id, b.ingredient_id);
        assert_eq!(a.link_confidence, b.link_confidence);
    }
}
