//! Text normalization shared by index construction and candidate matching.
//!
//! Both sides of every lookup must pass through the same folding, or exact
//! tiers silently degrade into fuzzy ones.

/// Lowercase, fold punctuation to spaces, collapse whitespace.
pub fn fold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_space = true;
    for ch in text.chars() {
        let mapped = if ch.is_alphanumeric() { Some(ch.to_ascii_lowercase()) } else { None };
        match mapped {
            Some(c) => {
                out.push(c);
                last_space = false;
            }
            None => {
                if !last_space {
                    out.push(' ');
                    last_space = true;
                }
            }
        }
    }
    out.trim_end().to_string()
}

/// Singularize one word with the closed rule set used across all indices.
pub fn singularize(word: &str) -> String {
    let w = word;
    if w == "leaves" {
        return "leaf".to_string();
    }
    if w.ends_with("ves") && w.len() > 3 {
        // knives -> knife is not recoverable; halve-class words fold to -f
        return format!("{}f", &w[..w.len() - 3]);
    }
    if w.ends_with("ies") && w.len() > 4 {
        return format!("{}y", &w[..w.len() - 3]);
    }
    if w.ends_with("sses") || w.ends_with("shes") || w.ends_with("ches") {
        return w[..w.len() - 2].to_string();
    }
    if w.ends_with("oes") {
        return w[..w.len() - 2].to_string();
    }
    if w.ends_with("es") && w.len() > 3 {
        let stem = &w[..w.len() - 2];
        if stem.ends_with('s') || stem.ends_with('x') || stem.ends_with('z') {
            return stem.to_string();
        }
        return w[..w.len() - 1].to_string();
    }
    if w.ends_with('s') && !w.ends_with("ss") && w.len() > 2 {
        return w[..w.len() - 1].to_string();
    }
    w.to_string()
}

/// Fold plus per-word singularization: the key used by the exact-name and
/// alias indices.
pub fn normalize_name(text: &str) -> String {
    fold(text)
        .split_whitespace()
        .map(singularize)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_drops_punctuation_and_case() {
        assert_eq!(fold("All-Purpose Flour"), "all purpose flour");
        assert_eq!(fold("  salt,  fine "), "salt fine");
    }

    #[test]
    fn singularize_common_shapes() {
        assert_eq!(singularize("tomatoes"), "tomato");
        assert_eq!(singularize("berries"), "berry");
        assert_eq!(singularize("leaves"), "leaf");
        assert_eq!(singularize("radishes"), "radish");
        assert_eq!(singularize("glasses"), "glass");
        assert_eq!(singularize("seeds"), "seed");
        assert_eq!(singularize("molasses"), "molasses");
        assert_eq!(singularize("egg"), "egg");
    }

    #[test]
    fn normalize_name_composes() {
        assert_eq!(normalize_name("Chia Seeds"), "chia seed");
        assert_eq!(normalize_name("goji berries"), "goji berry");
    }
}
