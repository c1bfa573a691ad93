//! Quantity parsing: human-written quantity strings to numeric min/max.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::record::{QtyPrecision, QtyWarning};

/// Parsed quantity block.
#[derive(Debug, Clone, Default)]
pub struct QuantityParse {
    pub qty_min: Option<f64>,
    pub qty_max: Option<f64>,
    pub qty_is_range: bool,
    pub qty_approx_flag: bool,
    pub qty_precision_code: Option<QtyPrecision>,
    pub qty_parse_warnings: Vec<QtyWarning>,
}

/// Unicode vulgar fractions and their ASCII expansions.
const UNICODE_FRACTIONS: &[(char, &str)] = &[
    ('¼', "1/4"),
    ('½', "1/2"),
    ('¾', "3/4"),
    ('⅐', "1/7"),
    ('⅑', "1/9"),
    ('⅒', "1/10"),
    ('⅓', "1/3"),
    ('⅔', "2/3"),
    ('⅕', "1/5"),
    ('⅖', "2/5"),
    ('⅗', "3/5"),
    ('⅘', "4/5"),
    ('⅙', "1/6"),
    ('⅚', "5/6"),
    ('⅛', "1/8"),
    ('⅜', "3/8"),
    ('⅝', "5/8"),
    ('⅞', "7/8"),
];

/// Quantity words that are really special units; they parse to null without
/// a warning and are picked up by the unit normalizer instead.
const SPECIAL_QUANTITY_WORDS: &[&str] = &["pinch", "dash", "handful", "splash", "drizzle"];

static APPROX_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:approximately|approx\.?|about|around|circa|c\.)\s*")
        .expect("approx regex")
});
// Leading boundary keeps fraction ranges like "1/2-3/4" out of the rewrite.
static MIXED_HYPHEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[^\d/])(\d+)-(\d+/\d+)").expect("mixed hyphen regex"));
static RANGE_SEP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*(?:--|–|—|\bto\b|-)\s*").expect("range sep regex"));
static MIXED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+) (\d+)/(\d+)$").expect("mixed regex"));
static FRACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)/(\d+)$").expect("fraction regex"));
static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("integer regex"));
static DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d+\.\d+|\.\d+)$").expect("decimal regex"));

fn text_number(word: &str) -> Option<f64> {
    Some(match word {
        "a" | "an" | "one" => 1.0,
        "two" => 2.0,
        "three" => 3.0,
        "four" => 4.0,
        "five" => 5.0,
        "six" => 6.0,
        "seven" => 7.0,
        "eight" => 8.0,
        "nine" => 9.0,
        "ten" => 10.0,
        "half" => 0.5,
        "quarter" => 0.25,
        "third" => 1.0 / 3.0,
        _ => return None,
    })
}

/// Parse a quantity string. Empty input is valid and yields all-null fields.
pub fn parse_quantity(input: Option<&str>) -> QuantityParse {
    let mut result = QuantityParse::default();

    let raw = match input.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return result,
    };

    // Approximation markers are stripped before numeric parsing.
    let mut s = raw.to_string();
    if APPROX_WORDS.is_match(&s) {
        result.qty_approx_flag = true;
        s = APPROX_WORDS.replace_all(&s, "").into_owned();
    }
    if s.contains('~') || s.contains('≈') {
        result.qty_approx_flag = true;
        s = s.replace(['~', '≈'], "");
    }
    if s.trim_end().ends_with('+') {
        result.qty_approx_flag = true;
        let len = s.trim_end().len() - 1;
        s.truncate(len);
    }
    let s = s.trim().to_string();

    let lower = s.to_lowercase();
    if SPECIAL_QUANTITY_WORDS.contains(&lower.as_str()) {
        return result;
    }
    if let Some(value) = text_number(&lower) {
        result.qty_min = Some(value);
        result.qty_max = Some(value);
        result.qty_precision_code = Some(QtyPrecision::Text);
        result.qty_parse_warnings.push(QtyWarning::TextNumberFallback);
        return result;
    }

    // Unicode fractions expand to spaced ASCII so "1½" reads as "1 1/2".
    let mut expanded = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match UNICODE_FRACTIONS.iter().find(|(u, _)| *u == ch) {
            Some((_, ascii)) => {
                expanded.push(' ');
                expanded.push_str(ascii);
                expanded.push(' ');
            }
            None => expanded.push(ch),
        }
    }
    let expanded = strip_thousands(&expanded);
    let collapsed = expanded.split_whitespace().collect::<Vec<_>>().join(" ");
    // Hyphenated mixed numbers are not ranges.
    let normalized = MIXED_HYPHEN
        .replace_all(&collapsed, "${1}${2} ${3}")
        .into_owned();

    if let Some((value, precision)) = parse_number(&normalized) {
        result.qty_min = Some(value);
        result.qty_max = Some(value);
        result.qty_precision_code = Some(precision);
        return result;
    }

    let separators: Vec<_> = RANGE_SEP.find_iter(&normalized).collect();
    if !separators.is_empty() {
        if separators.len() > 1 {
            result
                .qty_parse_warnings
                .push(QtyWarning::MultipleRangeSeparators);
        }
        let first = &separators[0];
        let left = normalized[..first.start()].trim();
        let right = normalized[first.end()..].trim();
        match (parse_number(left), parse_number(right)) {
            (Some((a, _)), Some((b, _))) => {
                result.qty_min = Some(a.min(b));
                result.qty_max = Some(a.max(b));
                result.qty_is_range = true;
                result.qty_precision_code = Some(QtyPrecision::Range);
                return result;
            }
            _ => {
                result
                    .qty_parse_warnings
                    .push(QtyWarning::QtyRangeSideInvalid);
            }
        }
    }

    result.qty_parse_warnings.push(QtyWarning::NoNumericQuantity);
    result
}

/// Parse one number: mixed, fraction, integer, or decimal.
fn parse_number(s: &str) -> Option<(f64, QtyPrecision)> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(caps) = MIXED.captures(s) {
        let whole: f64 = caps[1].parse().ok()?;
        let num: f64 = caps[2].parse().ok()?;
        let den: f64 = caps[3].parse().ok()?;
        if den == 0.0 {
            return None;
        }
        return Some((whole + num / den, QtyPrecision::Mixed));
    }
    if let Some(caps) = FRACTION.captures(s) {
        let num: f64 = caps[1].parse().ok()?;
        let den: f64 = caps[2].parse().ok()?;
        if den == 0.0 {
            return None;
        }
        return Some((num / den, QtyPrecision::Fraction));
    }
    if INTEGER.is_match(s) {
        return s.parse().ok().map(|v| (v, QtyPrecision::Integer));
    }
    if DECIMAL.is_match(s) {
        return s.parse().ok().map(|v| (v, QtyPrecision::Decimal));
    }
    None
}

/// Strip `,` thousands separators: a comma between a digit and exactly three
/// digits (not followed by a fourth) is dropped; any other comma stays.
fn strip_thousands(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    for (i, &ch) in chars.iter().enumerate() {
        if ch == ',' {
            let prev_digit = i > 0 && chars[i - 1].is_ascii_digit();
            let next_three = chars[i + 1..].iter().take_while(|c| c.is_ascii_digit()).count();
            if prev_digit && next_three == 3 {
                continue;
            }
        }
        out.push(ch);
    }
    out
}
