//! Intake & validation: normalize, enforce required fields, reject
//! structurally bad rows, compute idempotency keys.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;

use crate::record::{CleanRow, RawRow, RejectCode};

/// Outcome of validating one raw row.
#[derive(Debug, Clone)]
pub enum IntakeOutcome {
    Accepted(Box<CleanRow>),
    Rejected(Rejection),
}

/// A rejected row with its classification.
#[derive(Debug, Clone, Serialize)]
pub struct Rejection {
    pub code: RejectCode,
    pub detail: String,
    pub recipe_id: Option<String>,
    pub ingredient_line_number: Option<u32>,
    pub ingredient_original_text: Option<String>,
}

static UNIT_TOKEN_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z .\-]*$").expect("unit shape regex"));

/// NFC-normalize, trim, collapse internal whitespace; empty becomes `None`.
pub fn clean_text(raw: &str) -> Option<String> {
    let nfc: String = raw.nfc().collect();
    let collapsed = nfc.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Section-header heuristic: a short bare noun phrase with no digits that
/// ends with `:` or is written in all caps.
pub fn looks_like_section_header(text: &str) -> bool {
    if text.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }
    if text.split_whitespace().count() > 5 {
        return false;
    }
    if text.ends_with(':') {
        return true;
    }
    let has_letters = text.chars().any(|c| c.is_alphabetic());
    has_letters && text.chars().filter(|c| c.is_alphabetic()).all(|c| c.is_uppercase())
}

/// A unit token is structurally valid when it is letters with optional
/// spaces, periods, and hyphens. Digits or symbol noise reject the row.
pub fn unit_token_is_well_formed(unit: &str) -> bool {
    UNIT_TOKEN_SHAPE.is_match(unit)
}

/// Idempotency key: `sha256(recipe_id | line_number | line_hash-or-text)`.
pub fn idempotency_key(recipe_id: &str, line_number: u32, discriminator: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(recipe_id.as_bytes());
    hasher.update([0x1f]);
    hasher.update(line_number.to_string().as_bytes());
    hasher.update([0x1f]);
    hasher.update(discriminator.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Validate a raw row, producing either a [`CleanRow`] or a classified
/// [`Rejection`]. Duplicate detection lives in the batch driver; this
/// function is pure.
pub fn validate(raw: &RawRow) -> IntakeOutcome {
    let recipe_id = match string_field(&raw.recipe_id) {
        FieldState::Present(s) => s,
        FieldState::Missing => {
            return reject(raw, RejectCode::MissingRequiredField, "recipe_id is missing or empty")
        }
        FieldState::WrongType => {
            return reject(raw, RejectCode::TypeMismatch, "recipe_id is not a string")
        }
    };

    let line_number = match integer_field(&raw.ingredient_line_number) {
        FieldState::Present(n) if n >= 1 => n as u32,
        FieldState::Present(n) => {
            return reject(
                raw,
                RejectCode::TypeMismatch,
                &format!("ingredient_line_number must be >= 1, got {n}"),
            )
        }
        FieldState::Missing => {
            return reject(
                raw,
                RejectCode::MissingRequiredField,
                "ingredient_line_number is missing",
            )
        }
        FieldState::WrongType => {
            return reject(
                raw,
                RejectCode::TypeMismatch,
                "ingredient_line_number is not an integer",
            )
        }
    };

    let original_text = match string_field(&raw.ingredient_original_text) {
        FieldState::Present(s) => s,
        FieldState::Missing => {
            return reject(
                raw,
                RejectCode::MissingRequiredField,
                "ingredient_original_text is missing or empty",
            )
        }
        FieldState::WrongType => {
            return reject(
                raw,
                RejectCode::TypeMismatch,
                "ingredient_original_text is not a string",
            )
        }
    };

    if looks_like_section_header(&original_text) {
        return reject(
            raw,
            RejectCode::SectionHeaderRow,
            &format!("'{original_text}' looks like a section header"),
        );
    }

    let unit_original = raw.unit_original.as_deref().and_then(clean_text);
    if let Some(unit) = &unit_original {
        if !unit_token_is_well_formed(unit) {
            return reject(
                raw,
                RejectCode::UnitInvalidFormat,
                &format!("unit token '{unit}' is structurally malformed"),
            );
        }
    }

    let line_hash = raw.line_hash.as_deref().and_then(clean_text);
    let discriminator = line_hash.as_deref().unwrap_or(&original_text);
    let key = idempotency_key(&recipe_id, line_number, discriminator);

    IntakeOutcome::Accepted(Box::new(CleanRow {
        recipe_id,
        ingredient_line_number: line_number,
        ingredient_original_text: original_text,
        idempotency_key: key,
        qty_value_original: raw.qty_value_original.as_deref().and_then(clean_text),
        unit_original,
        package_size_raw: raw.package_size_raw.as_deref().and_then(clean_text),
        form_hint_raw: raw.form_hint_raw.as_deref().and_then(clean_text),
        modifiers_raw: raw.modifiers_raw.as_deref().and_then(clean_text),
        size_descriptor_raw: raw.size_descriptor_raw.as_deref().and_then(clean_text),
        line_hash,
    }))
}

enum FieldState<T> {
    Present(T),
    Missing,
    WrongType,
}

fn string_field(value: &Option<Value>) -> FieldState<String> {
    match value {
        None | Some(Value::Null) => FieldState::Missing,
        Some(Value::String(s)) => match clean_text(s) {
            Some(cleaned) => FieldState::Present(cleaned),
            None => FieldState::Missing,
        },
        Some(_) => FieldState::WrongType,
    }
}

fn integer_field(value: &Option<Value>) -> FieldState<i64> {
    match value {
        None | Some(Value::Null) => FieldState::Missing,
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => FieldState::Present(i),
            None => FieldState::WrongType,
        },
        Some(_) => FieldState::WrongType,
    }
}

fn reject(raw: &RawRow, code: RejectCode, detail: &str) -> IntakeOutcome {
    IntakeOutcome::Rejected(Rejection {
        code,
        detail: detail.to_string(),
        recipe_id: match string_field(&raw.recipe_id) {
            FieldState::Present(s) => Some(s),
            _ => None,
        },
        ingredient_line_number: match integer_field(&raw.ingredient_line_number) {
            FieldState::Present(n) if n >= 1 => Some(n as u32),
            _ => None,
        },
        ingredient_original_text: match string_field(&raw.ingredient_original_text) {
            FieldState::Present(s) => Some(s),
            _ => None,
        },
    })
}
