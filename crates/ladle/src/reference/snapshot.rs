//! Reference snapshot: load-once, immutable, index-backed.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use indexmap::IndexMap;

use crate::error::{LadleError, Result};
use crate::record::{PackedState, TargetDimension};

use super::density::Density;
use super::form::Form;
use super::ingredient::Ingredient;
use super::normalize::normalize_name;
use super::tokens::MeaningTokens;

/// All reference data, loaded once per process and immutable afterwards.
///
/// Indices are keyed on [`normalize_name`] output so that both sides of every
/// lookup share the same folding. The snapshot is `Send + Sync`; a driver may
/// query it from many worker threads without locks. Hot reload, if ever
/// needed, is an atomic swap of the whole snapshot.
#[derive(Debug)]
pub struct ReferenceSnapshot {
    /// Ingredients sorted by `ingredient_id`; fuzzy iteration order.
    ingredients: Vec<Ingredient>,
    by_id: HashMap<String, usize>,
    by_primary: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
    by_keep_tokens: HashMap<String, usize>,
    /// Meaning-token set per ingredient, parallel to `ingredients`.
    token_sets: Vec<BTreeSet<String>>,

    forms: IndexMap<String, Form>,
    /// Group name → member form ids, sorted.
    form_groups: HashMap<String, Vec<String>>,
    /// Global token → form map in declared precedence order.
    form_tokens: Vec<(String, String)>,
    form_token_index: HashMap<String, (usize, String)>,
    category_defaults: HashMap<String, String>,

    /// Densities grouped by ingredient, sorted by `density_id`.
    densities_by_ingredient: HashMap<String, Vec<Density>>,

    meaning: MeaningTokens,
}

impl ReferenceSnapshot {
    /// Build a snapshot from already-parsed entities. The loader and the test
    /// fixtures both come through here, so index construction is identical.
    pub fn from_parts(
        mut ingredients: Vec<Ingredient>,
        forms: Vec<Form>,
        densities: Vec<Density>,
        form_tokens: Vec<(String, String)>,
        category_defaults: Vec<(String, String)>,
        meaning: MeaningTokens,
    ) -> Self {
        ingredients.sort_by(|a, b| a.ingredient_id.cmp(&b.ingredient_id));

        let mut by_id = HashMap::new();
        let mut by_primary = HashMap::new();
        let mut by_alias = HashMap::new();
        let mut by_keep_tokens = HashMap::new();
        let mut token_sets = Vec::with_capacity(ingredients.len());

        for (idx, ing) in ingredients.iter().enumerate() {
            by_id.insert(ing.ingredient_id.clone(), idx);

            // On key collision the lowest ingredient_id wins; ingredients are
            // already sorted, so first insert is the winner.
            let primary_key = normalize_name(&ing.primary_name);
            by_primary.entry(primary_key.clone()).or_insert(idx);

            for alias in &ing.aliases {
                by_alias.entry(normalize_name(alias)).or_insert(idx);
            }

            let keep_key = meaning.keep_key(&primary_key);
            if !keep_key.is_empty() {
                by_keep_tokens.entry(keep_key).or_insert(idx);
            }

            token_sets.push(meaning.token_set(&primary_key));
        }

        let forms: IndexMap<String, Form> = forms
            .into_iter()
            .map(|f| (f.form_id.clone(), f))
            .collect();

        let mut form_groups: HashMap<String, Vec<String>> = HashMap::new();
        for form in forms.values() {
            if let Some(group) = &form.form_group {
                form_groups
                    .entry(group.clone())
                    .or_default()
                    .push(form.form_id.clone());
            }
        }
        for members in form_groups.values_mut() {
            members.sort();
        }

        // First declaration of a token wins; precedence is file order.
        let mut form_token_index: HashMap<String, (usize, String)> = HashMap::new();
        for (prec, (token, form_id)) in form_tokens.iter().enumerate() {
            form_token_index
                .entry(token.to_lowercase())
                .or_insert((prec, form_id.clone()));
        }

        let mut densities_by_ingredient: HashMap<String, Vec<Density>> = HashMap::new();
        for d in densities {
            densities_by_ingredient
                .entry(d.ingredient_id.clone())
                .or_default()
                .push(d);
        }
        for rows in densities_by_ingredient.values_mut() {
            rows.sort_by(|a, b| a.density_id.cmp(&b.density_id));
        }

        Self {
            ingredients,
            by_id,
            by_primary,
            by_alias,
            by_keep_tokens,
            token_sets,
            forms,
            form_groups,
            form_tokens,
            form_token_index,
            category_defaults: category_defaults.into_iter().collect(),
            densities_by_ingredient,
            meaning,
        }
    }

    /// Load a snapshot from a directory of delimited files.
    ///
    /// Required: `ingredients.csv`, `forms.csv`, `densities.csv`. Optional:
    /// `form_tokens.csv`, `category_defaults.csv`, `meaning_tokens.txt`
    /// (absent files yield empty maps). Delimiters are detected per file.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();

        let ingredients = load_ingredients(&dir.join("ingredients.csv"))?;
        let forms = load_forms(&dir.join("forms.csv"))?;
        let densities = load_densities(&dir.join("densities.csv"))?;
        let form_tokens = load_pairs(&dir.join("form_tokens.csv"), "token", "form_tokens")?;
        let category_defaults = load_pairs(
            &dir.join("category_defaults.csv"),
            "category",
            "category_defaults",
        )?;
        let meaning = load_meaning_tokens(&dir.join("meaning_tokens.txt"))?;

        if ingredients.is_empty() {
            return Err(LadleError::Reference(
                "ingredient table loaded zero rows".to_string(),
            ));
        }

        Ok(Self::from_parts(
            ingredients,
            forms,
            densities,
            form_tokens,
            category_defaults,
            meaning,
        ))
    }

    // --- ingredient lookups -------------------------------------------------

    pub fn ingredient(&self, ingredient_id: &str) -> Option<&Ingredient> {
        self.by_id.get(ingredient_id).map(|&i| &self.ingredients[i])
    }

    /// Exact match against normalized primary names.
    pub fn by_primary(&self, name_norm: &str) -> Option<&Ingredient> {
        self.by_primary.get(name_norm).map(|&i| &self.ingredients[i])
    }

    /// Exact match against normalized aliases.
    pub fn by_alias(&self, name_norm: &str) -> Option<&Ingredient> {
        self.by_alias.get(name_norm).map(|&i| &self.ingredients[i])
    }

    /// Match against the keep-meaning-tokens-only index.
    pub fn by_keep_tokens(&self, name_norm: &str) -> Option<&Ingredient> {
        let key = self.meaning.keep_key(name_norm);
        if key.is_empty() {
            return None;
        }
        self.by_keep_tokens.get(&key).map(|&i| &self.ingredients[i])
    }

    /// Top-k Jaccard matches over meaning-token sets.
    ///
    /// Ties break on (alias count desc, ingredient_id asc) — a total order
    /// over stable fields, never container iteration order.
    pub fn fuzzy_topk(&self, tokens: &BTreeSet<String>, k: usize) -> Vec<(&Ingredient, f64)> {
        if tokens.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f64)> = Vec::new();
        for (idx, entry_tokens) in self.token_sets.iter().enumerate() {
            if entry_tokens.is_empty() {
                continue;
            }
            let intersection = tokens.intersection(entry_tokens).count();
            if intersection == 0 {
                continue;
            }
            let union = tokens.union(entry_tokens).count();
            scored.push((idx, intersection as f64 / union as f64));
        }

        scored.sort_by(|&(ia, sa), &(ib, sb)| {
            sb.partial_cmp(&sa)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    self.ingredients[ib]
                        .aliases
                        .len()
                        .cmp(&self.ingredients[ia].aliases.len())
                })
                .then_with(|| {
                    self.ingredients[ia]
                        .ingredient_id
                        .cmp(&self.ingredients[ib].ingredient_id)
                })
        });

        scored
            .into_iter()
            .take(k)
            .map(|(idx, score)| (&self.ingredients[idx], score))
            .collect()
    }

    // --- forms --------------------------------------------------------------

    pub fn form(&self, form_id: &str) -> Option<&Form> {
        self.forms.get(form_id)
    }

    /// All member form ids of the group the given form belongs to.
    pub fn form_group(&self, form_id: &str) -> Option<&[String]> {
        let group = self.forms.get(form_id)?.form_group.as_ref()?;
        self.form_groups.get(group).map(|v| v.as_slice())
    }

    pub fn default_form_for(&self, ingredient_id: &str) -> Option<&str> {
        self.ingredient(ingredient_id)?
            .default_form_id
            .as_deref()
    }

    /// Global token→form lookup; returns the token's precedence rank.
    pub fn form_for_token(&self, token: &str) -> Option<(usize, &str)> {
        self.form_token_index
            .get(token)
            .map(|(prec, form_id)| (*prec, form_id.as_str()))
    }

    /// The global token→form map in declared precedence order.
    pub fn form_tokens(&self) -> &[(String, String)] {
        &self.form_tokens
    }

    pub fn category_default(&self, category: &str) -> Option<&str> {
        self.category_defaults.get(category).map(|s| s.as_str())
    }

    // --- densities ----------------------------------------------------------

    /// All densities for an ingredient, in deterministic `density_id` order.
    pub fn densities_for(&self, ingredient_id: &str) -> &[Density] {
        self.densities_by_ingredient
            .get(ingredient_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Whether the ingredient has any density row for the given form.
    pub fn has_density_for_form(&self, ingredient_id: &str, form_id: &str) -> bool {
        self.densities_for(ingredient_id)
            .iter()
            .any(|d| d.form_id == form_id)
    }

    pub fn meaning(&self) -> &MeaningTokens {
        &self.meaning
    }

    pub fn ingredient_count(&self) -> usize {
        self.ingredients.len()
    }

    pub fn form_count(&self) -> usize {
        self.forms.len()
    }

    pub fn density_count(&self) -> usize {
        self.densities_by_ingredient.values().map(Vec::len).sum()
    }
}

// --- file loading ----------------------------------------------------------

/// Detect the delimiter from the header line: tabs win when present.
fn detect_delimiter(contents: &str) -> u8 {
    match contents.lines().next() {
        Some(header) if header.contains('\t') => b'\t',
        _ => b',',
    }
}

fn read_table(path: &Path) -> Result<Vec<HashMap<String, String>>> {
    let contents =
        fs::read_to_string(path).map_err(|e| LadleError::io(path.to_path_buf(), e))?;
    let delimiter = detect_delimiter(&contents);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(contents.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row = HashMap::new();
        for (i, header) in headers.iter().enumerate() {
            let value = record.get(i).unwrap_or("").trim();
            if !value.is_empty() {
                row.insert(header.clone(), value.to_string());
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

fn field<'a>(row: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    row.get(name).map(|s| s.as_str())
}

fn required<'a>(
    row: &'a HashMap<String, String>,
    name: &str,
    table: &str,
    line: usize,
) -> Result<&'a str> {
    field(row, name).ok_or_else(|| {
        LadleError::Reference(format!("{table} row {line}: missing '{name}'"))
    })
}

fn parse_f64(value: &str, table: &str, line: usize, name: &str) -> Result<f64> {
    value.parse().map_err(|_| {
        LadleError::Reference(format!("{table} row {line}: '{name}' is not a number: {value}"))
    })
}

fn load_ingredients(path: &Path) -> Result<Vec<Ingredient>> {
    let mut out = Vec::new();
    for (i, row) in read_table(path)?.iter().enumerate() {
        let line = i + 2;
        let ingredient_id = required(row, "ingredient_id", "ingredients", line)?.to_string();
        let primary_name = required(row, "primary_name", "ingredients", line)?.to_string();

        let aliases = field(row, "aliases")
            .map(split_semicolons)
            .unwrap_or_default();

        let form_overrides = field(row, "form_overrides")
            .map(|raw| {
                split_semicolons(raw)
                    .iter()
                    .filter_map(|pair| {
                        pair.split_once('=')
                            .map(|(t, f)| (t.trim().to_lowercase(), f.trim().to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default();

        out.push(Ingredient {
            ingredient_id,
            primary_name,
            aliases,
            category: field(row, "category").map(str::to_string),
            default_form_id: field(row, "default_form_id").map(str::to_string),
            form_overrides,
        });
    }
    Ok(out)
}

fn load_forms(path: &Path) -> Result<Vec<Form>> {
    let mut out = Vec::new();
    for (i, row) in read_table(path)?.iter().enumerate() {
        let line = i + 2;
        let form_id = required(row, "form_id", "forms", line)?.to_string();
        let target_dimension = match field(row, "target_dimension") {
            None => TargetDimension::Auto,
            Some(raw) => match raw.to_lowercase().as_str() {
                "g" | "mass" => TargetDimension::Mass,
                "ml" | "volume" => TargetDimension::Volume,
                "auto" => TargetDimension::Auto,
                other => {
                    return Err(LadleError::Reference(format!(
                        "forms row {line}: unknown target_dimension '{other}'"
                    )))
                }
            },
        };

        out.push(Form {
            name: field(row, "name").unwrap_or(&form_id).to_string(),
            form_id,
            form_group: field(row, "form_group").map(str::to_string),
            target_dimension,
            display_rule_default: field(row, "display_rule_default").map(str::to_string),
        });
    }
    Ok(out)
}

fn load_densities(path: &Path) -> Result<Vec<Density>> {
    let mut out = Vec::new();
    for (i, row) in read_table(path)?.iter().enumerate() {
        let line = i + 2;
        let density_id = required(row, "density_id", "densities", line)?.to_string();
        let g_per_ml = parse_f64(
            required(row, "g_per_ml", "densities", line)?,
            "densities",
            line,
            "g_per_ml",
        )?;
        if g_per_ml <= 0.0 {
            return Err(LadleError::Reference(format!(
                "densities row {line}: g_per_ml must be positive, got {g_per_ml}"
            )));
        }

        let packed_state = match field(row, "packed_state") {
            None => None,
            Some("packed") => Some(PackedState::Packed),
            Some("loosely_packed") | Some("loosely packed") => Some(PackedState::LooselyPacked),
            Some(other) => {
                return Err(LadleError::Reference(format!(
                    "densities row {line}: unknown packed_state '{other}'"
                )))
            }
        };

        let parse_date = |name: &str| -> Result<Option<chrono::NaiveDate>> {
            match field(row, name) {
                None => Ok(None),
                Some(raw) => raw.parse().map(Some).map_err(|_| {
                    LadleError::Reference(format!(
                        "densities row {line}: '{name}' is not an ISO date: {raw}"
                    ))
                }),
            }
        };

        out.push(Density {
            density_id,
            ingredient_id: required(row, "ingredient_id", "densities", line)?.to_string(),
            form_id: required(row, "form_id", "densities", line)?.to_string(),
            g_per_ml,
            packed_state,
            temp_c: field(row, "temp_c")
                .map(|v| parse_f64(v, "densities", line, "temp_c"))
                .transpose()?,
            source_priority: field(row, "source_priority")
                .map(|v| {
                    v.parse().map_err(|_| {
                        LadleError::Reference(format!(
                            "densities row {line}: source_priority is not an integer: {v}"
                        ))
                    })
                })
                .transpose()?
                .unwrap_or(0),
            quality_score: field(row, "quality_score")
                .map(|v| parse_f64(v, "densities", line, "quality_score"))
                .transpose()?
                .unwrap_or(0.0),
            effective_from: parse_date("effective_from")?,
            effective_to: parse_date("effective_to")?,
            is_active: field(row, "is_active")
                .map(parse_bool)
                .unwrap_or(true),
        });
    }
    Ok(out)
}

/// Two-column table mapping `key_col` to a form id; a missing file is an
/// empty map. Row order is the documented precedence order.
fn load_pairs(path: &Path, key_col: &str, table: &str) -> Result<Vec<(String, String)>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    for (i, row) in read_table(path)?.iter().enumerate() {
        let line = i + 2;
        let key = required(row, key_col, table, line)?.to_lowercase();
        let value = required(row, "form_id", table, line)?.to_string();
        out.push((key, value));
    }
    Ok(out)
}

fn load_meaning_tokens(path: &Path) -> Result<MeaningTokens> {
    if !path.exists() {
        return Ok(MeaningTokens::default());
    }
    let contents =
        fs::read_to_string(path).map_err(|e| LadleError::io(path.to_path_buf(), e))?;
    let tokens = contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string);
    Ok(MeaningTokens::new(tokens))
}

fn split_semicolons(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.to_lowercase().as_str(),
        "true" | "1" | "yes" | "y" | "t"
    )
}
