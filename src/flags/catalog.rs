//! Keyword rule catalog
//!
//! Loads the per-slot keyword/value lists from the catalog directory and
//! pairs each slot with its calculation pattern. The file layout is fixed:
//!
//! - `keyword_01.txt` .. `keyword_40.txt` — one list per primary slot
//! - `reserve_01_keyword1.txt` .. `reserve_30_keyword1.txt` — inclusion list
//! - `reserve_01_keyword2.txt` .. `reserve_30_keyword2.txt` — exclusion list
//! - `reserve_01_ordercontents.txt` .. `reserve_30_ordercontents.txt` — codes
//!
//! Slot 41's vendor lists are not files: they come from the routing
//! profile configuration, keyed by profile id. Missing or empty files are
//! valid and evaluate to "no match"; an invalid regex fails the load.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::ticket::ProfileId;

use super::FLAG_COUNT;

/// Slots fed by `keyword_NN.txt` files.
const PRIMARY_SLOTS: usize = 40;
/// Slots fed by the `reserve_NN_*` file triples.
const RESERVE_SLOTS: usize = 30;

/// Fixed pattern assignment per slot (index = slot - 1).
///
/// Slots 1-40 use pattern 1 except slot 33 (pattern 2) and slot 35
/// (pattern 5); slot 41 is the vendor cross-match; slots 42-71 use the
/// three-way pattern.
#[rustfmt::skip]
const PATTERN_TABLE: [u8; FLAG_COUNT] = [
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 2, 1, 5, 1, 1, 1, 1, 1,
    3, 4, 4, 4, 4, 4, 4, 4, 4, 4,
    4, 4, 4, 4, 4, 4, 4, 4, 4, 4,
    4, 4, 4, 4, 4, 4, 4, 4, 4, 4,
    4,
];

/// Errors raised while loading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog directory not found: {0}")]
    DirNotFound(PathBuf),

    #[error("Failed to read catalog file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid keyword pattern in {path} line {line}: {message}")]
    Pattern {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

/// Calculation pattern of one flag slot, with its parameter bundle.
#[derive(Debug, Clone)]
pub enum CalcPattern {
    /// Pattern 1: content matches at least one keyword regex.
    TextContainsAny { keywords: Vec<Regex> },
    /// Pattern 2: source company equals one of the listed values.
    FieldEqualsAny { values: Vec<String> },
    /// Pattern 3: content or person-in-charge contains a vendor name
    /// registered for the ticket's routing profile (substring match).
    VendorCrossMatch,
    /// Pattern 4: content matches one of `include`, none of `exclude`,
    /// and the order-content code is one of `order_codes`. Empty lists
    /// make their clause vacuously true; all three empty yields 0.
    ThreeWay {
        include: Vec<Regex>,
        exclude: Vec<Regex>,
        order_codes: Vec<u16>,
    },
    /// Pattern 5: classification code equals one of the listed values.
    ClassificationMatch { codes: Vec<u16> },
}

impl CalcPattern {
    /// Pattern number as documented in the catalog layout.
    pub fn number(&self) -> u8 {
        match self {
            CalcPattern::TextContainsAny { .. } => 1,
            CalcPattern::FieldEqualsAny { .. } => 2,
            CalcPattern::VendorCrossMatch => 3,
            CalcPattern::ThreeWay { .. } => 4,
            CalcPattern::ClassificationMatch { .. } => 5,
        }
    }

    /// Number of configured entries, for catalog listings.
    pub fn entry_count(&self) -> usize {
        match self {
            CalcPattern::TextContainsAny { keywords } => keywords.len(),
            CalcPattern::FieldEqualsAny { values } => values.len(),
            CalcPattern::VendorCrossMatch => 0,
            CalcPattern::ThreeWay {
                include,
                exclude,
                order_codes,
            } => include.len() + exclude.len() + order_codes.len(),
            CalcPattern::ClassificationMatch { codes } => codes.len(),
        }
    }
}

/// Immutable per-run rule catalog: one [`CalcPattern`] per slot plus the
/// vendor lists for the cross-match slot.
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    slots: Vec<CalcPattern>,
    vendors: HashMap<ProfileId, Vec<String>>,
}

impl RuleCatalog {
    /// Load the catalog from `dir`, registering `vendors` (already
    /// normalized, see [`normalize_vendor`]) for the cross-match slot.
    pub fn load(
        dir: &Path,
        vendors: HashMap<ProfileId, Vec<String>>,
    ) -> Result<Self, CatalogError> {
        if !dir.is_dir() {
            return Err(CatalogError::DirNotFound(dir.to_path_buf()));
        }

        let mut slots = Vec::with_capacity(FLAG_COUNT);

        for num in 1..=PRIMARY_SLOTS {
            let path = dir.join(format!("keyword_{:02}.txt", num));
            let lines = read_lines(&path)?;
            let pattern = match PATTERN_TABLE[num - 1] {
                2 => CalcPattern::FieldEqualsAny { values: lines },
                5 => CalcPattern::ClassificationMatch {
                    codes: numeric_entries(&lines),
                },
                _ => CalcPattern::TextContainsAny {
                    keywords: compile_all(&path, &lines)?,
                },
            };
            slots.push(pattern);
        }

        // The vendor cross-match slot has no backing file.
        slots.push(CalcPattern::VendorCrossMatch);

        for num in 1..=RESERVE_SLOTS {
            let include_path = dir.join(format!("reserve_{:02}_keyword1.txt", num));
            let exclude_path = dir.join(format!("reserve_{:02}_keyword2.txt", num));
            let orders_path = dir.join(format!("reserve_{:02}_ordercontents.txt", num));

            let include = compile_all(&include_path, &read_lines(&include_path)?)?;
            let exclude = compile_all(&exclude_path, &read_lines(&exclude_path)?)?;
            let order_codes = numeric_entries(&read_lines(&orders_path)?);

            slots.push(CalcPattern::ThreeWay {
                include,
                exclude,
                order_codes,
            });
        }

        debug!(
            slots = slots.len(),
            profiles = vendors.len(),
            "rule catalog loaded"
        );

        Ok(RuleCatalog { slots, vendors })
    }

    /// Catalog with every list empty; every flag evaluates to 0.
    pub fn empty() -> Self {
        let slots = (1..=FLAG_COUNT)
            .map(|slot| match PATTERN_TABLE[slot - 1] {
                2 => CalcPattern::FieldEqualsAny { values: Vec::new() },
                3 => CalcPattern::VendorCrossMatch,
                4 => CalcPattern::ThreeWay {
                    include: Vec::new(),
                    exclude: Vec::new(),
                    order_codes: Vec::new(),
                },
                5 => CalcPattern::ClassificationMatch { codes: Vec::new() },
                _ => CalcPattern::TextContainsAny {
                    keywords: Vec::new(),
                },
            })
            .collect();
        RuleCatalog {
            slots,
            vendors: HashMap::new(),
        }
    }

    /// Pattern assigned to a slot (1-based).
    pub fn pattern(&self, slot: usize) -> &CalcPattern {
        &self.slots[slot - 1]
    }

    /// Iterate `(slot, pattern)` in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &CalcPattern)> {
        self.slots.iter().enumerate().map(|(i, p)| (i + 1, p))
    }

    /// Vendor names registered for a routing profile.
    pub fn vendors_for(&self, profile: ProfileId) -> Option<&[String]> {
        self.vendors.get(&profile).map(|v| v.as_slice())
    }

    #[cfg(test)]
    pub(crate) fn with_slot(mut self, slot: usize, pattern: CalcPattern) -> Self {
        self.slots[slot - 1] = pattern;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_vendors(mut self, profile: ProfileId, names: Vec<String>) -> Self {
        self.vendors.insert(profile, names);
        self
    }
}

/// Normalize a vendor name for cross-matching: ideographic spaces removed,
/// upper-cased. Ticket fields get the same space stripping at evaluation
/// time; width folding happens in the upstream cleansing stage.
pub fn normalize_vendor(name: &str) -> String {
    name.replace('\u{3000}', "").replace(' ', "").to_uppercase()
}

fn read_lines(path: &Path) -> Result<Vec<String>, CatalogError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(content
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect())
}

fn compile_all(path: &Path, lines: &[String]) -> Result<Vec<Regex>, CatalogError> {
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            Regex::new(line).map_err(|e| CatalogError::Pattern {
                path: path.to_path_buf(),
                line: idx + 1,
                message: e.to_string(),
            })
        })
        .collect()
}

/// Keep only entries that parse as numbers; others are ignored.
fn numeric_entries(lines: &[String]) -> Vec<u16> {
    lines.iter().filter_map(|l| l.parse().ok()).collect()
}
