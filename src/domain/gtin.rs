//! Product barcodes (GTIN / EAN / UPC).
//!
//! Products carry a set of barcodes. Older rows stored a single value in a numeric
//! column, later a text column; [`Gtins::from_legacy`] turns such a value into the
//! current set form without dropping anything.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lengths allowed by GS1: GTIN-8, GTIN-12 (UPC-A), GTIN-13 (EAN-13), GTIN-14.
const VALID_LENGTHS: [usize; 4] = [8, 12, 13, 14];
const LEGACY_PAD_WIDTH: usize = 13;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GtinError {
    #[error("barcode is empty")]
    Empty,
    #[error("barcode {0:?} contains non-digit characters")]
    NonDigit(String),
    #[error("barcode {0:?} has {1} digits, expected 8, 12, 13 or 14")]
    Length(String, usize),
    #[error("barcode {0:?} has a wrong check digit")]
    CheckDigit(String),
}

/// A validated GTIN.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Gtin(String);

impl Gtin {
    /// Strict parse for newly entered barcodes.
    pub fn parse(raw: &str) -> Result<Self, GtinError> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(GtinError::Empty);
        }
        if !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GtinError::NonDigit(value.to_string()));
        }
        if !VALID_LENGTHS.contains(&value.len()) {
            return Err(GtinError::Length(value.to_string(), value.len()));
        }
        if !has_valid_check_digit(value) {
            return Err(GtinError::CheckDigit(value.to_string()));
        }
        Ok(Gtin(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Gtin {
    type Err = GtinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gtin::parse(s)
    }
}

impl TryFrom<String> for Gtin {
    type Error = GtinError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Gtin::parse(&value)
    }
}

impl From<Gtin> for String {
    fn from(gtin: Gtin) -> Self {
        gtin.0
    }
}

impl fmt::Display for Gtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// GS1 mod-10 check: weights 3 and 1 alternate from the digit left of the check digit.
pub fn has_valid_check_digit(code: &str) -> bool {
    let digits: Vec<u32> = match code.chars().map(|c| c.to_digit(10)).collect() {
        Some(digits) => digits,
        None => return false,
    };
    let Some((check, body)) = digits.split_last() else {
        return false;
    };
    let sum: u32 = body
        .iter()
        .rev()
        .enumerate()
        .map(|(i, d)| if i % 2 == 0 { d * 3 } else { *d })
        .sum();
    (10 - sum % 10) % 10 == *check
}

/// Normalizes one value read from the legacy single-barcode column.
///
/// Returns `None` only for blank input. Numeric values that lost their leading zeros
/// in the old numeric column are padded back to 13 digits; anything else is kept as
/// stored.
pub fn normalize_legacy(raw: &str) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    let numeric = value.bytes().all(|b| b.is_ascii_digit());
    if numeric && value.len() < LEGACY_PAD_WIDTH && !VALID_LENGTHS.contains(&value.len()) {
        return Some(format!("{:0>width$}", value, width = LEGACY_PAD_WIDTH));
    }
    Some(value.to_string())
}

/// The unpadded form a padded barcode had in the old numeric column, if it had one.
///
/// Inverse of the padding in [`normalize_legacy`]: `"0046000000008"` gives
/// `"46000000008"`, while a barcode that was never padded gives `None`.
pub fn legacy_short_form(gtin: &str) -> Option<&str> {
    let value = gtin.trim();
    let short = value.trim_start_matches('0');
    if short.is_empty() || short.len() == value.len() {
        return None;
    }
    (normalize_legacy(short).as_deref() == Some(value)).then_some(short)
}

/// The barcode collection of one product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gtins(BTreeSet<String>);

impl Gtins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from strictly validated barcodes.
    pub fn parse_all<I, S>(values: I) -> Result<Self, GtinError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set: BTreeSet<String> = BTreeSet::new();
        for value in values {
            set.insert(String::from(Gtin::parse(value.as_ref())?));
        }
        Ok(Gtins(set))
    }

    /// One-element (or empty) set from a legacy single-value column.
    pub fn from_legacy(raw: Option<&str>) -> Self {
        Gtins(raw.and_then(normalize_legacy).into_iter().collect())
    }

    /// Adds a validated barcode. Returns `false` when it was already present.
    pub fn insert(&mut self, gtin: Gtin) -> bool {
        self.0.insert(gtin.into())
    }

    /// Adds a value from legacy data without validation.
    pub fn insert_legacy(&mut self, raw: &str) -> bool {
        match normalize_legacy(raw) {
            Some(value) => self.0.insert(value),
            None => false,
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.contains(code.trim())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Merges another set in; nothing already present is removed.
    pub fn extend(&mut self, other: Gtins) {
        self.0.extend(other.0);
    }
}

impl FromIterator<String> for Gtins {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Gtins(iter.into_iter().collect())
    }
}

impl IntoIterator for Gtins {
    type Item = String;
    type IntoIter = std::collections::btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
