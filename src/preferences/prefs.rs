//! prefs — validated preference distributions.
//!
//! Purpose
//! -------
//! Define [`Preferences`], the symbol-keyed probability distribution used
//! across the codec, prior, and optimizer. Validation happens once, at
//! construction, so downstream code can assume non-negative, normalized
//! values and concentrate on alphabet agreement.
//!
//! Key behaviors
//! -------------
//! - Validate symbol count, finiteness, non-negativity, and normalization
//!   (sum within a tolerance of one) on every public constructor.
//! - Provide ordered, deterministic iteration (sorted by symbol) plus
//!   keyed access.
//!
//! Invariants & assumptions
//! ------------------------
//! - At least two symbols; every value finite and `>= 0`; values sum to
//!   one within the construction tolerance.
//! - Agreement with a particular [`Alphabet`](crate::preferences::alphabet::Alphabet)
//!   is *not* an invariant of this type; the component owning the alphabet
//!   checks it per call.
//!
//! Conventions
//! -----------
//! - The default tolerance is [`Preferences::DEFAULT_TOL`] (`1e-6`);
//!   callers needing a different window use [`Preferences::with_tol`],
//!   bounded by the layer-wide `0 < tol < 1e-4` rule.
use std::collections::BTreeMap;

use crate::preferences::{
    errors::{PrefsError, PrefsResult},
    validation::{check_sums_to_one, check_tol},
};

/// A validated preference distribution: one non-negative value per symbol,
/// summing to one within tolerance.
#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    values: BTreeMap<char, f64>,
}

impl Preferences {
    /// Default tolerance for the sum-to-one check.
    pub const DEFAULT_TOL: f64 = 1e-6;

    /// Construct a distribution with the default tolerance.
    ///
    /// # Errors
    /// - [`PrefsError::TooFewSymbols`] for fewer than two symbols.
    /// - [`PrefsError::NonFinitePreference`] / [`PrefsError::NegativePreference`]
    ///   for bad values.
    /// - [`PrefsError::SumNotOne`] if the values do not sum to one within
    ///   the tolerance.
    pub fn new(values: BTreeMap<char, f64>) -> PrefsResult<Self> {
        Self::with_tol(values, Self::DEFAULT_TOL)
    }

    /// Construct a distribution with an explicit sum tolerance.
    ///
    /// The tolerance must satisfy `0 < tol < 1e-4`.
    ///
    /// # Errors
    /// As [`Preferences::new`], plus [`PrefsError::InvalidTol`] for an
    /// out-of-window tolerance.
    pub fn with_tol(values: BTreeMap<char, f64>, tol: f64) -> PrefsResult<Self> {
        check_tol(tol)?;
        if values.len() < 2 {
            return Err(PrefsError::TooFewSymbols { n_symbols: values.len() });
        }
        for (&symbol, &value) in &values {
            if !value.is_finite() {
                return Err(PrefsError::NonFinitePreference { symbol, value });
            }
            if value < 0.0 {
                return Err(PrefsError::NegativePreference { symbol, value });
            }
        }
        check_sums_to_one(values.values().copied(), tol)?;
        Ok(Preferences { values })
    }

    /// Convenience constructor from symbol/value pairs (mainly for tests
    /// and examples). Duplicate symbols keep the last value.
    pub fn from_pairs(pairs: &[(char, f64)]) -> PrefsResult<Self> {
        Self::new(pairs.iter().copied().collect())
    }

    /// Construct from values already known to satisfy the invariants.
    ///
    /// Used by the codec after its own postcondition checks; not exposed
    /// publicly so external values always go through validation.
    pub(crate) fn from_validated(values: BTreeMap<char, f64>) -> Self {
        Preferences { values }
    }

    /// Value for `symbol`, if present.
    pub fn get(&self, symbol: char) -> Option<f64> {
        self.values.get(&symbol).copied()
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false` for a validated distribution.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Symbols in ascending order.
    pub fn symbols(&self) -> impl Iterator<Item = char> + '_ {
        self.values.keys().copied()
    }

    /// `(symbol, value)` pairs in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (char, f64)> + '_ {
        self.values.iter().map(|(&symbol, &value)| (symbol, value))
    }

    /// Sum of all values (one, up to the construction tolerance).
    pub fn sum(&self) -> f64 {
        self.values.values().sum()
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &BTreeMap<char, f64> {
        &self.values
    }

    /// Whether `other` has exactly the same symbol set.
    pub fn same_symbols(&self, other: &Preferences) -> bool {
        self.values.len() == other.values.len()
            && self.values.keys().all(|symbol| other.values.contains_key(symbol))
    }
}
