//! codec — stick-breaking bijection between preferences and box vectors.
//!
//! Purpose
//! -------
//! Define [`SimplexCodec`], the bidirectional mapping between an n-symbol
//! preference distribution and a vector of n-1 reals in [0, 1]. The codec
//! lets a generic box-constrained minimizer search the simplex without a
//! simplex-aware solver: each vector component is the conditional fraction
//! of the probability mass remaining after the symbols before it.
//!
//! Key behaviors
//! -------------
//! - [`SimplexCodec::encode`]: preferences to vector, in alphabet order,
//!   with a 0.5 guard when the running sum has already consumed all mass
//!   up to the tolerance (avoids dividing by a near-zero remainder).
//! - [`SimplexCodec::decode`]: vector to preferences via cumulative
//!   products, reconstructing the last symbol from the remainder, then a
//!   single-pass floor adjustment that lifts sub-tolerance values to the
//!   tolerance and takes the excess from the largest symbol.
//!
//! Invariants & assumptions
//! ------------------------
//! - The alphabet is fixed per instance at construction and never shared
//!   mutable state; one codec per site is the expected usage.
//! - Decoded distributions sum to one within the tolerance and have every
//!   value at or above it; violations are reported as internal
//!   inconsistencies, not caller errors.
//! - The floor adjustment identifies the largest symbol once, from the
//!   values before any adjustment, and charges all excess to that single
//!   symbol. With several near-floor entries the donor itself can end
//!   below the floor; that case surfaces as
//!   [`PrefsError::FloorViolated`]. This single-pass behavior is load
//!   bearing for downstream consumers and is kept as is.
//!
//! Conventions
//! -----------
//! - The alphabet's descending order processes the smallest preferences
//!   last, where the cumulative product is most prone to underflow.
//! - Vectors are `ndarray::Array1<f64>`, the crate's canonical numeric
//!   container.
use std::collections::BTreeMap;

use ndarray::Array1;

use crate::preferences::{
    alphabet::Alphabet,
    errors::{PrefsError, PrefsResult},
    prefs::Preferences,
    validation::{check_sums_to_one, check_symbols_match, check_tol},
};

/// Bidirectional mapping between preference distributions over a fixed
/// alphabet and vectors in `[0, 1]^(n-1)`.
///
/// Built from an initial distribution whose values fix the symbol order
/// (descending, ties to the larger symbol). The same instance must be used
/// for both directions of a round trip; vectors are meaningless across
/// codecs with different alphabets.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplexCodec {
    alphabet: Alphabet,
    tol: f64,
}

impl SimplexCodec {
    /// Build a codec from an initial distribution with the default
    /// tolerance ([`Preferences::DEFAULT_TOL`]).
    pub fn new(initial: &Preferences) -> PrefsResult<Self> {
        Self::with_tol(initial, Preferences::DEFAULT_TOL)
    }

    /// Build a codec with an explicit tolerance (`0 < tol < 1e-4`).
    ///
    /// Only the ordering of `initial` matters here; its values are not
    /// otherwise retained.
    ///
    /// # Errors
    /// [`PrefsError::InvalidTol`] for an out-of-window tolerance.
    pub fn with_tol(initial: &Preferences, tol: f64) -> PrefsResult<Self> {
        check_tol(tol)?;
        Ok(SimplexCodec { alphabet: Alphabet::from_reference(initial), tol })
    }

    /// The codec's fixed symbol order.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// The sum/floor tolerance.
    pub fn tol(&self) -> f64 {
        self.tol
    }

    /// Encode a distribution as a stick-breaking vector.
    ///
    /// For each symbol except the last, in alphabet order, the component
    /// is the symbol's preference divided by the mass not yet consumed.
    /// Once the running sum reaches `1 - tol` the remainder is numerically
    /// meaningless and the component is pinned to 0.5.
    ///
    /// # Errors
    /// - [`PrefsError::SymbolSetMismatch`] if `prefs` is not keyed by this
    ///   codec's alphabet.
    /// - [`PrefsError::SumNotOne`] if `prefs` misses this codec's
    ///   tolerance (relevant when `prefs` was built with a looser one).
    pub fn encode(&self, prefs: &Preferences) -> PrefsResult<Array1<f64>> {
        check_symbols_match(prefs, &self.alphabet)?;
        check_sums_to_one(prefs.iter().map(|(_, value)| value), self.tol)?;

        let symbols = self.alphabet.symbols();
        let mut vec = Vec::with_capacity(symbols.len() - 1);
        let mut running_sum = 0.0;
        for &symbol in &symbols[..symbols.len() - 1] {
            let value = prefs.get(symbol).expect("symbol membership checked above");
            if running_sum >= 1.0 - self.tol {
                vec.push(0.5);
            } else {
                vec.push(value / (1.0 - running_sum));
            }
            running_sum += value;
        }
        Ok(Array1::from(vec))
    }

    /// Decode a stick-breaking vector back into a distribution.
    ///
    /// Every component must lie in `[0, 1]`. After reconstruction, values
    /// below the tolerance are raised to exactly the tolerance, with the
    /// added excess subtracted from the symbol that was largest before any
    /// adjustment, so the total stays at one.
    ///
    /// # Errors
    /// - [`PrefsError::VectorLengthMismatch`] /
    ///   [`PrefsError::VectorComponentOutOfRange`] for malformed input.
    /// - [`PrefsError::SumDrifted`] / [`PrefsError::FloorViolated`] if the
    ///   postconditions fail; with in-range input this indicates a defect
    ///   in the transform itself (or the known several-near-floor
    ///   approximation), not caller misuse.
    pub fn decode(&self, vec: &Array1<f64>) -> PrefsResult<Preferences> {
        let symbols = self.alphabet.symbols();
        let n = symbols.len();
        if vec.len() != n - 1 {
            return Err(PrefsError::VectorLengthMismatch { expected: n - 1, found: vec.len() });
        }
        for (index, &value) in vec.iter().enumerate() {
            if !value.is_finite() || value < 0.0 || value > 1.0 {
                return Err(PrefsError::VectorComponentOutOfRange { index, value });
            }
        }

        let mut values = Vec::with_capacity(n);
        let mut running_prod = 1.0;
        for &component in vec.iter() {
            values.push(component * running_prod);
            running_prod *= 1.0 - component;
        }
        let head_sum: f64 = values.iter().sum();
        values.push((1.0 - head_sum).max(0.0));

        // Donor chosen once, from pre-adjustment values; ties go to the
        // larger symbol, matching the alphabet's own tie rule.
        let donor = (0..n)
            .max_by(|&i, &j| {
                values[i].total_cmp(&values[j]).then(symbols[i].cmp(&symbols[j]))
            })
            .expect("alphabet holds at least two symbols");
        for i in 0..n {
            let value = values[i];
            if value < self.tol {
                values[i] = self.tol;
                values[donor] -= self.tol - value;
            }
        }

        let sum: f64 = values.iter().sum();
        if (1.0 - sum).abs() >= self.tol {
            return Err(PrefsError::SumDrifted { sum, tol: self.tol });
        }
        for (i, &value) in values.iter().enumerate() {
            if value < self.tol {
                return Err(PrefsError::FloorViolated {
                    symbol: symbols[i],
                    value,
                    tol: self.tol,
                });
            }
        }

        let map: BTreeMap<char, f64> =
            symbols.iter().copied().zip(values.into_iter()).collect();
        Ok(Preferences::from_validated(map))
    }
}
