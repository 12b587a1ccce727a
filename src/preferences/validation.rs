//! Validation helpers for the preferences layer.
//!
//! This module centralizes the consistency checks shared by the
//! distribution type, the simplex codec, and the Dirichlet prior:
//!
//! - **Tolerance checks**: [`check_tol`] enforces the `0 < tol < 1e-4`
//!   window used throughout the layer.
//! - **Sum checks**: [`check_sums_to_one`] verifies a value iterator sums
//!   to one within a given tolerance.
//! - **Symbol agreement**: [`check_symbols_match`] verifies that a
//!   distribution's key set equals a fixed alphabet.
//!
//! These helpers standardize error reporting by returning domain-specific
//! [`PrefsError`] variants, so higher-level code stays uniform.
use crate::preferences::{
    alphabet::Alphabet,
    errors::{PrefsError, PrefsResult},
    prefs::Preferences,
};

/// Upper bound on the sum tolerance accepted by the preferences layer.
///
/// Tolerances at or above this value would let badly normalized
/// distributions through, so they are rejected at construction.
pub const MAX_TOL: f64 = 1e-4;

/// Validate a sum tolerance.
///
/// The value must be finite, strictly positive, and strictly below
/// [`MAX_TOL`].
///
/// # Errors
/// Returns [`PrefsError::InvalidTol`] for non-finite, non-positive, or
/// unreasonably large tolerances.
pub fn check_tol(tol: f64) -> PrefsResult<()> {
    if !tol.is_finite() {
        return Err(PrefsError::InvalidTol { tol, reason: "Tolerance must be finite." });
    }
    if tol <= 0.0 {
        return Err(PrefsError::InvalidTol { tol, reason: "Tolerance must be positive." });
    }
    if tol >= MAX_TOL {
        return Err(PrefsError::InvalidTol { tol, reason: "Tolerance must be below 1e-4." });
    }
    Ok(())
}

/// Validate that `values` sums to one within `tol`.
///
/// # Errors
/// Returns [`PrefsError::SumNotOne`] with the observed sum otherwise.
pub fn check_sums_to_one<I>(values: I, tol: f64) -> PrefsResult<()>
where
    I: IntoIterator<Item = f64>,
{
    let sum: f64 = values.into_iter().sum();
    if (1.0 - sum).abs() >= tol {
        return Err(PrefsError::SumNotOne { sum, tol });
    }
    Ok(())
}

/// Validate that `prefs` is keyed by exactly the symbols of `alphabet`.
///
/// Both sides are reported in sorted symbol order on mismatch, so the
/// message is deterministic.
///
/// # Errors
/// Returns [`PrefsError::SymbolSetMismatch`] if the key sets differ.
pub fn check_symbols_match(prefs: &Preferences, alphabet: &Alphabet) -> PrefsResult<()> {
    if alphabet.matches(prefs) {
        return Ok(());
    }
    let mut expected: Vec<char> = alphabet.symbols().to_vec();
    expected.sort_unstable();
    let found: Vec<char> = prefs.symbols().collect();
    Err(PrefsError::SymbolSetMismatch {
        expected: expected.iter().collect(),
        found: found.iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Acceptance and rejection windows of `check_tol`.
    // - Sum checking at and around the tolerance boundary.
    // - Symbol-set agreement between distributions and alphabets.
    //
    // They intentionally DO NOT cover:
    // - Construction-time validation of `Preferences` itself, tested in
    //   `prefs.rs`.
    // -------------------------------------------------------------------------

    fn prefs_from(pairs: &[(char, f64)]) -> Preferences {
        let map: BTreeMap<char, f64> = pairs.iter().copied().collect();
        Preferences::new(map).expect("test distribution should be valid")
    }

    #[test]
    // Purpose
    // -------
    // Verify the accepted window of `check_tol` and the three rejection
    // reasons (non-finite, non-positive, too large).
    fn check_tol_enforces_open_window() {
        assert!(check_tol(1e-6).is_ok());
        assert!(check_tol(9.9e-5).is_ok());
        assert!(matches!(check_tol(0.0), Err(PrefsError::InvalidTol { .. })));
        assert!(matches!(check_tol(-1e-6), Err(PrefsError::InvalidTol { .. })));
        assert!(matches!(check_tol(1e-4), Err(PrefsError::InvalidTol { .. })));
        assert!(matches!(check_tol(f64::NAN), Err(PrefsError::InvalidTol { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Ensure `check_sums_to_one` accepts sums within tolerance and rejects
    // sums at or beyond it.
    fn check_sums_to_one_boundary_behavior() {
        // Arrange
        let tol = 1e-6;

        // Act + Assert
        assert!(check_sums_to_one([0.5, 0.5], tol).is_ok());
        assert!(check_sums_to_one([0.5, 0.5 + 5e-7], tol).is_ok());
        assert!(matches!(
            check_sums_to_one([0.5, 0.5 + 2e-6], tol),
            Err(PrefsError::SumNotOne { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Confirm symbol agreement passes for identical key sets regardless of
    // alphabet ordering, and fails with a sorted, readable message when the
    // sets differ.
    fn check_symbols_match_detects_mismatch() {
        // Arrange
        let reference = prefs_from(&[('A', 0.5), ('C', 0.3), ('G', 0.2)]);
        let alphabet = Alphabet::from_reference(&reference);
        let same_keys = prefs_from(&[('A', 0.2), ('C', 0.3), ('G', 0.5)]);
        let other_keys = prefs_from(&[('A', 0.5), ('C', 0.3), ('T', 0.2)]);

        // Act + Assert
        assert!(check_symbols_match(&same_keys, &alphabet).is_ok());
        match check_symbols_match(&other_keys, &alphabet) {
            Err(PrefsError::SymbolSetMismatch { expected, found }) => {
                assert_eq!(expected, "ACG");
                assert_eq!(found, "ACT");
            }
            other => panic!("expected SymbolSetMismatch, got {other:?}"),
        }
    }
}
