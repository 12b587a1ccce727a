//! Validation helpers for posterior preference optimization.
//!
//! This module centralizes the consistency checks used across the
//! optimizer interface:
//!
//! - **Precondition checks**: [`check_mode_flags`],
//!   [`check_concentration`], [`check_initial_preferences`],
//!   [`check_site`], [`check_symbol_agreement`], [`check_minvalue`]
//!   validate every input of the high-level API before the external
//!   evaluator is mutated.
//! - **Tolerance checks**: [`verify_tol_grad`], [`verify_tol_cost`]
//!   ensure numeric tolerances are finite and strictly positive when
//!   provided.
//! - **Gradient validation**: [`validate_grad`] enforces correct
//!   dimension and finite entries.
//! - **Solver state**: [`validate_theta_hat`] and [`validate_value`]
//!   check the best vector and objective value before they are reported.
//!
//! These helpers standardize error reporting by returning domain-specific
//! [`OptError`] variants, making higher-level code more uniform.
use crate::{
    optimization::{
        errors::{OptError, OptResult},
        posterior_optimizer::types::{Grad, Theta},
    },
    preferences::{prefs::Preferences, prior::MAX_MINVALUE},
};

/// Tolerance on the initial distribution's sum. Looser than the codec's
/// own tolerance; the codec re-checks with the tighter window when the
/// initial vector is encoded.
pub const INITIAL_SUM_TOL: f64 = 1e-5;

/// At least one of the likelihood and prior terms must be enabled.
///
/// # Errors
/// Returns [`OptError::NoObjectiveTerms`] when both flags are `false`.
pub fn check_mode_flags(use_likelihood: bool, use_prior: bool) -> OptResult<()> {
    if !use_likelihood && !use_prior {
        return Err(OptError::NoObjectiveTerms);
    }
    Ok(())
}

/// Validate the prior concentration: finite and strictly greater than one.
///
/// # Errors
/// Returns [`OptError::InvalidConcentration`] otherwise.
pub fn check_concentration(concentration: f64) -> OptResult<()> {
    if !concentration.is_finite() {
        return Err(OptError::InvalidConcentration {
            value: concentration,
            reason: "Concentration must be finite.",
        });
    }
    if concentration <= 1.0 {
        return Err(OptError::InvalidConcentration {
            value: concentration,
            reason: "Concentration must be greater than one.",
        });
    }
    Ok(())
}

/// Validate the initial distribution: every value strictly positive and
/// the sum within [`INITIAL_SUM_TOL`] of one.
///
/// # Errors
/// - [`OptError::NonPositiveInitialPreference`] for a zero or negative
///   entry.
/// - [`OptError::InitialSumNotOne`] if the sum misses the window.
pub fn check_initial_preferences(initial: &Preferences) -> OptResult<()> {
    for (symbol, value) in initial.iter() {
        if value <= 0.0 {
            return Err(OptError::NonPositiveInitialPreference { symbol, value });
        }
    }
    let sum = initial.sum();
    if (sum - 1.0).abs() >= INITIAL_SUM_TOL {
        return Err(OptError::InitialSumNotOne { sum });
    }
    Ok(())
}

/// Validate a 1-based site index against the evaluator's site count.
///
/// # Errors
/// Returns [`OptError::SiteOutOfRange`] unless `1 <= site <= n_sites`.
pub fn check_site(site: usize, n_sites: usize) -> OptResult<()> {
    if site == 0 || site > n_sites {
        return Err(OptError::SiteOutOfRange { site, n_sites });
    }
    Ok(())
}

/// Validate that the initial distribution and the evaluator agree on the
/// alphabet for `site`.
///
/// # Errors
/// Returns [`OptError::EvaluatorSymbolMismatch`] if the symbol sets
/// differ.
pub fn check_symbol_agreement(
    initial: &Preferences, evaluator_prefs: &Preferences, site: usize,
) -> OptResult<()> {
    if !initial.same_symbols(evaluator_prefs) {
        return Err(OptError::EvaluatorSymbolMismatch { site });
    }
    Ok(())
}

/// Validate the bound floor: `0 < minvalue < 1e-2`.
///
/// # Errors
/// Returns [`OptError::InvalidMinValue`] otherwise.
pub fn check_minvalue(minvalue: f64) -> OptResult<()> {
    if !minvalue.is_finite() || minvalue <= 0.0 || minvalue >= MAX_MINVALUE {
        return Err(OptError::InvalidMinValue {
            value: minvalue,
            reason: "Minimum value must satisfy 0 < minvalue < 1e-2.",
        });
    }
    Ok(())
}

/// Validate the optional gradient-norm tolerance.
///
/// - Accepts `None` (no stopping rule on the gradient).
/// - If `Some`, the value must be **finite** and **strictly positive**.
///
/// # Errors
/// Returns [`OptError::InvalidTolGrad`] if the value is non-finite or
/// `<= 0.0`.
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Validate the optional cost-change tolerance (for convergence).
///
/// - Accepts `None` (no stopping rule on cost change).
/// - If `Some`, the value must be **finite** and **strictly positive**.
///
/// # Errors
/// Returns [`OptError::InvalidTolCost`] if the value is non-finite or
/// `<= 0.0`.
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Validate a gradient vector against dimension and finiteness.
///
/// Checks:
/// - `grad.len() == dim`
/// - every element is finite (`NaN` or `±∞` are rejected)
///
/// # Errors
/// - [`OptError::GradientDimMismatch`] if the length does not match `dim`.
/// - [`OptError::InvalidGradient`] with the index/value of the first
///   offending element.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidGradient {
                index,
                value,
                reason: "Gradient elements must be finite.",
            });
        }
    }
    Ok(())
}

/// Validate and unwrap the solver's best vector.
///
/// Accepts only a present vector with all **finite** entries.
///
/// # Returns
/// The owned [`Theta`] if valid.
///
/// # Errors
/// - [`OptError::MissingBestVector`] if no vector was produced.
/// - [`OptError::InvalidBestVector`] if any element is non-finite.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    match theta_hat {
        Some(theta) => {
            for (index, &value) in theta.iter().enumerate() {
                if !value.is_finite() {
                    return Err(OptError::InvalidBestVector {
                        index,
                        value,
                        reason: "Best-vector components must be finite.",
                    });
                }
            }
            Ok(theta)
        }
        None => Err(OptError::MissingBestVector),
    }
}

/// Validate that a scalar objective value is finite.
///
/// Negative values are fine as long as they are finite.
///
/// # Errors
/// Returns [`OptError::NonFiniteCost`] if the value is `NaN` or infinite.
pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}
