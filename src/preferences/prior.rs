//! prior — mode-matched Dirichlet priors over preferences.
//!
//! Purpose
//! -------
//! Define [`PrefsPrior`], a Dirichlet prior whose mode sits at a given
//! peak distribution, and evaluate its log-density for candidate
//! distributions during posterior optimization.
//!
//! Key behaviors
//! -------------
//! - Derive concentration parameters from a peak distribution, a scalar
//!   concentration `C > 1`, and a floor `minvalue`:
//!   `alpha_i = (C - 1) * n * max(minvalue, peak_i) + 1`.
//! - Evaluate the Dirichlet log-density in the reduced parameterization:
//!   the first n-1 components are taken from the argument and the last is
//!   reconstructed as one minus their sum, consistent with how the density
//!   is normalized.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every `alpha_i > 1` (since `C > 1` and `max(minvalue, peak_i) > 0`),
//!   so the Dirichlet mode exists and equals the floor-adjusted peak:
//!   `mode_i = (alpha_i - 1) / (sum(alpha) - n)`.
//! - The alphabet and concentration parameters are fixed at construction
//!   and never mutated.
//!
//! Conventions
//! -----------
//! - Parameters are laid out in alphabet order (descending peak value,
//!   ties to the larger symbol), the same order the codec uses.
//! - A candidate with a zero component evaluates to negative infinity
//!   rather than an error; in the optimization flow the codec's floor
//!   keeps candidates strictly inside the support.
use ndarray::Array1;
use statrs::function::gamma::ln_gamma;

use crate::preferences::{
    alphabet::Alphabet,
    errors::{PrefsError, PrefsResult},
    prefs::Preferences,
    validation::{check_sums_to_one, check_symbols_match, check_tol},
};

/// Upper bound on `minvalue`; floors at or above this would distort the
/// peak rather than regularize it.
pub const MAX_MINVALUE: f64 = 1e-2;

/// A Dirichlet prior peaked at a reference distribution.
///
/// Larger concentrations tighten the prior around its mode; the floor
/// keeps every concentration parameter strictly above one even for peak
/// entries of zero.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefsPrior {
    alphabet: Alphabet,
    alpha: Array1<f64>,
    tol: f64,
}

impl PrefsPrior {
    /// Build a prior with the default tolerance
    /// ([`Preferences::DEFAULT_TOL`]).
    pub fn new(peak: &Preferences, concentration: f64, minvalue: f64) -> PrefsResult<Self> {
        Self::with_tol(peak, concentration, minvalue, Preferences::DEFAULT_TOL)
    }

    /// Build a prior with an explicit tolerance (`0 < tol < 1e-4`).
    ///
    /// # Errors
    /// - [`PrefsError::InvalidConcentration`] unless `concentration` is
    ///   finite and `> 1`.
    /// - [`PrefsError::InvalidMinValue`] unless `0 < minvalue < 1e-2`.
    /// - [`PrefsError::InvalidTol`] for an out-of-window tolerance.
    pub fn with_tol(
        peak: &Preferences, concentration: f64, minvalue: f64, tol: f64,
    ) -> PrefsResult<Self> {
        check_tol(tol)?;
        if !concentration.is_finite() {
            return Err(PrefsError::InvalidConcentration {
                value: concentration,
                reason: "Concentration must be finite.",
            });
        }
        if concentration <= 1.0 {
            return Err(PrefsError::InvalidConcentration {
                value: concentration,
                reason: "Concentration must be greater than one.",
            });
        }
        if !minvalue.is_finite() || minvalue <= 0.0 || minvalue >= MAX_MINVALUE {
            return Err(PrefsError::InvalidMinValue {
                value: minvalue,
                reason: "Minimum value must satisfy 0 < minvalue < 1e-2.",
            });
        }
        check_sums_to_one(peak.iter().map(|(_, value)| value), tol)?;

        let alphabet = Alphabet::from_reference(peak);
        let n = alphabet.len() as f64;
        let alpha = Array1::from_iter(alphabet.symbols().iter().map(|&symbol| {
            let peak_value = peak.get(symbol).expect("alphabet derived from peak");
            (concentration - 1.0) * n * minvalue.max(peak_value) + 1.0
        }));
        Ok(PrefsPrior { alphabet, alpha, tol })
    }

    /// The prior's fixed symbol order.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Dirichlet concentration parameters, one per symbol in alphabet
    /// order. All strictly greater than one.
    pub fn concentration_params(&self) -> &Array1<f64> {
        &self.alpha
    }

    /// The prior's mode in alphabet order: the floor-adjusted,
    /// renormalized peak distribution.
    pub fn mode(&self) -> Array1<f64> {
        let alpha_sum: f64 = self.alpha.sum();
        let denom = alpha_sum - self.alphabet.len() as f64;
        self.alpha.mapv(|a| (a - 1.0) / denom)
    }

    /// Dirichlet log-density of `prefs`.
    ///
    /// Uses the first n-1 components in alphabet order; the last is
    /// reconstructed as one minus their sum. Returns negative infinity for
    /// candidates on the support boundary (a zero component).
    ///
    /// # Errors
    /// - [`PrefsError::SymbolSetMismatch`] if `prefs` is not keyed by this
    ///   prior's alphabet.
    /// - [`PrefsError::SumNotOne`] if `prefs` misses this prior's
    ///   tolerance.
    pub fn log_density(&self, prefs: &Preferences) -> PrefsResult<f64> {
        check_symbols_match(prefs, &self.alphabet)?;
        check_sums_to_one(prefs.iter().map(|(_, value)| value), self.tol)?;

        let symbols = self.alphabet.symbols();
        let n = symbols.len();
        // log normalizer: ln Gamma(sum alpha) - sum ln Gamma(alpha_i)
        let mut log_density = ln_gamma(self.alpha.sum());
        for &a in self.alpha.iter() {
            log_density -= ln_gamma(a);
        }
        let mut head_sum = 0.0;
        for (i, &symbol) in symbols[..n - 1].iter().enumerate() {
            let value = prefs.get(symbol).expect("symbol membership checked above");
            log_density += (self.alpha[i] - 1.0) * value.ln();
            head_sum += value;
        }
        let last = 1.0 - head_sum;
        log_density += (self.alpha[n - 1] - 1.0) * last.ln();
        Ok(log_density)
    }
}
