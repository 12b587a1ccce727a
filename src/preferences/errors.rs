//! Errors for the preferences layer (distribution validation, codec
//! round-trips, and prior construction).
//!
//! This module defines [`PrefsError`], used by the alphabet, preference,
//! codec, and prior types. It implements `Display`/`Error` by hand and is
//! converted into the optimizer-level error surface via
//! `From<PrefsError> for OptError`.
//!
//! ## Conventions
//! - Symbols are reported by their `char` identity; vector slots by their
//!   0-based index in the codec vector.
//! - Variants in the "invalid input" sections describe caller mistakes;
//!   the "internal inconsistency" section describes postcondition
//!   violations that indicate a defect in the reparameterization itself,
//!   not caller misuse.

/// Result alias for preference-layer operations that may produce
/// [`PrefsError`].
pub type PrefsResult<T> = Result<T, PrefsError>;

/// Unified error type for preference distributions, the simplex codec, and
/// the Dirichlet prior.
#[derive(Debug, Clone, PartialEq)]
pub enum PrefsError {
    // ---- Distribution validation ----
    /// A preference set needs at least two symbols.
    TooFewSymbols { n_symbols: usize },

    /// A preference value is NaN or infinite.
    NonFinitePreference { symbol: char, value: f64 },

    /// A preference value is negative.
    NegativePreference { symbol: char, value: f64 },

    /// Preference values do not sum to one within tolerance.
    SumNotOne { sum: f64, tol: f64 },

    /// A distribution's symbol set differs from the expected alphabet.
    SymbolSetMismatch { expected: String, found: String },

    // ---- Configuration ----
    /// Tolerance must satisfy 0 < tol < 1e-4.
    InvalidTol { tol: f64, reason: &'static str },

    /// Concentration must be finite and > 1.
    InvalidConcentration { value: f64, reason: &'static str },

    /// Minimum value must satisfy 0 < minvalue < 1e-2.
    InvalidMinValue { value: f64, reason: &'static str },

    // ---- Codec vectors ----
    /// A codec vector has the wrong number of components.
    VectorLengthMismatch { expected: usize, found: usize },

    /// A codec vector component lies outside [0, 1] or is not finite.
    VectorComponentOutOfRange { index: usize, value: f64 },

    // ---- Internal inconsistency (decode postconditions) ----
    /// A decoded preference remained below the tolerance floor after the
    /// floor adjustment pass.
    FloorViolated { symbol: char, value: f64, tol: f64 },

    /// A decoded distribution's sum drifted away from one.
    SumDrifted { sum: f64, tol: f64 },
}

impl std::error::Error for PrefsError {}

#[cfg(feature = "python-bindings")]
impl From<PrefsError> for pyo3::PyErr {
    fn from(err: PrefsError) -> Self {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}

impl std::fmt::Display for PrefsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Distribution validation ----
            PrefsError::TooFewSymbols { n_symbols } => {
                write!(f, "Need at least two symbols, got {n_symbols}")
            }
            PrefsError::NonFinitePreference { symbol, value } => {
                write!(f, "Preference for '{symbol}' is not finite: {value}")
            }
            PrefsError::NegativePreference { symbol, value } => {
                write!(f, "Preference for '{symbol}' is negative: {value}")
            }
            PrefsError::SumNotOne { sum, tol } => {
                write!(f, "Preferences sum to {sum}, which is off from one by more than {tol}")
            }
            PrefsError::SymbolSetMismatch { expected, found } => {
                write!(f, "Symbol set mismatch: expected {{{expected}}}, found {{{found}}}")
            }

            // ---- Configuration ----
            PrefsError::InvalidTol { tol, reason } => {
                write!(f, "Invalid tolerance {tol}: {reason}")
            }
            PrefsError::InvalidConcentration { value, reason } => {
                write!(f, "Invalid concentration {value}: {reason}")
            }
            PrefsError::InvalidMinValue { value, reason } => {
                write!(f, "Invalid minimum value {value}: {reason}")
            }

            // ---- Codec vectors ----
            PrefsError::VectorLengthMismatch { expected, found } => {
                write!(f, "Vector length mismatch: expected {expected}, found {found}")
            }
            PrefsError::VectorComponentOutOfRange { index, value } => {
                write!(f, "Vector component at index {index} is outside [0, 1]: {value}")
            }

            // ---- Internal inconsistency ----
            PrefsError::FloorViolated { symbol, value, tol } => {
                write!(
                    f,
                    "Decoded preference for '{symbol}' is {value}, below the floor tol = {tol}"
                )
            }
            PrefsError::SumDrifted { sum, tol } => {
                write!(f, "Decoded preferences sum to {sum}, drifted from one by more than {tol}")
            }
        }
    }
}
