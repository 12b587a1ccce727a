use argmin::core::{ArgminError, Error};

use crate::preferences::errors::PrefsError;

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Preference validation (flattened from PrefsError) ----
    /// A preference set needs at least two symbols.
    TooFewSymbols {
        n_symbols: usize,
    },

    /// A preference value is NaN or infinite.
    NonFinitePreference {
        symbol: char,
        value: f64,
    },

    /// A preference value is negative.
    NegativePreference {
        symbol: char,
        value: f64,
    },

    /// Preference values do not sum to one within tolerance.
    PrefsSumNotOne {
        sum: f64,
        tol: f64,
    },

    /// A distribution's symbol set differs from the expected alphabet.
    SymbolSetMismatch {
        expected: String,
        found: String,
    },

    /// Tolerance must satisfy 0 < tol < 1e-4.
    InvalidTol {
        tol: f64,
        reason: &'static str,
    },

    /// Concentration must be finite and > 1.
    InvalidConcentration {
        value: f64,
        reason: &'static str,
    },

    /// Minimum value must satisfy 0 < minvalue < 1e-2.
    InvalidMinValue {
        value: f64,
        reason: &'static str,
    },

    /// A codec vector has the wrong number of components.
    VectorLengthMismatch {
        expected: usize,
        found: usize,
    },

    /// A codec vector component lies outside [0, 1] or is not finite.
    VectorComponentOutOfRange {
        index: usize,
        value: f64,
    },

    // ---- Optimizer input validation ----
    /// Initial preferences must be strictly positive everywhere.
    NonPositiveInitialPreference {
        symbol: char,
        value: f64,
    },

    /// Initial preferences must sum to one within 1e-5.
    InitialSumNotOne {
        sum: f64,
    },

    /// The requested site is not a valid index for the evaluator.
    SiteOutOfRange {
        site: usize,
        n_sites: usize,
    },

    /// The evaluator's alphabet for the site differs from the initial
    /// distribution's symbol set.
    EvaluatorSymbolMismatch {
        site: usize,
    },

    /// At least one of the likelihood and prior terms must be enabled.
    NoObjectiveTerms,

    // ---- Options ----
    /// Gradient tolerance needs to be positive and finite.
    InvalidTolGrad {
        tol: f64,
        reason: &'static str,
    },

    /// Cost change tolerance needs to be positive and finite.
    InvalidTolCost {
        tol: f64,
        reason: &'static str,
    },

    /// Maximum iterations needs to be positive.
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },

    /// At least one tolerance must be provided.
    NoTolerancesProvided,

    /// Initial step length needs to be positive and finite.
    InvalidInitStep {
        step: f64,
        reason: &'static str,
    },

    /// Box bounds need finite lower < upper.
    InvalidBounds {
        lower: f64,
        upper: f64,
        reason: &'static str,
    },

    // ---- Objective domain ----
    /// The solver probed a vector component outside the open (0, 1)
    /// support; the run is aborted rather than retried.
    VectorOutsideSupport {
        index: usize,
        value: f64,
    },

    /// A decoded preference fell outside the open (0, 1) support during
    /// the search.
    PrefsOutsideSupport {
        symbol: char,
        value: f64,
    },

    // ---- Evaluator ----
    /// The external likelihood evaluator failed.
    EvaluatorFailure {
        text: String,
    },

    // ---- Gradient / finite differences ----
    /// Gradient dimensions do not match parameter dimensions.
    GradientDimMismatch {
        expected: usize,
        found: usize,
    },

    /// Gradient elements need to be finite.
    InvalidGradient {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    // ---- Cost function / outcome ----
    /// Cost function returned a non-finite value.
    NonFiniteCost {
        value: f64,
    },

    /// The solver produced no best vector.
    MissingBestVector,

    /// Best-vector components need to be finite.
    InvalidBestVector {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    // ---- Post-optimization invariants ----
    /// A decoded preference remained below the tolerance floor after the
    /// floor adjustment pass.
    FloorViolated {
        symbol: char,
        value: f64,
        tol: f64,
    },

    /// A decoded distribution's sum drifted away from one.
    SumDrifted {
        sum: f64,
        tol: f64,
    },

    /// The optimized distribution violated the loose postconditions.
    InconsistentResult {
        reason: &'static str,
        value: f64,
    },

    // ---- Argmin ----
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter {
        text: String,
    },
    /// Wrapper for argmin::NotImplemented
    NotImplemented {
        text: String,
    },
    /// Wrapper for argmin::NotInitialized
    NotInitialized {
        text: String,
    },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated {
        text: String,
    },
    /// Wrapper for argmin::CheckPointNotFound
    CheckPointNotFound {
        text: String,
    },
    /// Wrapper for argmin::PotentialBug
    PotentialBug {
        text: String,
    },
    /// Wrapper for argmin::ImpossibleError
    ImpossibleError {
        text: String,
    },
    /// Wrapper for other argmin::Error types
    BackendError {
        text: String,
    },

    // ---- Fallback ----
    UnknownError,
}

impl std::error::Error for OptError {}

#[cfg(feature = "python-bindings")]
impl From<OptError> for pyo3::PyErr {
    fn from(err: OptError) -> Self {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Preference validation ----
            OptError::TooFewSymbols { n_symbols } => {
                write!(f, "Need at least two symbols, got {n_symbols}")
            }
            OptError::NonFinitePreference { symbol, value } => {
                write!(f, "Preference for '{symbol}' is not finite: {value}")
            }
            OptError::NegativePreference { symbol, value } => {
                write!(f, "Preference for '{symbol}' is negative: {value}")
            }
            OptError::PrefsSumNotOne { sum, tol } => {
                write!(f, "Preferences sum to {sum}, which is off from one by more than {tol}")
            }
            OptError::SymbolSetMismatch { expected, found } => {
                write!(f, "Symbol set mismatch: expected {{{expected}}}, found {{{found}}}")
            }
            OptError::InvalidTol { tol, reason } => {
                write!(f, "Invalid tolerance {tol}: {reason}")
            }
            OptError::InvalidConcentration { value, reason } => {
                write!(f, "Invalid concentration {value}: {reason}")
            }
            OptError::InvalidMinValue { value, reason } => {
                write!(f, "Invalid minimum value {value}: {reason}")
            }
            OptError::VectorLengthMismatch { expected, found } => {
                write!(f, "Vector length mismatch: expected {expected}, found {found}")
            }
            OptError::VectorComponentOutOfRange { index, value } => {
                write!(f, "Vector component at index {index} is outside [0, 1]: {value}")
            }

            // ---- Optimizer input validation ----
            OptError::NonPositiveInitialPreference { symbol, value } => {
                write!(f, "Initial preference for '{symbol}' must be > 0, got {value}")
            }
            OptError::InitialSumNotOne { sum } => {
                write!(f, "Initial preferences sum to {sum}, must be within 1e-5 of one")
            }
            OptError::SiteOutOfRange { site, n_sites } => {
                write!(f, "Site {site} is outside the evaluator's range 1..={n_sites}")
            }
            OptError::EvaluatorSymbolMismatch { site } => {
                write!(
                    f,
                    "Initial preferences and the evaluator disagree on the alphabet for site {site}"
                )
            }
            OptError::NoObjectiveTerms => {
                write!(f, "At least one of the likelihood and prior terms must be enabled")
            }

            // ---- Options ----
            OptError::InvalidTolGrad { tol, reason } => {
                write!(f, "Invalid gradient tolerance {tol}: {reason}")
            }
            OptError::InvalidTolCost { tol, reason } => {
                write!(f, "Invalid cost change tolerance {tol}: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            OptError::NoTolerancesProvided => {
                write!(f, "No tolerances provided")
            }
            OptError::InvalidInitStep { step, reason } => {
                write!(f, "Invalid initial step {step}: {reason}")
            }
            OptError::InvalidBounds { lower, upper, reason } => {
                write!(f, "Invalid bounds [{lower}, {upper}]: {reason}")
            }

            // ---- Objective domain ----
            OptError::VectorOutsideSupport { index, value } => {
                write!(f, "Objective called outside support: component {index} is {value}")
            }
            OptError::PrefsOutsideSupport { symbol, value } => {
                write!(f, "Decoded preference for '{symbol}' is outside (0, 1): {value}")
            }

            // ---- Evaluator ----
            OptError::EvaluatorFailure { text } => {
                write!(f, "Likelihood evaluator failed: {text}")
            }

            // ---- Gradient / finite differences ----
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }

            // ---- Cost function / outcome ----
            OptError::NonFiniteCost { value } => {
                write!(f, "Non-finite cost value: {value}")
            }
            OptError::MissingBestVector => {
                write!(f, "Missing best parameter vector")
            }
            OptError::InvalidBestVector { index, value, reason } => {
                write!(f, "Invalid best vector at index {index}: {value}: {reason}")
            }

            // ---- Post-optimization invariants ----
            OptError::FloorViolated { symbol, value, tol } => {
                write!(
                    f,
                    "Decoded preference for '{symbol}' is {value}, below the floor tol = {tol}"
                )
            }
            OptError::SumDrifted { sum, tol } => {
                write!(f, "Decoded preferences sum to {sum}, drifted from one by more than {tol}")
            }
            OptError::InconsistentResult { reason, value } => {
                write!(f, "Optimized preferences are inconsistent ({value}): {reason}")
            }

            // ---- Argmin ----
            OptError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            OptError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            OptError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            OptError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            OptError::CheckPointNotFound { text } => {
                write!(f, "Checkpoint not found: {text}")
            }
            OptError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            OptError::ImpossibleError { text } => {
                write!(f, "Impossible error: {text}")
            }
            OptError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- Fallback ----
            OptError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        // Objective failures raised by this crate travel through argmin as
        // boxed errors; recover them typed before falling back to the
        // backend variants.
        match original_err.downcast::<OptError>() {
            Ok(opt_err) => opt_err,
            Err(other) => match other.downcast::<ArgminError>() {
                Ok(argmin_err) => match argmin_err {
                    ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                    ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                    ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                    ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                    ArgminError::CheckpointNotFound { text } => {
                        OptError::CheckPointNotFound { text }
                    }
                    ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                    ArgminError::ImpossibleError { text } => OptError::ImpossibleError { text },
                    _ => OptError::UnknownError,
                },
                Err(err) => OptError::BackendError { text: err.to_string() },
            },
        }
    }
}

impl From<PrefsError> for OptError {
    fn from(err: PrefsError) -> Self {
        match err {
            PrefsError::TooFewSymbols { n_symbols } => OptError::TooFewSymbols { n_symbols },
            PrefsError::NonFinitePreference { symbol, value } => {
                OptError::NonFinitePreference { symbol, value }
            }
            PrefsError::NegativePreference { symbol, value } => {
                OptError::NegativePreference { symbol, value }
            }
            PrefsError::SumNotOne { sum, tol } => OptError::PrefsSumNotOne { sum, tol },
            PrefsError::SymbolSetMismatch { expected, found } => {
                OptError::SymbolSetMismatch { expected, found }
            }
            PrefsError::InvalidTol { tol, reason } => OptError::InvalidTol { tol, reason },
            PrefsError::InvalidConcentration { value, reason } => {
                OptError::InvalidConcentration { value, reason }
            }
            PrefsError::InvalidMinValue { value, reason } => {
                OptError::InvalidMinValue { value, reason }
            }
            PrefsError::VectorLengthMismatch { expected, found } => {
                OptError::VectorLengthMismatch { expected, found }
            }
            PrefsError::VectorComponentOutOfRange { index, value } => {
                OptError::VectorComponentOutOfRange { index, value }
            }
            PrefsError::FloorViolated { symbol, value, tol } => {
                OptError::FloorViolated { symbol, value, tol }
            }
            PrefsError::SumDrifted { sum, tol } => OptError::SumDrifted { sum, tol },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Variant-preserving conversion from PrefsError.
    // - Typed recovery of OptError values that round-trip through the
    //   backend error type.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Conversions from the preferences layer keep the variant identity and
    // payload.
    fn prefs_errors_flatten_with_payload() {
        // Arrange
        let err = PrefsError::FloorViolated { symbol: 'T', value: 1e-8, tol: 1e-6 };

        // Act
        let converted = OptError::from(err);

        // Assert
        assert_eq!(converted, OptError::FloorViolated { symbol: 'T', value: 1e-8, tol: 1e-6 });
    }

    #[test]
    // Purpose
    // -------
    // An OptError boxed into the backend error type is recovered typed,
    // not stringified into BackendError.
    fn opt_errors_round_trip_through_backend() {
        // Arrange
        let original = OptError::VectorOutsideSupport { index: 2, value: 1.5 };
        let boxed: Error = original.clone().into();

        // Act
        let recovered = OptError::from(boxed);

        // Assert
        assert_eq!(recovered, original);
    }
}
