//! prefsopt — Bayesian per-site preference estimation.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the estimation core to Python via the `_prefsopt` extension
//! module. The crate estimates categorical "preference" distributions,
//! one per site, by maximizing a posterior that combines an externally
//! supplied likelihood with a Dirichlet prior centered on a prior
//! estimate.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`preferences` and `optimization`)
//!   as the public crate surface.
//! - Define `#[pyclass]` wrappers and the `#[pymodule]` initializer for
//!   the `_prefsopt` Python extension when the `python-bindings` feature
//!   is enabled.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work is implemented in the inner Rust modules; this
//!   file performs only FFI glue, input conversion, and error mapping.
//! - When `python-bindings` is enabled, the Python-visible types mirror
//!   the invariants and signatures of their Rust counterparts
//!   (e.g. `SimplexCodec`, `PrefsPrior`, `optimize_preferences`).
//! - On successful conversion from Python objects to Rust types, the
//!   invariants documented in the core modules are assumed to hold.
//!
//! Conventions
//! -----------
//! - Preference distributions cross the Python boundary as dicts keyed by
//!   single-character strings; codec vectors cross as plain float lists.
//! - The Python-side likelihood evaluator is duck-typed: any object with
//!   `n_sites()`, `get_preferences(site)`, `set_preferences(prefs, site)`,
//!   and `log_likelihood()` methods works.
//! - Errors from core Rust code are propagated as rich error types
//!   internally and converted to `ValueError` at the PyO3 boundary.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend directly on the inner modules (or
//!   their preludes) and can ignore the PyO3 items guarded by the
//!   `python-bindings` feature.
//! - External users are expected to interact with either the safe Rust
//!   APIs or the Python wrappers; the PyO3 plumbing is considered
//!   internal.
//!
//! Testing notes
//! -------------
//! - Core numerical behavior is covered by unit tests in the inner
//!   modules and by the integration suite in `tests/`.
//! - The PyO3 wrappers contain no logic beyond conversion and are
//!   expected to be smoke-tested from Python.

pub mod optimization;
pub mod preferences;
pub mod utils;

#[cfg(feature = "python-bindings")]
use std::collections::BTreeMap;

#[cfg(feature = "python-bindings")]
use ndarray::Array1;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    optimization::posterior_optimizer,
    preferences::{codec::SimplexCodec, prior::PrefsPrior},
    utils::{extract_preferences, prefs_to_dict, PyEvaluator},
};

/// SimplexCodec — Python-facing wrapper for the stick-breaking codec.
///
/// Purpose
/// -------
/// Expose [`SimplexCodec`] to Python callers: build from an initial
/// preferences dict (whose values fix the symbol order), then convert
/// dicts to vectors and back.
///
/// Parameters
/// ----------
/// Constructed from Python via `SimplexCodec(initial, tol=None)`:
/// - `initial`: dict mapping single-character strings to floats; values
///   must be non-negative and sum to one within the tolerance.
/// - `tol`: optional sum/floor tolerance in `(0, 1e-4)`; defaults to
///   `1e-6`.
///
/// Notes
/// -----
/// - Native Rust callers should use
///   [`preferences::codec::SimplexCodec`] directly; this type exists
///   solely for the PyO3 binding surface.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "SimplexCodec", module = "prefsopt")]
pub struct PySimplexCodec {
    /// Underlying Rust codec.
    inner: SimplexCodec,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PySimplexCodec {
    #[new]
    #[pyo3(signature = (initial, tol = None), text_signature = "(initial, /, tol=1e-6)")]
    pub fn new(initial: BTreeMap<String, f64>, tol: Option<f64>) -> PyResult<Self> {
        let initial = extract_preferences(&initial)?;
        let inner = match tol {
            Some(tol) => SimplexCodec::with_tol(&initial, tol)?,
            None => SimplexCodec::new(&initial)?,
        };
        Ok(PySimplexCodec { inner })
    }

    /// Convert a preferences dict to a stick-breaking vector.
    pub fn encode(&self, prefs: BTreeMap<String, f64>) -> PyResult<Vec<f64>> {
        let prefs = extract_preferences(&prefs)?;
        Ok(self.inner.encode(&prefs)?.to_vec())
    }

    /// Convert a stick-breaking vector back to a preferences dict. Every
    /// decoded value is at least the codec's tolerance.
    pub fn decode(&self, vec: Vec<f64>) -> PyResult<BTreeMap<String, f64>> {
        let prefs = self.inner.decode(&Array1::from(vec))?;
        Ok(prefs_to_dict(&prefs))
    }

    /// Symbols in the codec's fixed order (descending initial preference).
    #[getter]
    pub fn symbols(&self) -> Vec<String> {
        self.inner.alphabet().symbols().iter().map(|s| s.to_string()).collect()
    }

    /// The sum/floor tolerance.
    #[getter]
    pub fn tol(&self) -> f64 {
        self.inner.tol()
    }
}

/// PrefsPrior — Python-facing wrapper for the mode-matched Dirichlet
/// prior.
///
/// Purpose
/// -------
/// Expose [`PrefsPrior`] to Python callers: build from a peak dict, a
/// concentration `> 1`, and a floor `minvalue` in `(0, 1e-2)`, then
/// evaluate log-densities of candidate dicts.
///
/// Notes
/// -----
/// - Native Rust callers should use
///   [`preferences::prior::PrefsPrior`] directly; this type exists solely
///   for the PyO3 binding surface.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "PrefsPrior", module = "prefsopt")]
pub struct PyPrefsPrior {
    /// Underlying Rust prior.
    inner: PrefsPrior,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyPrefsPrior {
    #[new]
    #[pyo3(
        signature = (peak, concentration, minvalue, tol = None),
        text_signature = "(peak, concentration, minvalue, /, tol=1e-6)"
    )]
    pub fn new(
        peak: BTreeMap<String, f64>, concentration: f64, minvalue: f64, tol: Option<f64>,
    ) -> PyResult<Self> {
        let peak = extract_preferences(&peak)?;
        let inner = match tol {
            Some(tol) => PrefsPrior::with_tol(&peak, concentration, minvalue, tol)?,
            None => PrefsPrior::new(&peak, concentration, minvalue)?,
        };
        Ok(PyPrefsPrior { inner })
    }

    /// Dirichlet log-density of a preferences dict.
    pub fn log_density(&self, prefs: BTreeMap<String, f64>) -> PyResult<f64> {
        let prefs = extract_preferences(&prefs)?;
        Ok(self.inner.log_density(&prefs)?)
    }

    /// Concentration parameters in alphabet order, all greater than one.
    #[getter]
    pub fn concentration_params(&self) -> Vec<f64> {
        self.inner.concentration_params().to_vec()
    }

    /// Symbols in the prior's fixed order.
    #[getter]
    pub fn symbols(&self) -> Vec<String> {
        self.inner.alphabet().symbols().iter().map(|s| s.to_string()).collect()
    }
}

/// Optimize the preferences for one site from Python.
///
/// `evaluator` is any Python object with `n_sites()`,
/// `get_preferences(site)`, `set_preferences(prefs, site)`, and
/// `log_likelihood()` methods. Returns
/// `(optimized_prefs, status, converged)`; non-convergence is reported
/// through the flag, not an exception.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    name = "optimize_preferences",
    signature = (evaluator, prefs, site, concentration, minvalue = 1e-4,
                 use_likelihood = true, use_prior = true),
    text_signature = "(evaluator, prefs, site, concentration, /, minvalue=1e-4, \
                      use_likelihood=True, use_prior=True)"
)]
pub fn py_optimize_preferences<'py>(
    evaluator: &Bound<'py, PyAny>, prefs: BTreeMap<String, f64>, site: usize,
    concentration: f64, minvalue: f64, use_likelihood: bool, use_prior: bool,
) -> PyResult<(BTreeMap<String, f64>, String, bool)> {
    let initial = extract_preferences(&prefs)?;
    let mut py_evaluator = PyEvaluator::new(evaluator.clone())?;
    let outcome = posterior_optimizer::optimize_preferences(
        &mut py_evaluator,
        &initial,
        site,
        concentration,
        minvalue,
        use_likelihood,
        use_prior,
    )?;
    Ok((prefs_to_dict(&outcome.preferences), outcome.status, outcome.converged))
}

/// _prefsopt — PyO3 module initializer for the Python extension.
///
/// Registers the codec and prior wrappers plus the optimization entry
/// point on the `_prefsopt` module. Invoked automatically by Python when
/// importing the compiled extension; not called directly by user code.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _prefsopt<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    m.add_class::<PySimplexCodec>()?;
    m.add_class::<PyPrefsPrior>()?;
    m.add_function(wrap_pyfunction!(py_optimize_preferences, m)?)?;
    Ok(())
}
