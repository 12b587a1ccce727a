//! Boundary-only conversion helpers for the Python bindings.
//!
//! Everything here is gated on the `python-bindings` feature and performs
//! no numerical work: dict/`Preferences` conversion and the duck-typed
//! wrapper that adapts a Python likelihood engine to the
//! [`LikelihoodEvaluator`] trait.
#[cfg(feature = "python-bindings")]
use std::collections::BTreeMap;

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    optimization::{
        errors::{OptError, OptResult},
        posterior_optimizer::traits::LikelihoodEvaluator,
    },
    preferences::prefs::Preferences,
};

/// Convert a Python preferences dict (single-character string keys) into
/// a validated [`Preferences`].
#[cfg(feature = "python-bindings")]
pub fn extract_preferences(raw: &BTreeMap<String, f64>) -> PyResult<Preferences> {
    let mut map: BTreeMap<char, f64> = BTreeMap::new();
    for (key, &value) in raw {
        let mut chars = key.chars();
        let symbol = match (chars.next(), chars.next()) {
            (Some(symbol), None) => symbol,
            _ => {
                return Err(PyValueError::new_err(format!(
                    "preference keys must be single characters, got '{key}'"
                )));
            }
        };
        map.insert(symbol, value);
    }
    Ok(Preferences::new(map)?)
}

/// Convert a [`Preferences`] into a Python-friendly dict keyed by
/// single-character strings.
#[cfg(feature = "python-bindings")]
pub fn prefs_to_dict(prefs: &Preferences) -> BTreeMap<String, f64> {
    prefs.iter().map(|(symbol, value)| (symbol.to_string(), value)).collect()
}

/// Duck-typed adapter from a Python likelihood engine to
/// [`LikelihoodEvaluator`].
///
/// The wrapped object must provide `n_sites()`, `get_preferences(site)`,
/// `set_preferences(prefs, site)`, and `log_likelihood()`. The site count
/// is read once at construction; the remaining methods are forwarded per
/// call, with Python exceptions surfaced as
/// [`OptError::EvaluatorFailure`]. The single-owner, non-concurrent-use
/// contract of the trait applies to the Python object as well.
#[cfg(feature = "python-bindings")]
pub struct PyEvaluator<'py> {
    obj: Bound<'py, PyAny>,
    n_sites: usize,
}

#[cfg(feature = "python-bindings")]
impl<'py> PyEvaluator<'py> {
    /// Wrap a Python evaluator object, reading its site count eagerly.
    pub fn new(obj: Bound<'py, PyAny>) -> PyResult<Self> {
        let n_sites: usize = obj.call_method0("n_sites")?.extract()?;
        Ok(PyEvaluator { obj, n_sites })
    }
}

#[cfg(feature = "python-bindings")]
impl LikelihoodEvaluator for PyEvaluator<'_> {
    fn n_sites(&self) -> usize {
        self.n_sites
    }

    fn site_preferences(&self, site: usize) -> OptResult<Preferences> {
        let raw: BTreeMap<String, f64> = self
            .obj
            .call_method1("get_preferences", (site,))
            .and_then(|value| value.extract())
            .map_err(evaluator_failure)?;
        extract_preferences(&raw).map_err(evaluator_failure)
    }

    fn set_site_preferences(&mut self, prefs: &Preferences, site: usize) -> OptResult<()> {
        self.obj
            .call_method1("set_preferences", (prefs_to_dict(prefs), site))
            .map(|_| ())
            .map_err(evaluator_failure)
    }

    fn log_likelihood(&self) -> OptResult<f64> {
        self.obj
            .call_method0("log_likelihood")
            .and_then(|value| value.extract())
            .map_err(evaluator_failure)
    }
}

#[cfg(feature = "python-bindings")]
fn evaluator_failure(err: PyErr) -> OptError {
    OptError::EvaluatorFailure { text: err.to_string() }
}
