//! Public API surface for posterior preference optimization.
//!
//! - [`LikelihoodEvaluator`]: trait the external likelihood engine
//!   implements.
//! - [`PosteriorOptions`] and [`Tolerances`]: configuration for the
//!   solver.
//! - [`SolverReport`]: normalized vector-space result from the runner.
//! - [`PosteriorOutcome`]: decoded result returned by the high-level API.
//!
//! Convention: the optimizer *maximizes* a log posterior by minimizing the
//! cost `c(x) = -(log likelihood + log prior)` (or the enabled subset);
//! `value` fields are always expressed in log-posterior space.
use argmin::core::{TerminationReason, TerminationStatus};
use argmin_math::ArgminL2Norm;

use crate::{
    optimization::{
        errors::{OptError, OptResult},
        posterior_optimizer::{
            types::{FnEvalMap, Grad, Theta},
            validation::{validate_theta_hat, validate_value, verify_tol_cost, verify_tol_grad},
        },
    },
    preferences::prefs::Preferences,
};

/// External likelihood engine interface, consumed but never implemented by
/// this crate.
///
/// The evaluator is a shared, mutable resource with read-after-write
/// semantics: every objective evaluation first pushes a candidate
/// distribution ([`set_site_preferences`](Self::set_site_preferences)) and
/// then reads the resulting likelihood
/// ([`log_likelihood`](Self::log_likelihood)). Because of this, at most
/// one optimization run may be active against a given evaluator instance
/// at a time; concurrent runs sharing one instance would race on its
/// internal state. Give each concurrent optimization its own evaluator, or
/// serialize access externally.
///
/// Sites are 1-based: valid indices are `1..=n_sites()`.
pub trait LikelihoodEvaluator {
    /// Number of sites the evaluator holds state for.
    fn n_sites(&self) -> usize;

    /// Current preferences for `site`. Used only to validate alphabet
    /// agreement before optimizing.
    fn site_preferences(&self, site: usize) -> OptResult<Preferences>;

    /// Replace the evaluator-held preferences for `site`.
    fn set_site_preferences(&mut self, prefs: &Preferences, site: usize) -> OptResult<()>;

    /// Log-likelihood reflecting the most recently set preferences.
    fn log_likelihood(&self) -> OptResult<f64>;
}

/// Numerical tolerances and iteration limits used by the solver.
///
/// - `tol_grad`: terminate when the projected-gradient norm falls below
///   this threshold.
/// - `tol_cost`: terminate when the change in cost falls below this
///   threshold.
/// - `max_iter`: hard cap on the number of iterations.
///
/// Any field can be `None` but **at least one** of the three must be
/// provided (see [`Tolerances::new`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Rules
    /// - At least one of `tol_grad`, `tol_cost`, or `max_iter` must be
    ///   `Some`.
    /// - If provided, tolerances must be **finite and strictly positive**.
    /// - If provided, `max_iter` must be `> 0`.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for
    ///   non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_grad(tol_grad)?;
        verify_tol_cost(tol_cost)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(OptError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Solver-level configuration.
///
/// Fields:
/// - `tols: Tolerances` — numerical tolerances and iteration limits.
/// - `verbose: bool` — if `true`, attaches an observer (behind the
///   `obs_slog` feature) and prints progress.
/// - `init_step: Option<f64>` — initial backtracking step length; `None`
///   uses the solver default of 1.0.
///
/// Default:
/// - `tols`: `tol_grad = 1e-6`, `tol_cost = None`, `max_iter = 500`
/// - `verbose`: `false`
/// - `init_step`: `None`
#[derive(Debug, Clone, PartialEq)]
pub struct PosteriorOptions {
    pub tols: Tolerances,
    pub verbose: bool,
    pub init_step: Option<f64>,
}

impl PosteriorOptions {
    /// Create a new set of solver options.
    ///
    /// Numeric validation of `tols` is performed inside
    /// [`Tolerances::new`]; this constructor only checks `init_step`.
    pub fn new(tols: Tolerances, verbose: bool, init_step: Option<f64>) -> OptResult<Self> {
        if let Some(step) = init_step {
            if !step.is_finite() || step <= 0.0 {
                return Err(OptError::InvalidInitStep {
                    step,
                    reason: "Initial step must be finite and positive.",
                });
            }
        }
        Ok(Self { tols, verbose, init_step })
    }
}

impl Default for PosteriorOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances::new(Some(1e-6), None, Some(500)).unwrap(),
            verbose: false,
            init_step: None,
        }
    }
}

/// Vector-space result produced by the runner, before decoding.
///
/// - `theta_hat`: best codec vector found.
/// - `value`: best **log posterior** value (not the cost).
/// - `converged`: `true` only for a genuine stationarity stop
///   (`SolverConverged` / `TargetCostReached`); an iteration-cap stop
///   reports `false` with the status naming the reason, so callers can
///   decide whether to accept, retry from a perturbed start, or reject.
/// - `status`: human-readable termination status string.
/// - `iterations`: number of solver iterations performed.
/// - `fn_evals`: function-evaluation counters reported by the backend
///   (keys follow its counters, e.g. `cost_count`, `gradient_count`).
/// - `grad_norm`: norm of the last available gradient, if present.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverReport {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl SolverReport {
    /// Build a validated [`SolverReport`] from raw solver state.
    ///
    /// Performs:
    /// - `theta_hat` check via `validate_theta_hat` (present and finite).
    /// - `value` check via `validate_value` (finite).
    /// - Maps `TerminationStatus` into `(converged, status)`.
    /// - Computes `grad_norm` if a gradient was available.
    ///
    /// # Errors
    /// Propagates any validation errors for `theta_hat` or `value`.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, termination: TerminationStatus,
        iterations: u64, fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let (converged, status) = match &termination {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            TerminationStatus::Terminated(reason) => {
                let converged = matches!(
                    reason,
                    TerminationReason::SolverConverged | TerminationReason::TargetCostReached
                );
                (converged, format!("{reason:?}"))
            }
        };
        let iterations = iterations as usize;
        let grad_norm = grad.map(|g| g.l2_norm());
        Ok(Self { theta_hat, value, converged, status, iterations, fn_evals, grad_norm })
    }
}

/// Final result of a posterior preference optimization.
///
/// - `preferences`: the optimized distribution, decoded from the best
///   vector and floor-adjusted by the codec.
/// - `status` / `converged`: solver diagnostics; non-convergence is not an
///   error, just `converged = false`.
/// - `value`, `iterations`, `fn_evals`, `grad_norm`: diagnostics carried
///   over from the underlying [`SolverReport`].
#[derive(Debug, Clone, PartialEq)]
pub struct PosteriorOutcome {
    pub preferences: Preferences,
    pub status: String,
    pub converged: bool,
    pub value: f64,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl PosteriorOutcome {
    /// Pair a decoded distribution with its solver diagnostics.
    pub fn from_report(preferences: Preferences, report: SolverReport) -> Self {
        Self {
            preferences,
            status: report.status,
            converged: report.converged,
            value: report.value,
            iterations: report.iterations,
            fn_evals: report.fn_evals,
            grad_norm: report.grad_norm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Tolerance and option validation windows.
    // - Termination-status mapping in `SolverReport::new`.
    //
    // They intentionally DO NOT cover:
    // - End-to-end solver behavior, exercised in the runner and in the
    //   integration suite.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // At least one stopping rule must be present; provided values must be
    // finite and positive.
    fn tolerances_require_at_least_one_rule() {
        assert!(matches!(Tolerances::new(None, None, None), Err(OptError::NoTolerancesProvided)));
        assert!(matches!(
            Tolerances::new(Some(-1e-6), None, None),
            Err(OptError::InvalidTolGrad { .. })
        ));
        assert!(matches!(
            Tolerances::new(None, Some(f64::NAN), None),
            Err(OptError::InvalidTolCost { .. })
        ));
        assert!(matches!(
            Tolerances::new(None, None, Some(0)),
            Err(OptError::InvalidMaxIter { .. })
        ));
        assert!(Tolerances::new(Some(1e-6), None, Some(100)).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Options validate the initial step and default to a sensible
    // configuration.
    fn options_validate_init_step() {
        // Arrange
        let tols = Tolerances::new(Some(1e-6), None, Some(100)).unwrap();

        // Act + Assert
        assert!(PosteriorOptions::new(tols, false, Some(0.5)).is_ok());
        assert!(matches!(
            PosteriorOptions::new(tols, false, Some(0.0)),
            Err(OptError::InvalidInitStep { .. })
        ));
        let defaults = PosteriorOptions::default();
        assert_eq!(defaults.tols.tol_grad, Some(1e-6));
        assert_eq!(defaults.tols.max_iter, Some(500));
        assert!(!defaults.verbose);
    }

    #[test]
    // Purpose
    // -------
    // A SolverConverged stop maps to `converged = true`; an iteration-cap
    // stop keeps the status string but reports `converged = false`.
    fn solver_report_maps_termination_statuses() {
        // Arrange
        let theta = array![0.4, 0.5, 0.6];

        // Act
        let converged = SolverReport::new(
            Some(theta.clone()),
            -1.25,
            TerminationStatus::Terminated(TerminationReason::SolverConverged),
            7,
            FnEvalMap::new(),
            None,
        )
        .expect("report should build");
        let capped = SolverReport::new(
            Some(theta),
            -1.25,
            TerminationStatus::Terminated(TerminationReason::MaxItersReached),
            500,
            FnEvalMap::new(),
            None,
        )
        .expect("report should build");

        // Assert
        assert!(converged.converged);
        assert!(!capped.converged);
        assert!(capped.status.contains("MaxItersReached"));
    }

    #[test]
    // Purpose
    // -------
    // Missing or non-finite best vectors are rejected when building a
    // report.
    fn solver_report_rejects_invalid_state() {
        assert!(matches!(
            SolverReport::new(
                None,
                0.0,
                TerminationStatus::NotTerminated,
                0,
                FnEvalMap::new(),
                None
            ),
            Err(OptError::MissingBestVector)
        ));
        assert!(matches!(
            SolverReport::new(
                Some(array![0.5, f64::NAN]),
                0.0,
                TerminationStatus::NotTerminated,
                0,
                FnEvalMap::new(),
                None
            ),
            Err(OptError::InvalidBestVector { index: 1, .. })
        ));
    }
}
