//! High-level entry point for posterior preference optimization.
//!
//! This validates every input before the external evaluator is mutated,
//! builds the simplex codec and the Dirichlet prior from the initial
//! distribution, wraps everything in a [`PosteriorAdapter`] (which
//! *minimizes* the negative log posterior), and delegates the run to
//! [`run_solver`].
use crate::{
    optimization::{
        errors::{OptError, OptResult},
        posterior_optimizer::{
            adapter::PosteriorAdapter,
            run::run_solver,
            solver::ProjectedGradient,
            traits::{LikelihoodEvaluator, PosteriorOptions, PosteriorOutcome},
            types::BoxBounds,
            validation::{
                check_concentration, check_initial_preferences, check_minvalue, check_mode_flags,
                check_site, check_symbol_agreement,
            },
        },
    },
    preferences::{codec::SimplexCodec, prefs::Preferences, prior::PrefsPrior},
};

/// Loose tolerance for the post-optimization sum re-check. The codec has
/// already enforced its own tighter window inside `decode`.
const LOOSE_SUM_TOL: f64 = 1e-3;

/// Default bound floor for [`optimize_preferences`].
pub const DEFAULT_MINVALUE: f64 = 1e-4;

/// Optimize the preferences for one site with default solver options.
///
/// Maximizes the posterior combining the evaluator's log-likelihood with a
/// Dirichlet prior peaked at `initial` (concentration `concentration`,
/// floor `minvalue`). `use_likelihood` / `use_prior` select the objective
/// terms; disabling both is invalid. See
/// [`optimize_preferences_with`] for the full behavior.
pub fn optimize_preferences<E: LikelihoodEvaluator>(
    evaluator: &mut E, initial: &Preferences, site: usize, concentration: f64, minvalue: f64,
    use_likelihood: bool, use_prior: bool,
) -> OptResult<PosteriorOutcome> {
    optimize_preferences_with(
        evaluator,
        initial,
        site,
        concentration,
        minvalue,
        use_likelihood,
        use_prior,
        &PosteriorOptions::default(),
    )
}

/// Optimize the preferences for one site.
///
/// # Behavior
/// - Validates all inputs up front: mode flags, concentration, strict
///   positivity and normalization of `initial` (sum within `1e-5`), the
///   1-based `site` index, alphabet agreement with the evaluator, and the
///   `minvalue` window. All failures happen before any mutating call to
///   the evaluator; the only evaluator interaction during validation is
///   the read-only [`LikelihoodEvaluator::site_preferences`] lookup.
/// - Builds a [`SimplexCodec`] and a [`PrefsPrior`] from `initial`,
///   encodes the initial vector, and bounds every coordinate to
///   `[minvalue, 1 - minvalue]`.
/// - Runs the projected-gradient solver; each objective evaluation decodes
///   the trial vector, optionally pushes the candidate to the evaluator
///   and reads its log-likelihood, and optionally adds the prior's
///   log-density. The solver is not retried and no alternative starting
///   points are tried by this layer.
/// - Decodes the best vector, re-checks non-negativity and a loose sum
///   window, and returns the outcome.
///
/// Non-convergence is not an error: the outcome carries
/// `converged = false` and the solver's status message, and the caller
/// decides whether to retry from a perturbed start, accept, or reject.
///
/// # Errors
/// - Invalid-input variants for any failed precondition.
/// - [`OptError::VectorOutsideSupport`] / [`OptError::PrefsOutsideSupport`]
///   if the solver probes outside the open support (a hard abort).
/// - [`OptError::EvaluatorFailure`] if the evaluator fails mid-run.
/// - [`OptError::InconsistentResult`] (and the decode postcondition
///   variants) if the optimized distribution violates its invariants
///   despite valid inputs.
#[allow(clippy::too_many_arguments)]
pub fn optimize_preferences_with<E: LikelihoodEvaluator>(
    evaluator: &mut E, initial: &Preferences, site: usize, concentration: f64, minvalue: f64,
    use_likelihood: bool, use_prior: bool, opts: &PosteriorOptions,
) -> OptResult<PosteriorOutcome> {
    check_mode_flags(use_likelihood, use_prior)?;
    check_concentration(concentration)?;
    check_initial_preferences(initial)?;
    check_site(site, evaluator.n_sites())?;
    let evaluator_prefs = evaluator.site_preferences(site)?;
    check_symbol_agreement(initial, &evaluator_prefs, site)?;
    check_minvalue(minvalue)?;

    let codec = SimplexCodec::new(initial).map_err(OptError::from)?;
    let theta0 = codec.encode(initial).map_err(OptError::from)?;
    let bounds = BoxBounds::from_minvalue(minvalue)?;
    let prior = PrefsPrior::new(initial, concentration, minvalue).map_err(OptError::from)?;

    let solver = ProjectedGradient::new(bounds, opts)?;
    let problem = PosteriorAdapter::new(&codec, &prior, evaluator, site, use_likelihood, use_prior);
    let report = run_solver(theta0, opts, problem, solver)?;

    let optimized = codec.decode(&report.theta_hat).map_err(OptError::from)?;
    check_optimized_preferences(&optimized)?;
    Ok(PosteriorOutcome::from_report(optimized, report))
}

/// Loose re-check of the optimized distribution: non-negative values and a
/// sum close to one. Tighter enforcement already happened inside
/// `decode`; a violation here indicates a defect in the transform, not
/// caller misuse.
fn check_optimized_preferences(optimized: &Preferences) -> OptResult<()> {
    for (_, value) in optimized.iter() {
        if value < 0.0 {
            return Err(OptError::InconsistentResult {
                reason: "Optimized preferences must be non-negative.",
                value,
            });
        }
    }
    let sum = optimized.sum();
    if (sum - 1.0).abs() >= LOOSE_SUM_TOL {
        return Err(OptError::InconsistentResult {
            reason: "Optimized preferences must sum to one.",
            value: sum,
        });
    }
    Ok(())
}
