//! Execution helper that runs the box-constrained solver on a posterior
//! problem and returns a crate-friendly [`SolverReport`].
use crate::optimization::{
    errors::OptResult,
    posterior_optimizer::{
        adapter::PosteriorAdapter,
        solver::ProjectedGradient,
        traits::{LikelihoodEvaluator, PosteriorOptions, SolverReport},
        types::Theta,
    },
};
#[cfg(feature = "obs_slog")]
use argmin::core::CostFunction;
use argmin::core::{Executor, State};

/// Run the projected-gradient solver on a posterior problem.
///
/// This wires up:
/// - the posterior objective via [`PosteriorAdapter`],
/// - the [`ProjectedGradient`] solver (which projects the initial vector
///   onto its box before the first evaluation),
/// - optional observers (behind the `obs_slog` feature),
/// - the iteration cap from `opts.tols.max_iter`,
///   then executes the solver and converts the result into a
///   [`SolverReport`].
///
/// # Arguments
/// - `theta0`: Initial codec vector. It is **consumed** and set on the
///   solver state via `state.param(theta0)`.
/// - `opts`: Solver options (tolerances, verbosity, initial step).
/// - `problem`: A [`PosteriorAdapter`] wrapping the codec, prior, and
///   evaluator for one site.
/// - `solver`: A fully constructed [`ProjectedGradient`].
///
/// # Feature flags
/// If the `obs_slog` feature is enabled and `opts.verbose == true`, a
/// terminal slog observer is attached with `ObserverMode::Always` and a
/// one-time pre-iteration line logs the starting cost.
///
/// # Returns
/// A [`SolverReport`] containing the best vector found, the best log
/// posterior value, termination status, iteration count, and
/// function-evaluation counters.
///
/// # Errors
/// - Propagates any backend runtime error (including support violations
///   raised by the objective, which abort the run) via the crate's
///   `From<argmin::core::Error>` conversion.
/// - Propagates validation errors encountered when constructing
///   [`SolverReport`].
pub fn run_solver<'a, E>(
    theta0: Theta, opts: &PosteriorOptions, problem: PosteriorAdapter<'a, E>,
    solver: ProjectedGradient,
) -> OptResult<SolverReport>
where
    E: LikelihoodEvaluator,
{
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        log_initial_state(&theta0, &problem);
    }
    let mut executor = Executor::new(problem, solver);
    executor = executor.configure(|state| state.param(theta0));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        executor = executor.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        executor = executor.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut result = executor.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let grad = result.take_gradient();
    SolverReport::new(
        result.take_best_param(),
        -result.get_best_cost(),
        termination,
        iterations,
        function_counts,
        grad,
    )
}

// ---- Helper Methods ----

#[cfg(feature = "obs_slog")]
fn log_initial_state<E>(theta0: &Theta, problem: &PosteriorAdapter<'_, E>)
where
    E: LikelihoodEvaluator,
{
    match problem.cost(theta0) {
        Ok(cost) => eprintln!("init: log posterior(theta0) = {:.6}", -cost),
        Err(err) => eprintln!("init: objective failed at theta0: {err}"),
    }
}
