//! posterior_optimizer::solver — box-constrained projected gradient
//! descent.
//!
//! Purpose
//! -------
//! Provide the gradient-capable, box-constrained minimizer driving the
//! posterior search. Each iteration takes a gradient step and projects the
//! result back onto the search box, with Armijo backtracking on the step
//! length, so the objective is never evaluated outside the declared
//! bounds.
//!
//! Key behaviors
//! -------------
//! - Project the iterate onto `[lower, upper]^(n-1)` before every cost
//!   evaluation (including the initial one).
//! - Backtrack the step length until the projected step achieves
//!   sufficient decrease, up to [`MAX_BACKTRACKS`] halvings.
//! - Declare convergence on a small projected-gradient norm, a small cost
//!   change, or an exhausted backtracking loop (no descent direction left
//!   inside the box).
//!
//! Invariants & assumptions
//! ------------------------
//! - The wrapped problem reports out-of-support probes as errors; because
//!   iterates stay inside the box, such an error indicates a defect and
//!   aborts the run through the executor.
//! - The iteration cap is enforced by the executor, not here; hitting it
//!   surfaces as a non-converged termination status.
//!
//! Conventions
//! -----------
//! - The stationarity measure is `||x - P(x - g)||`, the norm of the
//!   projected gradient; in the interior it reduces to the plain gradient
//!   norm, and on an active bound it ignores the components pushing
//!   outward.
use argmin::core::{
    ArgminError, CostFunction, Error, Gradient, IterState, Problem, Solver, State,
    TerminationReason, TerminationStatus, KV,
};
use argmin_math::ArgminL2Norm;

use crate::optimization::{
    errors::OptResult,
    posterior_optimizer::{
        traits::PosteriorOptions,
        types::{BoxBounds, Cost, Grad, Theta},
    },
};

/// Default initial step length for the backtracking search.
pub const DEFAULT_INIT_STEP: f64 = 1.0;

/// Step-length shrink factor per backtracking round.
const BACKTRACK_SHRINK: f64 = 0.5;

/// Sufficient-decrease constant for the Armijo condition on the projected
/// step.
const SUFFICIENT_DECREASE: f64 = 1e-4;

/// Maximum backtracking rounds per iteration; exhausting them means no
/// acceptable descent step exists inside the box at this iterate.
const MAX_BACKTRACKS: usize = 40;

/// Projected gradient descent over a uniform box.
///
/// Built per run from the search box and the solver options; the
/// tolerances mirror [`super::traits::Tolerances`]: `tol_grad` stops on a
/// small projected-gradient norm, `tol_cost` on a small cost change, and
/// the iteration cap lives in the executor.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedGradient {
    bounds: BoxBounds,
    init_step: f64,
    tol_grad: Option<f64>,
    tol_cost: Option<f64>,
    converged: bool,
}

impl ProjectedGradient {
    /// Construct a solver from validated bounds and options.
    pub fn new(bounds: BoxBounds, opts: &PosteriorOptions) -> OptResult<Self> {
        Ok(Self {
            bounds,
            init_step: opts.init_step.unwrap_or(DEFAULT_INIT_STEP),
            tol_grad: opts.tols.tol_grad,
            tol_cost: opts.tols.tol_cost,
            converged: false,
        })
    }

    /// The search box.
    pub fn bounds(&self) -> &BoxBounds {
        &self.bounds
    }
}

impl<O> Solver<O, IterState<Theta, Grad, (), (), (), f64>> for ProjectedGradient
where
    O: CostFunction<Param = Theta, Output = Cost> + Gradient<Param = Theta, Gradient = Grad>,
{
    const NAME: &'static str = "Projected gradient descent";

    /// Project the initial vector onto the box and evaluate its cost.
    ///
    /// # Errors
    /// - `NotInitialized` if no initial parameter vector was configured.
    /// - Propagates cost-evaluation errors (support violations abort the
    ///   run here already).
    fn init(
        &mut self, problem: &mut Problem<O>,
        mut state: IterState<Theta, Grad, (), (), (), f64>,
    ) -> Result<(IterState<Theta, Grad, (), (), (), f64>, Option<KV>), Error> {
        let theta = state.take_param().ok_or_else(|| ArgminError::NotInitialized {
            text: "Projected gradient descent requires an initial parameter vector.".to_string(),
        })?;
        let theta = self.bounds.project(&theta);
        let cost = problem.cost(&theta)?;
        Ok((state.param(theta).cost(cost), None))
    }

    /// One projected-gradient iteration with Armijo backtracking.
    ///
    /// # Errors
    /// Propagates gradient and cost evaluation errors; support violations
    /// abort the run.
    fn next_iter(
        &mut self, problem: &mut Problem<O>,
        mut state: IterState<Theta, Grad, (), (), (), f64>,
    ) -> Result<(IterState<Theta, Grad, (), (), (), f64>, Option<KV>), Error> {
        let theta = state.take_param().ok_or_else(|| ArgminError::NotInitialized {
            text: "Iteration started without a parameter vector.".to_string(),
        })?;
        let cost = state.get_cost();
        let grad = problem.gradient(&theta)?;

        if let Some(tol) = self.tol_grad {
            let projected_grad = &theta - &self.bounds.project(&(&theta - &grad));
            if projected_grad.l2_norm() < tol {
                self.converged = true;
                return Ok((state.param(theta).cost(cost).gradient(grad), None));
            }
        }

        let mut step = self.init_step;
        let mut accepted: Option<(Theta, f64)> = None;
        for _ in 0..MAX_BACKTRACKS {
            let candidate = self.bounds.project(&(&theta - &grad.mapv(|g| step * g)));
            let displacement = &candidate - &theta;
            let displacement_sq = displacement.dot(&displacement);
            if displacement_sq == 0.0 {
                // Every descent component is blocked by an active bound.
                break;
            }
            let candidate_cost = problem.cost(&candidate)?;
            if candidate_cost <= cost - SUFFICIENT_DECREASE / step * displacement_sq {
                accepted = Some((candidate, candidate_cost));
                break;
            }
            step *= BACKTRACK_SHRINK;
        }

        match accepted {
            Some((new_theta, new_cost)) => {
                if let Some(tol) = self.tol_cost {
                    if (cost - new_cost).abs() < tol {
                        self.converged = true;
                    }
                }
                Ok((state.param(new_theta).cost(new_cost).gradient(grad), None))
            }
            None => {
                // No acceptable step: treat the iterate as stationary.
                self.converged = true;
                Ok((state.param(theta).cost(cost).gradient(grad), None))
            }
        }
    }

    fn terminate(
        &mut self, _state: &IterState<Theta, Grad, (), (), (), f64>,
    ) -> TerminationStatus {
        if self.converged {
            TerminationStatus::Terminated(TerminationReason::SolverConverged)
        } else {
            TerminationStatus::NotTerminated
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argmin::core::Executor;
    use ndarray::{array, Array1};

    use crate::optimization::posterior_optimizer::traits::Tolerances;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Minimization of a smooth quadratic with an interior optimum.
    // - Projection onto an active bound when the unconstrained optimum
    //   lies outside the box.
    // - Convergence flagging through the termination status.
    //
    // They intentionally DO NOT cover:
    // - The posterior objective itself, exercised via the adapter and the
    //   integration suite.
    // -------------------------------------------------------------------------

    /// Quadratic bowl centered at `center`, with analytic gradient.
    struct Bowl {
        center: Array1<f64>,
    }

    impl CostFunction for Bowl {
        type Param = Theta;
        type Output = Cost;

        fn cost(&self, theta: &Theta) -> Result<Cost, Error> {
            let d = theta - &self.center;
            Ok(d.dot(&d))
        }
    }

    impl Gradient for Bowl {
        type Param = Theta;
        type Gradient = Grad;

        fn gradient(&self, theta: &Theta) -> Result<Grad, Error> {
            Ok((theta - &self.center).mapv(|v| 2.0 * v))
        }
    }

    fn options() -> PosteriorOptions {
        PosteriorOptions::new(
            Tolerances::new(Some(1e-8), None, Some(200)).unwrap(),
            false,
            None,
        )
        .unwrap()
    }

    #[test]
    // Purpose
    // -------
    // An interior optimum is reached to high accuracy and reported as a
    // converged stop.
    fn minimizes_interior_quadratic() {
        // Arrange
        let bounds = BoxBounds::from_minvalue(1e-4).expect("bounds should build");
        let problem = Bowl { center: array![0.3, 0.6, 0.45] };
        let solver = ProjectedGradient::new(bounds, &options()).expect("solver should build");

        // Act
        let result = Executor::new(problem, solver)
            .configure(|state| state.param(array![0.9, 0.1, 0.5]).max_iters(200))
            .run()
            .expect("run should succeed");
        let state = result.state();

        // Assert
        let best = state.get_best_param().expect("best parameter should exist");
        for (got, want) in best.iter().zip([0.3, 0.6, 0.45]) {
            assert!((got - want).abs() < 1e-4, "got {got}, want {want}");
        }
        assert!(matches!(
            state.get_termination_status(),
            TerminationStatus::Terminated(TerminationReason::SolverConverged)
        ));
    }

    #[test]
    // Purpose
    // -------
    // With the unconstrained optimum outside the box, the solver settles
    // on the nearest bound instead of probing past it.
    fn lands_on_active_bound() {
        // Arrange
        let bounds = BoxBounds::from_minvalue(0.1).expect("bounds should build");
        let problem = Bowl { center: array![1.5, 0.5] };
        let solver = ProjectedGradient::new(bounds, &options()).expect("solver should build");

        // Act
        let result = Executor::new(problem, solver)
            .configure(|state| state.param(array![0.5, 0.5]).max_iters(200))
            .run()
            .expect("run should succeed");
        let state = result.state();

        // Assert
        let best = state.get_best_param().expect("best parameter should exist");
        assert!((best[0] - 0.9).abs() < 1e-6, "first coordinate should pin to 0.9, got {}", best[0]);
        assert!((best[1] - 0.5).abs() < 1e-4, "second coordinate should stay free, got {}", best[1]);
    }

    #[test]
    // Purpose
    // -------
    // A start outside the box is projected inside before the first cost
    // evaluation, so the run proceeds instead of aborting.
    fn projects_out_of_box_start() {
        // Arrange
        let bounds = BoxBounds::from_minvalue(0.2).expect("bounds should build");
        let problem = Bowl { center: array![0.5, 0.5] };
        let solver = ProjectedGradient::new(bounds, &options()).expect("solver should build");

        // Act
        let result = Executor::new(problem, solver)
            .configure(|state| state.param(array![-3.0, 7.0]).max_iters(200))
            .run()
            .expect("run should succeed");
        let state = result.state();

        // Assert
        let best = state.get_best_param().expect("best parameter should exist");
        for (got, want) in best.iter().zip([0.5, 0.5]) {
            assert!((got - want).abs() < 1e-4, "got {got}, want {want}");
        }
    }
}
