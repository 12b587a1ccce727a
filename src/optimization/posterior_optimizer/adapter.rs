//! Adapter that exposes the posterior objective as an `argmin` problem.
//!
//! We convert the *maximization* of a log posterior into a *minimization*
//! problem by defining the cost as the negative of the enabled terms:
//! `c(x) = -(log likelihood + log prior)`, or the negative of a single
//! term when only one is enabled. Gradients come from finite differences
//! of the cost; the external evaluator is opaque, so no analytic gradient
//! exists.
//!
//! Support handling: a component of `x` outside the open `(0, 1)`
//! interval, or a decoded preference outside it, is a hard abort of the
//! run. The solver keeps its iterates inside the declared box, so such a
//! probe indicates a solver defect, and retrying would change observable
//! results.
use std::cell::RefCell;

use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;

use crate::{
    optimization::{
        errors::OptError,
        posterior_optimizer::{
            traits::LikelihoodEvaluator,
            types::{Cost, Grad, Theta},
            validation::validate_grad,
        },
    },
    preferences::{codec::SimplexCodec, prior::PrefsPrior},
};

/// Bridges the posterior objective to `argmin`'s `CostFunction` and
/// `Gradient`.
///
/// Holds the per-run codec and prior by reference and the external
/// evaluator behind a `RefCell`, because every likelihood evaluation both
/// writes (sets the candidate distribution) and reads (queries the
/// likelihood). The evaluator's single-owner contract is inherited from
/// [`LikelihoodEvaluator`]; one adapter per run, one run per evaluator.
pub struct PosteriorAdapter<'a, E: LikelihoodEvaluator> {
    codec: &'a SimplexCodec,
    prior: &'a PrefsPrior,
    evaluator: RefCell<&'a mut E>,
    site: usize,
    use_likelihood: bool,
    use_prior: bool,
}

impl<'a, E: LikelihoodEvaluator> PosteriorAdapter<'a, E> {
    /// Construct a new adapter over a validated run configuration.
    ///
    /// Callers are expected to have validated the site index, the mode
    /// flags, and alphabet agreement already; this type only enforces the
    /// per-evaluation support conditions.
    pub fn new(
        codec: &'a SimplexCodec, prior: &'a PrefsPrior, evaluator: &'a mut E, site: usize,
        use_likelihood: bool, use_prior: bool,
    ) -> Self {
        Self { codec, prior, evaluator: RefCell::new(evaluator), site, use_likelihood, use_prior }
    }
}

impl<'a, E: LikelihoodEvaluator> CostFunction for PosteriorAdapter<'a, E> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate the cost at `theta`.
    ///
    /// Steps:
    /// 1. Reject any component that is NaN, `<= 0`, or `>= 1`
    ///    ([`OptError::VectorOutsideSupport`]).
    /// 2. Decode to a candidate distribution; reject any decoded value
    ///    outside `(0, 1)` ([`OptError::PrefsOutsideSupport`]).
    /// 3. Sum the negated enabled terms: push the candidate to the
    ///    evaluator and read its log-likelihood, and/or evaluate the
    ///    prior's log-density.
    /// 4. Reject a non-finite total ([`OptError::NonFiniteCost`]).
    ///
    /// # Errors
    /// Propagates evaluator failures and the support violations above;
    /// all of them abort the surrounding run.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        for (index, &value) in theta.iter().enumerate() {
            if value.is_nan() || value <= 0.0 || value >= 1.0 {
                return Err((OptError::VectorOutsideSupport { index, value }).into());
            }
        }
        let candidate = self.codec.decode(theta).map_err(OptError::from)?;
        for (symbol, value) in candidate.iter() {
            if value <= 0.0 || value >= 1.0 {
                return Err((OptError::PrefsOutsideSupport { symbol, value }).into());
            }
        }

        let mut log_posterior = 0.0;
        if self.use_likelihood {
            let mut evaluator = self.evaluator.borrow_mut();
            evaluator.set_site_preferences(&candidate, self.site)?;
            log_posterior += evaluator.log_likelihood()?;
        }
        if self.use_prior {
            log_posterior += self.prior.log_density(&candidate).map_err(OptError::from)?;
        }

        let cost = -log_posterior;
        if !cost.is_finite() {
            return Err((OptError::NonFiniteCost { value: cost }).into());
        }
        Ok(cost)
    }
}

impl<'a, E: LikelihoodEvaluator> Gradient for PosteriorAdapter<'a, E> {
    type Param = Theta;
    type Gradient = Grad;

    /// Finite-difference gradient of the cost at `theta`.
    ///
    /// Behavior:
    /// - Try *central* differences first.
    /// - If any evaluation of the cost closure failed (captured via
    ///   `closure_err`), retry with *forward* differences; if the failure
    ///   persists it is returned as a real error.
    /// - Validate the FD gradient; if it fails (e.g., non-finite), retry
    ///   once with forward differences and validate again.
    ///
    /// Implementation note: the FD closure must return `f64`, so `?`
    /// cannot be used inside it; the first error is captured in
    /// `closure_err` and the closure returns `NaN`. After FD, the captured
    /// error is turned back into a real error (or the forward retry
    /// takes over).
    ///
    /// # Errors
    /// - Propagates any error raised by cost evaluations performed during
    ///   FD, including support violations (hard abort).
    /// - Returns validation errors if the gradient has the wrong dimension
    ///   or non-finite entries.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        let dim = theta.len();
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let cost_func = |theta: &Theta| -> f64 {
            match self.cost(theta) {
                Ok(value) => value,
                Err(e) => {
                    let mut slot = closure_err.borrow_mut();
                    if slot.is_none() {
                        *slot = Some(e);
                    }
                    f64::NAN
                }
            }
        };
        let fd_grad = theta.central_diff(&cost_func);
        if closure_err.borrow().is_some() {
            return run_fd_diff(theta, &cost_func, &closure_err);
        }
        match validate_grad(&fd_grad, dim) {
            Ok(()) => Ok(fd_grad),
            Err(_) => run_fd_diff(theta, &cost_func, &closure_err),
        }
    }
}

/// Compute a forward-difference gradient of `func` at `theta`, with error
/// capture.
///
/// The FD closure cannot return `Result`, so any error raised by `func` is
/// stored into `closure_err` and the closure returns `NaN`. This helper:
/// - clears `closure_err`,
/// - performs `forward_diff`,
/// - if an error was captured, returns it as `Err`,
/// - validates the resulting gradient,
/// - if validation succeeds, returns the gradient as `Ok(grad)`.
///
/// # Errors
/// Returns any error captured during evaluation of `func` inside the FD
/// routine or by validation of the resulting gradient.
fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> Result<Grad, Error> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    let dim = theta.len();
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    validate_grad(&fd_grad, dim)?;
    Ok(fd_grad)
}
