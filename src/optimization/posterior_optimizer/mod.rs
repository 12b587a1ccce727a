//! posterior_optimizer — box-constrained posterior preference estimation.
//!
//! Purpose
//! -------
//! Provide the optimization driver that estimates a site's preference
//! distribution by **maximizing a log posterior**: the sum of an external
//! evaluator's log-likelihood and a mode-matched Dirichlet prior's
//! log-density, either term optionally disabled. Callers hand over an
//! evaluator, an initial distribution, and a site index, and receive the
//! optimized distribution plus convergence diagnostics.
//!
//! Key behaviors
//! -------------
//! - Convert the posterior maximization into a minimization of
//!   `c(x) = -(log likelihood + log prior)` via
//!   [`adapter::PosteriorAdapter`].
//! - Expose the user-facing entrypoints [`optimize_preferences`] and
//!   [`optimize_preferences_with`], which:
//!   - validate every precondition before the evaluator is mutated
//!     ([`validation`]),
//!   - build the per-run codec and prior from the initial distribution,
//!   - run the box-constrained [`solver::ProjectedGradient`] via
//!     [`run::run_solver`], and
//!   - normalize results into a [`PosteriorOutcome`].
//! - Provide finite-difference gradients of the objective with a
//!   central-to-forward fallback and error capture (in [`adapter`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - Execution is single-threaded and synchronous: a sequential loop of
//!   scalar objective evaluations with no suspension, no cancellation,
//!   and no automatic retries anywhere.
//! - The external evaluator is a shared, mutable resource with
//!   read-after-write semantics; at most one run may be active against a
//!   given instance at a time (see [`traits::LikelihoodEvaluator`]).
//! - The solver keeps every iterate inside `[minvalue, 1 - minvalue]`;
//!   an objective probe outside the open `(0, 1)` support is a hard
//!   abort of the run, never a retry.
//!
//! Conventions
//! -----------
//! - Vectors live in codec space as [`types::Theta`] (`Array1<f64>`,
//!   length n - 1); the mapping to and from distributions is owned by
//!   the preferences layer.
//! - Diagnostics ([`PosteriorOutcome::value`]) are expressed in
//!   log-posterior space, not cost space.
//! - Errors bubble up as [`OptResult<T>`] / `OptError`; this module and
//!   its children never intentionally panic or use `unsafe`.
//!
//! Downstream usage
//! ----------------
//! - Callers implement [`traits::LikelihoodEvaluator`] for their
//!   likelihood engine and call [`optimize_preferences`] per site, giving
//!   each concurrent run its own evaluator instance.
//! - Non-convergence is surfaced as a normal return with
//!   `converged = false`; the caller decides whether to retry from a
//!   perturbed start, accept, or reject.
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover:
//!   - cost composition and support aborts in [`adapter`],
//!   - quadratic minimization and bound handling in [`solver`],
//!   - precondition checks in [`validation`],
//!   - configuration and outcome mapping in [`traits`].
//! - The integration suite exercises [`optimize_preferences`] end to end
//!   with stub evaluators, including the prior-only convergence-to-peak
//!   property and fail-fast behavior.

pub mod adapter;
pub mod api;
pub mod run;
pub mod solver;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::{optimize_preferences, optimize_preferences_with, DEFAULT_MINVALUE};
pub use self::traits::{
    LikelihoodEvaluator, PosteriorOptions, PosteriorOutcome, SolverReport, Tolerances,
};
pub use self::types::{BoxBounds, Cost, FnEvalMap, Grad, Theta};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use prefsopt::optimization::posterior_optimizer::prelude::*;
//
// to import the main optimizer surface in a single line.

pub mod prelude {
    pub use super::api::{optimize_preferences, optimize_preferences_with};
    pub use super::traits::{
        LikelihoodEvaluator, PosteriorOptions, PosteriorOutcome, Tolerances,
    };
    pub use super::types::{Cost, Grad, Theta};
}
