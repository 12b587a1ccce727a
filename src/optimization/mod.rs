//! optimization — posterior optimizer stack and unified error surface.
//!
//! Purpose
//! -------
//! Provide a cohesive optimization layer for preference estimation,
//! combining a box-constrained posterior optimizer with a single
//! error/result surface. Callers provide a likelihood evaluator, choose
//! tolerances, and obtain optimized preferences and diagnostics without
//! touching backend solver details.
//!
//! Key behaviors
//! -------------
//! - Expose a high-level API for **maximizing log posteriors** over
//!   preference distributions (`posterior_optimizer`), including
//!   configuration of stopping criteria and solver options.
//! - Normalize configuration issues, numerical failures, evaluator
//!   failures, and backend solver errors into a single enum
//!   (`errors::OptError`) with a common result alias (`OptResult<T>`).
//!
//! Invariants & assumptions
//! ------------------------
//! - The optimizer operates in the codec's vector space and assumes
//!   inputs are finite once validation has passed; invalid states are
//!   reported as `OptError`, not panics.
//! - Out-of-support probes during the search are hard aborts, surfaced
//!   through the optimization layer as domain errors.
//!
//! Conventions
//! -----------
//! - The solver conceptually maximizes a log posterior by minimizing its
//!   negative; user-facing APIs and outcomes are expressed in
//!   log-posterior terms.
//! - Public optimization entrypoints that can fail return `OptResult<T>`;
//!   callers never see raw backend errors or preference-layer error
//!   enums.
//! - This module and its submodules avoid I/O and logging; front-ends
//!   observe progress through the feature-gated solver observer.
//!
//! Downstream usage
//! ----------------
//! - Likelihood engines implement
//!   `posterior_optimizer::LikelihoodEvaluator` and call
//!   `optimize_preferences` per site.
//! - Front-ends typically import the curated surface via
//!   `optimization::prelude::*`.
//!
//! Testing notes
//! -------------
//! - Unit tests in the submodules focus on local concerns (solver
//!   behavior, adapter composition, validation windows, error
//!   conversions).
//! - Higher-level integration tests exercise end-to-end optimization
//!   workflows with stub evaluators and verify that configuration
//!   mistakes, domain violations, and evaluator failures all surface as
//!   sensible `OptError` values.

pub mod errors;
pub mod posterior_optimizer;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use prefsopt::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::posterior_optimizer::prelude::*;
}
