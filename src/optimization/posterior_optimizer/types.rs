//! posterior_optimizer::types — shared numeric aliases and box bounds.
//!
//! Purpose
//! -------
//! Centralize the numeric types used by the posterior optimizer. The rest
//! of the optimizer code stays agnostic to `ndarray` and Argmin generics
//! by importing these aliases instead of the backend types.
//!
//! Key behaviors
//! -------------
//! - Define canonical aliases for codec vectors, gradients, and scalar
//!   costs (`Theta`, `Grad`, `Cost`) plus the solver's evaluation-counter
//!   map (`FnEvalMap`).
//! - Provide [`BoxBounds`], the uniform per-coordinate search box derived
//!   from the optimizer's `minvalue` floor.
//!
//! Conventions
//! -----------
//! - `Theta` holds a stick-breaking codec vector of length n - 1; `Grad`
//!   matches its shape.
//! - `Cost` is the scalar objective, the negative log posterior (or the
//!   negative of whichever terms are enabled).
use std::collections::HashMap;

use ndarray::Array1;

use crate::optimization::errors::{OptError, OptResult};

/// Codec vector in optimizer space.
///
/// Alias for `ndarray::Array1<f64>`, used as the canonical parameter type
/// throughout the optimizer.
pub type Theta = Array1<f64>;

/// Gradient of the objective with respect to [`Theta`].
///
/// Alias for `ndarray::Array1<f64>`, matching the shape of `Theta`.
pub type Grad = Array1<f64>;

/// Scalar objective value used by the solver (the negative log posterior).
pub type Cost = f64;

/// Function-evaluation counters as reported by the solver.
///
/// Maps human-readable counter names (e.g., `"cost_count"`) to counts.
pub type FnEvalMap = HashMap<String, u64>;

/// A uniform per-coordinate search box `[lower, upper]^(n-1)`.
///
/// Built from the optimizer's `minvalue` as `[minvalue, 1 - minvalue]`.
/// The solver projects every iterate onto this box, so the objective is
/// never evaluated outside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxBounds {
    lower: f64,
    upper: f64,
}

impl BoxBounds {
    /// Construct bounds with explicit edges.
    ///
    /// # Errors
    /// [`OptError::InvalidBounds`] unless both edges are finite and
    /// `lower < upper`.
    pub fn new(lower: f64, upper: f64) -> OptResult<Self> {
        if !lower.is_finite() || !upper.is_finite() {
            return Err(OptError::InvalidBounds {
                lower,
                upper,
                reason: "Bounds must be finite.",
            });
        }
        if lower >= upper {
            return Err(OptError::InvalidBounds {
                lower,
                upper,
                reason: "Lower bound must be strictly below upper bound.",
            });
        }
        Ok(BoxBounds { lower, upper })
    }

    /// Construct the box `[minvalue, 1 - minvalue]`.
    ///
    /// # Errors
    /// [`OptError::InvalidBounds`] if `minvalue` does not leave a
    /// non-empty interior (i.e. `minvalue >= 0.5` or non-finite).
    pub fn from_minvalue(minvalue: f64) -> OptResult<Self> {
        Self::new(minvalue, 1.0 - minvalue)
    }

    /// Lower edge, shared by every coordinate.
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Upper edge, shared by every coordinate.
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Clamp every component of `theta` into the box.
    pub fn project(&self, theta: &Theta) -> Theta {
        theta.mapv(|value| value.clamp(self.lower, self.upper))
    }

    /// Whether every component of `theta` lies inside the box.
    pub fn contains(&self, theta: &Theta) -> bool {
        theta.iter().all(|&value| value >= self.lower && value <= self.upper)
    }
}
