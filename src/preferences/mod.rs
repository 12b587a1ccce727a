//! preferences — distributions, the simplex codec, and the Dirichlet prior.
//!
//! Purpose
//! -------
//! Provide the domain layer for per-site preference estimation: a
//! validated distribution type over a fixed symbol alphabet, a
//! stick-breaking codec that maps the probability simplex onto a box so a
//! box-constrained minimizer can search it, and a Dirichlet prior whose
//! mode matches a reference distribution.
//!
//! Key behaviors
//! -------------
//! - Validate distributions once, at construction ([`prefs::Preferences`]),
//!   and derive deterministic symbol orderings from reference values
//!   ([`alphabet::Alphabet`]).
//! - Convert between distributions and `[0, 1]^(n-1)` vectors with
//!   guarded arithmetic and a tolerance floor ([`codec::SimplexCodec`]).
//! - Build and evaluate mode-matched Dirichlet priors
//!   ([`prior::PrefsPrior`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - Alphabets and concentration parameters are immutable per-instance
//!   state; nothing in this layer is shared or global, so independent
//!   codecs and priors (one per site) coexist freely.
//! - Caller mistakes surface as [`errors::PrefsError`] invalid-input
//!   variants; decode postcondition failures surface as the internal
//!   inconsistency variants and indicate a transform defect, not misuse.
//!
//! Conventions
//! -----------
//! - All vector-valued quantities are laid out in alphabet order
//!   (descending reference value, ties to the larger symbol).
//! - This layer performs no I/O and no logging; it is pure computation
//!   over validated inputs.
//!
//! Downstream usage
//! ----------------
//! - The posterior optimizer builds one codec and one prior per run, both
//!   from the caller's initial distribution, and round-trips candidate
//!   vectors through [`codec::SimplexCodec::decode`] on every objective
//!   evaluation.
//! - Front-ends import the curated surface via [`prelude`].
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each type and cover ordering, validation
//!   windows, the worked encode/decode example, floor adjustment, and the
//!   prior's monotonicity properties.
//! - End-to-end behavior through the optimizer is exercised in the
//!   `tests/` integration suite.

pub mod alphabet;
pub mod codec;
pub mod errors;
pub mod prefs;
pub mod prior;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::alphabet::Alphabet;
pub use self::codec::SimplexCodec;
pub use self::errors::{PrefsError, PrefsResult};
pub use self::prefs::Preferences;
pub use self::prior::PrefsPrior;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use prefsopt::preferences::prelude::*;
//
// to import the main preferences surface in a single line.

pub mod prelude {
    pub use super::alphabet::Alphabet;
    pub use super::codec::SimplexCodec;
    pub use super::errors::{PrefsError, PrefsResult};
    pub use super::prefs::Preferences;
    pub use super::prior::PrefsPrior;
}
