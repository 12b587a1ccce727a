//! Integration tests for posterior preference optimization.
//!
//! Purpose
//! -------
//! - Validate the end-to-end pipeline: from a validated initial
//!   distribution, through codec and prior construction, to a
//!   box-constrained solver run and a decoded, floor-adjusted result.
//! - Exercise realistic objective shapes (prior-only, likelihood-only,
//!   and combined) rather than toy edge cases only.
//!
//! Coverage
//! --------
//! - `preferences`:
//!   - `Preferences` construction and `SimplexCodec` round trips as used
//!     by the optimizer.
//! - `optimization::posterior_optimizer`:
//!   - `optimize_preferences` with each mode combination.
//!   - Fail-fast precondition behavior, verified through a
//!     mutation-counting stub evaluator.
//!   - Non-convergence surfaced as a normal return with
//!     `converged = false`.
//!
//! Exclusions
//! ----------
//! - Fine-grained validation of low-level building blocks (codec guard
//!   branches, floor adjustment, prior derivations, solver backtracking)
//!   covered by unit tests next to the code.
//! - Python bindings, tested at a higher level from Python.
use std::collections::BTreeMap;

use prefsopt::{
    optimization::{
        errors::{OptError, OptResult},
        posterior_optimizer::{
            optimize_preferences, optimize_preferences_with, LikelihoodEvaluator,
            PosteriorOptions, Tolerances,
        },
    },
    preferences::prefs::Preferences,
};

/// Purpose
/// -------
/// Stub evaluator returning a constant log-likelihood regardless of the
/// pushed distribution, while counting mutations so fail-fast tests can
/// assert that no write happened.
///
/// Invariants
/// ----------
/// - `site_preferences` always returns the construction-time
///   distribution, so alphabet agreement is governed by that value.
struct ConstantEvaluator {
    n_sites: usize,
    prefs: Preferences,
    log_likelihood: f64,
    set_calls: usize,
}

impl ConstantEvaluator {
    fn new(n_sites: usize, prefs: Preferences, log_likelihood: f64) -> Self {
        Self { n_sites, prefs, log_likelihood, set_calls: 0 }
    }
}

impl LikelihoodEvaluator for ConstantEvaluator {
    fn n_sites(&self) -> usize {
        self.n_sites
    }

    fn site_preferences(&self, _site: usize) -> OptResult<Preferences> {
        Ok(self.prefs.clone())
    }

    fn set_site_preferences(&mut self, prefs: &Preferences, _site: usize) -> OptResult<()> {
        self.prefs = prefs.clone();
        self.set_calls += 1;
        Ok(())
    }

    fn log_likelihood(&self) -> OptResult<f64> {
        Ok(self.log_likelihood)
    }
}

/// Purpose
/// -------
/// Stub evaluator with a log-linear likelihood
/// `log L(pi) = sum_s counts[s] * ln(pi[s])`, conjugate to the Dirichlet
/// prior. The posterior mode is then known in closed form, giving the
/// combined-mode test an analytic target.
struct LogLinearEvaluator {
    n_sites: usize,
    prefs: Preferences,
    counts: BTreeMap<char, f64>,
}

impl LogLinearEvaluator {
    fn new(n_sites: usize, prefs: Preferences, counts: BTreeMap<char, f64>) -> Self {
        Self { n_sites, prefs, counts }
    }
}

impl LikelihoodEvaluator for LogLinearEvaluator {
    fn n_sites(&self) -> usize {
        self.n_sites
    }

    fn site_preferences(&self, _site: usize) -> OptResult<Preferences> {
        Ok(self.prefs.clone())
    }

    fn set_site_preferences(&mut self, prefs: &Preferences, _site: usize) -> OptResult<()> {
        self.prefs = prefs.clone();
        Ok(())
    }

    fn log_likelihood(&self) -> OptResult<f64> {
        let mut total = 0.0;
        for (&symbol, &count) in &self.counts {
            let value = self.prefs.get(symbol).ok_or(OptError::EvaluatorFailure {
                text: format!("no preference for '{symbol}'"),
            })?;
            total += count * value.ln();
        }
        Ok(total)
    }
}

fn initial_prefs() -> Preferences {
    Preferences::from_pairs(&[('A', 0.4), ('C', 0.3), ('G', 0.2), ('T', 0.1)])
        .expect("initial preferences should be valid")
}

/// Purpose
/// -------
/// With the prior alone (constant likelihood disabled), starting at the
/// peak, the optimizer must stay at the prior's unconstrained maximum:
/// its mode, which equals the peak when every entry clears the floor.
#[test]
fn prior_only_converges_to_the_peak() {
    // Arrange
    let initial = initial_prefs();
    let mut evaluator = ConstantEvaluator::new(3, initial.clone(), -11.0);

    // Act
    let outcome = optimize_preferences(&mut evaluator, &initial, 2, 2.0, 1e-4, false, true)
        .expect("optimization should succeed");

    // Assert
    assert!(outcome.converged, "prior-only run should converge, status: {}", outcome.status);
    for (symbol, value) in initial.iter() {
        let got = outcome.preferences.get(symbol).expect("symbol should be present");
        assert!((got - value).abs() < 1e-3, "'{symbol}': got {got}, want {value}");
    }
    // Prior-only mode never pushes candidates to the evaluator.
    assert_eq!(evaluator.set_calls, 0);
}

/// Purpose
/// -------
/// With a constant likelihood and the prior disabled, the objective is
/// flat: the solver should converge immediately and return a distribution
/// equal to the start (up to the codec's floor handling).
#[test]
fn likelihood_only_flat_objective_stays_at_start() {
    // Arrange
    let initial = initial_prefs();
    let mut evaluator = ConstantEvaluator::new(1, initial.clone(), -42.5);

    // Act
    let outcome = optimize_preferences(&mut evaluator, &initial, 1, 2.0, 1e-4, true, false)
        .expect("optimization should succeed");

    // Assert
    assert!(outcome.converged, "flat objective should converge, status: {}", outcome.status);
    assert!((outcome.value - (-42.5)).abs() < 1e-9, "value should be the constant likelihood");
    for (symbol, value) in initial.iter() {
        let got = outcome.preferences.get(symbol).expect("symbol should be present");
        assert!((got - value).abs() < 1e-6, "'{symbol}': got {got}, want {value}");
    }
    assert!(evaluator.set_calls > 0, "likelihood mode must push candidates to the evaluator");
}

/// Purpose
/// -------
/// With a log-linear likelihood the posterior is itself Dirichlet, so the
/// optimizer must move the estimate from the prior peak to the analytic
/// posterior mode.
///
/// Given
/// -----
/// - Initial {A: 0.4, C: 0.3, G: 0.2, T: 0.1}, concentration 4,
///   minvalue 1e-4, so alpha = [5.8, 4.6, 3.4, 2.2] in order A, C, G, T.
/// - Counts {A: 2, C: 1, G: 6, T: 1}; posterior alpha adds the counts.
///
/// Expect
/// ------
/// - Mode ((alpha_s + c_s - 1) / (sum - n)):
///   {A: 0.30909, C: 0.20909, G: 0.38182, T: 0.1}.
#[test]
fn combined_mode_finds_conjugate_posterior_mode() {
    // Arrange
    let initial = initial_prefs();
    let counts: BTreeMap<char, f64> =
        [('A', 2.0), ('C', 1.0), ('G', 6.0), ('T', 1.0)].into_iter().collect();
    let mut evaluator = LogLinearEvaluator::new(1, initial.clone(), counts);
    let opts = PosteriorOptions::new(
        Tolerances::new(Some(1e-7), None, Some(2000)).expect("tolerances should be valid"),
        false,
        None,
    )
    .expect("options should be valid");

    // Act
    let outcome =
        optimize_preferences_with(&mut evaluator, &initial, 1, 4.0, 1e-4, true, true, &opts)
            .expect("optimization should succeed");

    // Assert
    let expected = [
        ('A', 0.3090909090909091),
        ('C', 0.20909090909090908),
        ('G', 0.38181818181818183),
        ('T', 0.1),
    ];
    for (symbol, want) in expected {
        let got = outcome.preferences.get(symbol).expect("symbol should be present");
        assert!((got - want).abs() < 2e-2, "'{symbol}': got {got}, want {want}");
    }
    // The posterior value at the optimum beats the starting point.
    let start_value = {
        let mut at_start = LogLinearEvaluator::new(
            1,
            initial.clone(),
            [('A', 2.0), ('C', 1.0), ('G', 6.0), ('T', 1.0)].into_iter().collect(),
        );
        at_start.set_site_preferences(&initial, 1).expect("set should succeed");
        at_start.log_likelihood().expect("likelihood should evaluate")
    };
    assert!(
        outcome.value > start_value,
        "optimized log posterior {} should beat the pure-likelihood start {start_value}",
        outcome.value
    );
}

/// Purpose
/// -------
/// Malformed inputs fail before any mutating call to the evaluator: the
/// site range, alphabet agreement, positivity, mode flags, and the
/// minvalue window are all checked first.
#[test]
fn preconditions_fail_fast_without_mutating_the_evaluator() {
    // Arrange
    let initial = initial_prefs();
    let mut evaluator = ConstantEvaluator::new(3, initial.clone(), -1.0);

    // Act + Assert: site out of range (1-based indexing)
    assert!(matches!(
        optimize_preferences(&mut evaluator, &initial, 0, 2.0, 1e-4, true, true),
        Err(OptError::SiteOutOfRange { site: 0, n_sites: 3 })
    ));
    assert!(matches!(
        optimize_preferences(&mut evaluator, &initial, 4, 2.0, 1e-4, true, true),
        Err(OptError::SiteOutOfRange { site: 4, n_sites: 3 })
    ));

    // Act + Assert: both objective terms disabled
    assert!(matches!(
        optimize_preferences(&mut evaluator, &initial, 1, 2.0, 1e-4, false, false),
        Err(OptError::NoObjectiveTerms)
    ));

    // Act + Assert: concentration at the boundary
    assert!(matches!(
        optimize_preferences(&mut evaluator, &initial, 1, 1.0, 1e-4, true, true),
        Err(OptError::InvalidConcentration { .. })
    ));

    // Act + Assert: minvalue outside (0, 1e-2)
    assert!(matches!(
        optimize_preferences(&mut evaluator, &initial, 1, 2.0, 0.0, true, true),
        Err(OptError::InvalidMinValue { .. })
    ));
    assert!(matches!(
        optimize_preferences(&mut evaluator, &initial, 1, 2.0, 0.5, true, true),
        Err(OptError::InvalidMinValue { .. })
    ));

    // Act + Assert: a zero entry in the initial distribution
    let with_zero = Preferences::from_pairs(&[('A', 0.5), ('C', 0.5), ('G', 0.0), ('T', 0.0)])
        .expect("distribution should be valid");
    assert!(matches!(
        optimize_preferences(&mut evaluator, &with_zero, 1, 2.0, 1e-4, true, true),
        Err(OptError::NonPositiveInitialPreference { .. })
    ));

    // Act + Assert: evaluator disagrees on the alphabet
    let other_alphabet = Preferences::from_pairs(&[('A', 0.4), ('C', 0.3), ('G', 0.2), ('U', 0.1)])
        .expect("distribution should be valid");
    assert!(matches!(
        optimize_preferences(&mut evaluator, &other_alphabet, 1, 2.0, 1e-4, true, true),
        Err(OptError::EvaluatorSymbolMismatch { site: 1 })
    ));

    // No precondition failure above may have pushed state.
    assert_eq!(evaluator.set_calls, 0);
}

/// Purpose
/// -------
/// Hitting the iteration cap is not an error: the outcome reports
/// `converged = false` with the solver's status, and still carries a
/// usable distribution.
#[test]
fn iteration_cap_reports_nonconvergence() {
    // Arrange: start at the prior peak but pull hard toward G with the
    // likelihood, so one iteration cannot reach stationarity.
    let initial = initial_prefs();
    let counts: BTreeMap<char, f64> =
        [('A', 0.0), ('C', 0.0), ('G', 50.0), ('T', 0.0)].into_iter().collect();
    let mut evaluator = LogLinearEvaluator::new(1, initial.clone(), counts);
    let opts = PosteriorOptions::new(
        Tolerances::new(Some(1e-12), None, Some(1)).expect("tolerances should be valid"),
        false,
        None,
    )
    .expect("options should be valid");

    // Act
    let outcome =
        optimize_preferences_with(&mut evaluator, &initial, 1, 2.0, 1e-4, true, true, &opts)
            .expect("optimization should return normally");

    // Assert
    assert!(!outcome.converged, "one iteration should not reach stationarity");
    assert!(outcome.status.contains("MaxItersReached"), "status: {}", outcome.status);
    assert!((outcome.preferences.sum() - 1.0).abs() < 1e-3);
    for (_, value) in outcome.preferences.iter() {
        assert!(value >= 0.0);
    }
}

/// Purpose
/// -------
/// An evaluator failure mid-run aborts the optimization with the failure
/// surfaced typed, not stringified.
#[test]
fn evaluator_failure_aborts_the_run() {
    // Arrange
    struct FailingEvaluator {
        prefs: Preferences,
    }

    impl LikelihoodEvaluator for FailingEvaluator {
        fn n_sites(&self) -> usize {
            1
        }

        fn site_preferences(&self, _site: usize) -> OptResult<Preferences> {
            Ok(self.prefs.clone())
        }

        fn set_site_preferences(&mut self, _prefs: &Preferences, _site: usize) -> OptResult<()> {
            Ok(())
        }

        fn log_likelihood(&self) -> OptResult<f64> {
            Err(OptError::EvaluatorFailure { text: "tree likelihood unavailable".to_string() })
        }
    }

    let initial = initial_prefs();
    let mut evaluator = FailingEvaluator { prefs: initial.clone() };

    // Act
    let err = optimize_preferences(&mut evaluator, &initial, 1, 2.0, 1e-4, true, true)
        .expect_err("run should abort");

    // Assert
    assert!(matches!(err, OptError::EvaluatorFailure { .. }), "got {err:?}");
}
