//! alphabet — fixed, descending-ordered symbol sets.
//!
//! Purpose
//! -------
//! Define [`Alphabet`], the immutable ordered symbol set that anchors the
//! simplex codec and the Dirichlet prior. The order is derived once from a
//! reference distribution and never changes afterwards, so several codecs
//! (for example one per site) can coexist without sharing state.
//!
//! Key behaviors
//! -------------
//! - Sort symbols by descending reference preference; ties resolve to the
//!   lexicographically larger symbol.
//! - Provide positional access (`symbols`, `last`, `index_of`) and key-set
//!   comparison against a distribution (`matches`).
//!
//! Invariants & assumptions
//! ------------------------
//! - An alphabet always holds at least two distinct symbols; this is
//!   guaranteed by [`Preferences`] at construction of the reference.
//! - The symbol order is part of each owning object's identity: encoded
//!   vectors and concentration-parameter vectors are only meaningful
//!   relative to the alphabet that produced them.
//!
//! Conventions
//! -----------
//! - Descending order puts the smallest preferences last, which keeps the
//!   codec's cumulative products away from underflow for the values where
//!   it matters most.
use crate::preferences::prefs::Preferences;

/// An ordered, immutable set of preference symbols.
///
/// The order is fixed at construction: descending by the reference
/// distribution's values, with ties going to the larger symbol. All
/// vector-valued quantities in this crate (codec vectors, concentration
/// parameters) are laid out in this order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
}

impl Alphabet {
    /// Derive an alphabet from a reference distribution.
    ///
    /// Symbols are ordered by descending preference value; equal values
    /// order by descending symbol identity, so the result is fully
    /// deterministic.
    pub fn from_reference(reference: &Preferences) -> Self {
        let mut decorated: Vec<(f64, char)> =
            reference.iter().map(|(symbol, value)| (value, symbol)).collect();
        decorated.sort_by(|a, b| b.0.total_cmp(&a.0).then(b.1.cmp(&a.1)));
        Alphabet { symbols: decorated.into_iter().map(|(_, symbol)| symbol).collect() }
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always `false`; alphabets hold at least two symbols.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols in alphabet order.
    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// The last symbol in alphabet order (the one reconstructed rather
    /// than stored by the codec).
    pub fn last(&self) -> char {
        self.symbols[self.symbols.len() - 1]
    }

    /// Position of `symbol` in alphabet order, if present.
    pub fn index_of(&self, symbol: char) -> Option<usize> {
        self.symbols.iter().position(|&s| s == symbol)
    }

    /// Whether `prefs` is keyed by exactly this alphabet's symbols.
    pub fn matches(&self, prefs: &Preferences) -> bool {
        self.symbols.len() == prefs.len()
            && self.symbols.iter().all(|&s| prefs.get(s).is_some())
    }
}
