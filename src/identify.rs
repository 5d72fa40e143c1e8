//! Identification of minimal consistent DFAs.
//!
//! The entry points take accepting and rejecting example words and produce
//! automata that classify every example correctly, smallest first. Everything
//! is lazy: encodings are generated size by size, oracle sessions live
//! exactly as long as a size is being examined, and no model is computed
//! before the consumer asks for it. Abandoning a returned iterator abandons
//! all outstanding work.

use std::iter;
use std::marker::PhantomData;
use std::mem;

use itertools::{Either, Itertools};
use rustsat::instances::Cnf;
use rustsat::types::{Assignment, Lit, TernaryVal, Var};
use thiserror::Error;
use tracing::{debug, trace};

use crate::alphabet::{Alphabet, Symbol};
use crate::apta::Apta;
use crate::card;
use crate::dfa::Dfa;
use crate::encode::{encodings, Bounds, Codec, SymmetryMode};
use crate::math;
use crate::oracle::{top_var, BatsatOracle, ModelEnum, Oracle};

/// Errors reported by identification entry points.
///
/// Note what is deliberately *not* an error: examples appearing with both
/// polarities make the problem unsolvable and yield an empty sequence, and
/// exhausted size bounds simply end the sequence.
#[derive(Debug, Error)]
pub enum IdentifyError {
    /// Both example sets are empty and no alphabet, or an empty one, was
    /// given, so every automaton whatsoever would be consistent.
    #[error("no examples and no alphabet were given, the problem is unconstrained")]
    InsufficientSpecification,
    /// An example word uses a symbol outside the explicitly supplied
    /// alphabet.
    #[error("an example word uses a symbol outside the supplied alphabet")]
    AlphabetMismatch,
    /// The SAT oracle failed. Oracle faults are not retried; they terminate
    /// the sequence they occur in.
    #[error("sat oracle failed: {0}")]
    Oracle(anyhow::Error),
}

/// Signature of the default extra clause hook, which emits nothing. See
/// [`Finder::extra_clauses`].
pub type ExtraClauses<S> = fn(&Codec<S>) -> Cnf;

fn no_extra_clauses<S: Symbol>(_: &Codec<S>) -> Cnf {
    Cnf::new()
}

/// Configures and runs DFA identification.
///
/// A fresh `Finder` is equivalent to the convenience functions
/// [`find_dfa`](crate::find_dfa) and [`find_dfas`](crate::find_dfas):
/// breadth-first symmetry breaking, unbounded sizes, alphabet inferred from
/// the examples, minimal automata only and no stutter ordering. Every knob
/// has a builder method; the terminal methods consume the finder.
///
/// ```
/// use dfa_identify::Finder;
///
/// let accepting = ["ab", "b"].map(|w| w.chars().collect::<Vec<_>>());
/// let rejecting = ["a", ""].map(|w| w.chars().collect::<Vec<_>>());
/// let dfa = Finder::new()
///     .bounds((1, 6))
///     .order_by_stutter(true)
///     .find_dfa(accepting, rejecting)
///     .unwrap()
///     .unwrap();
/// assert!(dfa.accepts("ab".chars()));
/// assert!(!dfa.accepts("a".chars()));
/// ```
pub struct Finder<S: Symbol, O = BatsatOracle, X = ExtraClauses<S>> {
    sym_mode: SymmetryMode,
    bounds: Bounds,
    order_by_stutter: bool,
    allow_unminimized: bool,
    alphabet: Option<Alphabet<S>>,
    extra_clauses: X,
    oracle: PhantomData<fn() -> O>,
}

impl<S: Symbol> Finder<S> {
    /// A finder with default options and the batsat-backed oracle.
    pub fn new() -> Self {
        Self {
            sym_mode: SymmetryMode::default(),
            bounds: Bounds::default(),
            order_by_stutter: false,
            allow_unminimized: false,
            alphabet: None,
            extra_clauses: no_extra_clauses::<S>,
            oracle: PhantomData,
        }
    }
}

impl<S: Symbol> Default for Finder<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Symbol, O, X> Finder<S, O, X> {
    /// Selects the symmetry breaking policy, [`SymmetryMode::BreadthFirst`]
    /// by default.
    pub fn sym_mode(mut self, sym_mode: SymmetryMode) -> Self {
        self.sym_mode = sym_mode;
        self
    }

    /// Restricts the automaton sizes to consider, inclusively.
    pub fn bounds(mut self, bounds: impl Into<Bounds>) -> Self {
        self.bounds = bounds.into();
        self
    }

    /// Orders the automata of each size by ascending non-stutter count, so
    /// automata with many self-loops come first.
    pub fn order_by_stutter(mut self, order_by_stutter: bool) -> Self {
        self.order_by_stutter = order_by_stutter;
        self
    }

    /// Keeps producing automata of larger sizes after the minimal size is
    /// exhausted, instead of stopping there.
    pub fn allow_unminimized(mut self, allow_unminimized: bool) -> Self {
        self.allow_unminimized = allow_unminimized;
        self
    }

    /// Fixes the alphabet instead of inferring it from the examples. Must
    /// cover every symbol occurring in an example, and a nonempty one is
    /// required when no examples are given at all.
    pub fn alphabet<I: IntoIterator<Item = S>>(mut self, symbols: I) -> Self {
        self.alphabet = Some(Alphabet::new(symbols));
        self
    }

    /// Installs a hook producing additional clauses, invoked once per
    /// candidate size with that size's codec. Lets callers constrain the
    /// automaton beyond the examples.
    pub fn extra_clauses<F: Fn(&Codec<S>) -> Cnf>(self, extra_clauses: F) -> Finder<S, O, F> {
        Finder {
            sym_mode: self.sym_mode,
            bounds: self.bounds,
            order_by_stutter: self.order_by_stutter,
            allow_unminimized: self.allow_unminimized,
            alphabet: self.alphabet,
            extra_clauses,
            oracle: PhantomData,
        }
    }

    /// Swaps the SAT oracle implementation, e.g. for testing.
    pub fn with_oracle<P: Oracle>(self) -> Finder<S, P, X> {
        Finder {
            sym_mode: self.sym_mode,
            bounds: self.bounds,
            order_by_stutter: self.order_by_stutter,
            allow_unminimized: self.allow_unminimized,
            alphabet: self.alphabet,
            extra_clauses: self.extra_clauses,
            oracle: PhantomData,
        }
    }
}

impl<S, O, X> Finder<S, O, X>
where
    S: Symbol,
    O: Oracle,
    X: Fn(&Codec<S>) -> Cnf + Clone,
{
    /// Lazily yields raw `(codec, assignment)` pairs for every consistent
    /// automaton, sizes ascending. Most callers want [`Finder::find_dfas`];
    /// this level is for consumers that inspect models directly, e.g. to
    /// read individual codec variables.
    pub fn find_models<A, WA, R, WR>(
        self,
        accepting: A,
        rejecting: R,
    ) -> Result<impl Iterator<Item = Result<(Codec<S>, Assignment), IdentifyError>>, IdentifyError>
    where
        A: IntoIterator<Item = WA>,
        WA: IntoIterator<Item = S>,
        R: IntoIterator<Item = WR>,
        WR: IntoIterator<Item = S>,
    {
        let accepting: math::Set<Vec<S>> =
            accepting.into_iter().map(|word| word.into_iter().collect()).collect();
        let rejecting: math::Set<Vec<S>> =
            rejecting.into_iter().map(|word| word.into_iter().collect()).collect();

        // a word carrying both polarities rules out every automaton
        if !accepting.is_disjoint(&rejecting) {
            trace!("an example appears with both polarities, nothing to identify");
            return Ok(Either::Left(iter::empty()));
        }

        if accepting.is_empty() && rejecting.is_empty() {
            // an empty alphabet constrains nothing either
            let alphabet = match self.alphabet {
                Some(alphabet) if !alphabet.is_empty() => alphabet,
                _ => return Err(IdentifyError::InsufficientSpecification),
            };
            // without examples the problem splits on the empty word's
            // polarity; run both inferences and interleave them fairly
            let pos = Apta::from_examples(alphabet.clone(), [Vec::new()], iter::empty());
            let neg = Apta::from_examples(alphabet, iter::empty(), [Vec::new()]);
            let pos = drive::<S, O, _>(
                pos,
                self.sym_mode,
                self.bounds,
                self.order_by_stutter,
                self.allow_unminimized,
                self.extra_clauses.clone(),
            );
            let neg = drive::<S, O, _>(
                neg,
                self.sym_mode,
                self.bounds,
                self.order_by_stutter,
                self.allow_unminimized,
                self.extra_clauses,
            );
            return Ok(Either::Right(Either::Right(pos.interleave(neg))));
        }

        let alphabet = match self.alphabet {
            Some(alphabet) => {
                let foreign = accepting
                    .iter()
                    .chain(rejecting.iter())
                    .flatten()
                    .any(|sym| !alphabet.contains(*sym));
                if foreign {
                    return Err(IdentifyError::AlphabetMismatch);
                }
                alphabet
            }
            None => accepting.iter().chain(rejecting.iter()).flatten().copied().collect(),
        };

        let apta = Apta::from_examples(alphabet, accepting, rejecting);
        debug!("prefix tree has {} nodes", apta.size());
        let models = drive::<S, O, _>(
            apta,
            self.sym_mode,
            self.bounds,
            self.order_by_stutter,
            self.allow_unminimized,
            self.extra_clauses,
        );
        Ok(Either::Right(Either::Left(models)))
    }

    /// Lazily yields all consistent automata, sizes ascending. The sequence
    /// is empty when the examples are contradictory or the bounds admit no
    /// consistent size.
    pub fn find_dfas<A, WA, R, WR>(
        self,
        accepting: A,
        rejecting: R,
    ) -> Result<impl Iterator<Item = Result<Dfa<S>, IdentifyError>>, IdentifyError>
    where
        A: IntoIterator<Item = WA>,
        WA: IntoIterator<Item = S>,
        R: IntoIterator<Item = WR>,
        WR: IntoIterator<Item = S>,
    {
        Ok(self
            .find_models(accepting, rejecting)?
            .map(|item| item.map(|(codec, model)| codec.extract_dfa(&model))))
    }

    /// Returns one smallest consistent automaton, or `None` if there is no
    /// consistent automaton within the bounds.
    pub fn find_dfa<A, WA, R, WR>(
        self,
        accepting: A,
        rejecting: R,
    ) -> Result<Option<Dfa<S>>, IdentifyError>
    where
        A: IntoIterator<Item = WA>,
        WA: IntoIterator<Item = S>,
        R: IntoIterator<Item = WR>,
        WR: IntoIterator<Item = S>,
    {
        self.find_dfas(accepting, rejecting)?.next().transpose()
    }
}

/// Finds one smallest DFA consistent with the examples, with default
/// options. See [`Finder`] for the configurable version.
pub fn find_dfa<S, A, WA, R, WR>(accepting: A, rejecting: R) -> Result<Option<Dfa<S>>, IdentifyError>
where
    S: Symbol,
    A: IntoIterator<Item = WA>,
    WA: IntoIterator<Item = S>,
    R: IntoIterator<Item = WR>,
    WR: IntoIterator<Item = S>,
{
    Finder::new().find_dfa(accepting, rejecting)
}

/// Lazily enumerates all DFAs consistent with the examples, smallest sizes
/// first, with default options. See [`Finder`] for the configurable version.
pub fn find_dfas<S, A, WA, R, WR>(
    accepting: A,
    rejecting: R,
) -> Result<impl Iterator<Item = Result<Dfa<S>, IdentifyError>>, IdentifyError>
where
    S: Symbol,
    A: IntoIterator<Item = WA>,
    WA: IntoIterator<Item = S>,
    R: IntoIterator<Item = WR>,
    WR: IntoIterator<Item = S>,
{
    Finder::new().find_dfas(accepting, rejecting)
}

fn drive<S, O, X>(
    apta: Apta<S>,
    sym_mode: SymmetryMode,
    bounds: Bounds,
    order_by_stutter: bool,
    allow_unminimized: bool,
    extra_clauses: X,
) -> ModelsIter<S, O, impl Iterator<Item = (Codec<S>, Cnf)>>
where
    S: Symbol,
    O: Oracle,
    X: Fn(&Codec<S>) -> Cnf,
{
    ModelsIter {
        encodings: encodings(apta, bounds, sym_mode, extra_clauses),
        order_by_stutter,
        allow_unminimized,
        state: DriverState::Scanning,
    }
}

/// Pull-based driver over ascending candidate sizes. One oracle session is
/// open at any time at most, owned by the current state.
struct ModelsIter<S: Symbol, O, E> {
    encodings: E,
    order_by_stutter: bool,
    allow_unminimized: bool,
    state: DriverState<S, O>,
}

enum DriverState<S: Symbol, O> {
    /// Looking for the next satisfiable size.
    Scanning,
    /// Enumerating models of a satisfiable size in oracle order.
    Enumerating { codec: Codec<S>, models: ModelEnum<O> },
    /// Enumerating models of a satisfiable size by ascending stutter count.
    Optimizing { codec: Codec<S>, opt: StutterModels<O> },
    Finished,
}

impl<S, O, E> ModelsIter<S, O, E>
where
    S: Symbol,
    O: Oracle,
    E: Iterator<Item = (Codec<S>, Cnf)>,
{
    /// Probes one candidate size and moves into the matching state.
    fn open_size(&mut self, codec: Codec<S>, cnf: Cnf) -> Result<(), IdentifyError> {
        let mut oracle = O::with_clauses(&cnf).map_err(IdentifyError::Oracle)?;
        if !oracle.solve().map_err(IdentifyError::Oracle)? {
            trace!("no consistent automaton with {} states", codec.n_colors());
            self.state = DriverState::Scanning;
            return Ok(());
        }
        debug!("{} states admit a consistent automaton", codec.n_colors());
        if self.order_by_stutter {
            let witness = oracle.model().map_err(IdentifyError::Oracle)?;
            // cardinality queries open their own sessions over the same clauses
            drop(oracle);
            self.state = DriverState::Optimizing {
                opt: StutterModels::new(&codec, cnf, &witness),
                codec,
            };
        } else {
            let top = top_var(&cnf).map_or(codec.max_var(), |var| var.max(codec.max_var()));
            self.state = DriverState::Enumerating { codec, models: ModelEnum::new(oracle, top) };
        }
        Ok(())
    }
}

impl<S, O, E> Iterator for ModelsIter<S, O, E>
where
    S: Symbol,
    O: Oracle,
    E: Iterator<Item = (Codec<S>, Cnf)>,
{
    type Item = Result<(Codec<S>, Assignment), IdentifyError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match mem::replace(&mut self.state, DriverState::Finished) {
                DriverState::Finished => return None,
                DriverState::Scanning => {
                    let Some((codec, cnf)) = self.encodings.next() else {
                        trace!("admissible sizes exhausted");
                        return None;
                    };
                    if let Err(err) = self.open_size(codec, cnf) {
                        return Some(Err(err));
                    }
                }
                DriverState::Enumerating { codec, mut models } => match models.next() {
                    Some(Ok(model)) => {
                        let item = (codec.clone(), model);
                        self.state = DriverState::Enumerating { codec, models };
                        return Some(Ok(item));
                    }
                    Some(Err(err)) => return Some(Err(IdentifyError::Oracle(err))),
                    None => {
                        if self.allow_unminimized {
                            self.state = DriverState::Scanning;
                        } else {
                            return None;
                        }
                    }
                },
                DriverState::Optimizing { codec, mut opt } => match opt.advance() {
                    Ok(Some(model)) => {
                        let item = (codec.clone(), model);
                        self.state = DriverState::Optimizing { codec, opt };
                        return Some(Ok(item));
                    }
                    Ok(None) => {
                        if self.allow_unminimized {
                            self.state = DriverState::Scanning;
                        } else {
                            return None;
                        }
                    }
                    Err(err) => return Some(Err(err)),
                },
            }
        }
    }
}

fn non_stutter_count(lits: &[Lit], model: &Assignment) -> usize {
    lits.iter().filter(|&&lit| model.lit_value(lit) == TernaryVal::True).count()
}

/// Re-orders the models of one satisfiable size by ascending non-stutter
/// count. First a binary search over "at most b" cardinality queries locates
/// the minimal count, where every satisfiable probe tightens the upper end
/// to its witness's own count rather than the probed midpoint. Then the
/// count sweeps upward, enumerating all models of "exactly b" per feasible
/// bound; before a bound beyond the last confirmed-feasible count is swept,
/// a single "at most b" probe checks that anything is left, and the sweep
/// stops at the first bound where nothing is.
struct StutterModels<O> {
    clauses: Cnf,
    lits: Vec<Lit>,
    top_var: Var,
    naive: usize,
    candidate: usize,
    state: OptState<O>,
}

enum OptState<O> {
    Probe { lo: usize, hi: usize },
    Sweep { bound: usize, models: Option<ModelEnum<O>> },
    Finished,
}

impl<O: Oracle> StutterModels<O> {
    fn new<S: Symbol>(codec: &Codec<S>, clauses: Cnf, witness: &Assignment) -> Self {
        let lits = codec.non_stutter_lits();
        let top = top_var(&clauses).map_or(codec.max_var(), |var| var.max(codec.max_var()));
        let candidate = non_stutter_count(&lits, witness);
        let floor = codec.n_colors() - 1;
        debug!(
            "ordering {} non-stutter literals, witness count {candidate}, floor {floor}",
            lits.len()
        );
        Self {
            clauses,
            naive: lits.len(),
            lits,
            top_var: top,
            candidate,
            state: OptState::Probe { lo: floor, hi: candidate },
        }
    }

    fn fresh_var(&self) -> Var {
        Var::new(self.top_var.idx() as u32 + 1)
    }

    /// One scoped "at most bound" query, returning a witness if satisfiable.
    fn witness_at_most(&self, bound: usize) -> Result<Option<Assignment>, IdentifyError> {
        trace!("probing for models changing state at most {bound} times");
        let card =
            card::at_most(&self.lits, bound, self.fresh_var()).map_err(IdentifyError::Oracle)?;
        let mut query = self.clauses.clone();
        for clause in card {
            query.add_clause(clause);
        }
        let mut oracle = O::with_clauses(&query).map_err(IdentifyError::Oracle)?;
        if oracle.solve().map_err(IdentifyError::Oracle)? {
            Ok(Some(oracle.model().map_err(IdentifyError::Oracle)?))
        } else {
            Ok(None)
        }
    }

    /// Opens an enumeration of all models with exactly `bound` non-stutter
    /// transitions.
    fn open_exactly(&self, bound: usize) -> Result<ModelEnum<O>, IdentifyError> {
        trace!("enumerating models changing state exactly {bound} times");
        let card =
            card::exactly(&self.lits, bound, self.fresh_var()).map_err(IdentifyError::Oracle)?;
        let top = top_var(&card).map_or(self.top_var, |var| var.max(self.top_var));
        let mut query = self.clauses.clone();
        for clause in card {
            query.add_clause(clause);
        }
        let oracle = O::with_clauses(&query).map_err(IdentifyError::Oracle)?;
        Ok(ModelEnum::new(oracle, top))
    }

    fn advance(&mut self) -> Result<Option<Assignment>, IdentifyError> {
        loop {
            match mem::replace(&mut self.state, OptState::Finished) {
                OptState::Finished => return Ok(None),
                OptState::Probe { mut lo, mut hi } => {
                    while lo < hi {
                        let mid = (lo + hi) / 2;
                        match self.witness_at_most(mid)? {
                            Some(witness) => {
                                hi = non_stutter_count(&self.lits, &witness);
                                debug_assert!(hi <= mid);
                            }
                            None => lo = mid + 1,
                        }
                    }
                    debug!("stutter search settled on bound {lo}");
                    self.state = OptState::Sweep { bound: lo, models: None };
                }
                OptState::Sweep { bound, models: Some(mut models) } => match models.next() {
                    Some(Ok(model)) => {
                        self.state = OptState::Sweep { bound, models: Some(models) };
                        return Ok(Some(model));
                    }
                    Some(Err(err)) => return Err(IdentifyError::Oracle(err)),
                    None => self.state = OptState::Sweep { bound: bound + 1, models: None },
                },
                OptState::Sweep { bound, models: None } => {
                    if bound > self.naive {
                        return Ok(None);
                    }
                    if bound > self.candidate {
                        // confirm the bound is still feasible before sweeping it
                        match self.witness_at_most(bound)? {
                            None => return Ok(None),
                            Some(witness) => {
                                self.candidate = non_stutter_count(&self.lits, &witness);
                            }
                        }
                    }
                    let models = self.open_exactly(bound)?;
                    self.state = OptState::Sweep { bound, models: Some(models) };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(word: &str) -> Vec<char> {
        word.chars().collect()
    }

    fn assert_classifies(dfa: &Dfa<char>, accepting: &[&str], rejecting: &[&str]) {
        for word in accepting {
            assert!(dfa.accepts(word.chars()), "{word:?} should be accepted");
        }
        for word in rejecting {
            assert!(!dfa.accepts(word.chars()), "{word:?} should be rejected");
        }
    }

    #[test_log::test]
    fn identifies_reference_sample() {
        let accepting = ["a", "abaa", "bb"];
        let rejecting = ["abb", "b"];
        let dfa = find_dfa(accepting.map(chars), rejecting.map(chars)).unwrap().unwrap();
        assert_classifies(&dfa, &accepting, &rejecting);

        // minimality: no strictly smaller automaton is consistent
        let smaller = Finder::new()
            .bounds((1, dfa.size() - 1))
            .find_dfa(accepting.map(chars), rejecting.map(chars))
            .unwrap();
        assert!(smaller.is_none());
    }

    #[test_log::test]
    fn identifies_over_token_alphabets() {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        enum Tok {
            Zero,
            Z,
        }
        use Tok::{Z, Zero};

        let accepting = [vec![Zero], vec![Zero, Z, Zero, Zero], vec![Z, Z]];
        let rejecting = [vec![Zero, Z, Z], vec![Z]];
        let dfa = find_dfa(accepting.clone(), rejecting.clone()).unwrap().unwrap();
        for word in accepting {
            assert!(dfa.accepts(word));
        }
        for word in rejecting {
            assert!(!dfa.accepts(word));
        }
    }

    #[test_log::test]
    fn symmetry_breaking_preserves_the_minimal_size() {
        let minimal_size = |mode: SymmetryMode, accepting: &[&str], rejecting: &[&str]| {
            Finder::new()
                .sym_mode(mode)
                .find_dfa(
                    accepting.iter().map(|word| chars(word)),
                    rejecting.iter().map(|word| chars(word)),
                )
                .unwrap()
                .unwrap()
                .size()
        };
        let samples: [(&[&str], &[&str]); 4] = [
            (&["a", "abaa", "bb"], &["abb", "b"]),
            (&["aa", "b"], &["a", "ba"]),
            (&["abb"], &["a", "b", ""]),
            (&["ba", "ab"], &["aa", "bb", ""]),
        ];
        for (accepting, rejecting) in samples {
            assert_eq!(
                minimal_size(SymmetryMode::BreadthFirst, accepting, rejecting),
                minimal_size(SymmetryMode::None, accepting, rejecting),
            );
        }
    }

    #[test]
    fn contradictory_examples_yield_nothing() {
        let found = find_dfa(["a", "ab"].map(chars), ["ab"].map(chars)).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn unconstrained_identification_is_refused() {
        let none: [Vec<char>; 0] = [];
        let err = find_dfa(none.clone(), none).unwrap_err();
        assert!(matches!(err, IdentifyError::InsufficientSpecification));
    }

    #[test]
    fn empty_alphabets_are_refused() {
        let none: [Vec<char>; 0] = [];
        let err = Finder::new()
            .alphabet(iter::empty::<char>())
            .find_dfa(none.clone(), none)
            .unwrap_err();
        assert!(matches!(err, IdentifyError::InsufficientSpecification));
    }

    #[test]
    fn foreign_symbols_are_refused() {
        let none: [Vec<char>; 0] = [];
        let err = Finder::new()
            .alphabet(['a'])
            .find_dfa(["ab"].map(chars), none)
            .unwrap_err();
        assert!(matches!(err, IdentifyError::AlphabetMismatch));
    }

    #[test_log::test]
    fn alphabet_alone_infers_both_polarities_of_the_empty_word() {
        let none: [Vec<char>; 0] = [];
        let dfas: Vec<_> = Finder::new()
            .alphabet(['a', 'b'])
            .find_dfas(none.clone(), none)
            .unwrap()
            .take(2)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(dfas.len(), 2);
        assert_eq!(dfas[0].size(), 1);
        assert_eq!(dfas[1].size(), 1);
        assert!(dfas[0].accepts(iter::empty()));
        assert!(!dfas[1].accepts(iter::empty()));
    }

    #[test_log::test]
    fn unminimized_sizes_never_decrease() {
        let sizes: Vec<usize> = Finder::new()
            .allow_unminimized(true)
            .find_dfas(["a"].map(chars), ["b"].map(chars))
            .unwrap()
            .take(12)
            .map(|dfa| dfa.unwrap().size())
            .collect();
        assert_eq!(sizes.len(), 12);
        assert_eq!(sizes[0], 2);
        assert!(sizes.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test_log::test]
    fn stutter_ordering_is_monotone_and_starts_minimal() {
        let counts: Vec<usize> = Finder::new()
            .order_by_stutter(true)
            .find_dfas(["a", "abaa", "bb"].map(chars), ["abb", "b"].map(chars))
            .unwrap()
            .map(|dfa| dfa.unwrap().non_stutter_transitions())
            .collect();
        assert!(!counts.is_empty());
        assert!(counts.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(counts[0], *counts.iter().min().unwrap());
    }

    #[test_log::test]
    fn stuttering_and_plain_enumeration_agree_on_the_model_set() {
        let accepting = ["aa", "b"];
        let rejecting = ["a", "ba"];
        let plain: Vec<_> = Finder::new()
            .find_dfas(accepting.map(chars), rejecting.map(chars))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        let ordered: Vec<_> = Finder::new()
            .order_by_stutter(true)
            .find_dfas(accepting.map(chars), rejecting.map(chars))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(plain.len(), ordered.len());
        for dfa in &ordered {
            assert!(plain.contains(dfa));
        }
    }

    #[test]
    fn raw_models_decode_to_the_same_automata() {
        let (codec, model) = Finder::new()
            .find_models(["a"].map(chars), ["b"].map(chars))
            .unwrap()
            .next()
            .unwrap()
            .unwrap();
        let dfa = codec.extract_dfa(&model);
        assert_eq!(dfa.size(), codec.n_colors());
        assert!(dfa.accepts("a".chars()));
        assert!(!dfa.accepts("b".chars()));
    }

    #[test]
    fn extra_clauses_constrain_identification() {
        let dfa = Finder::new()
            .extra_clauses(|codec: &Codec<char>| {
                let mut cnf = Cnf::new();
                cnf.add_unit(!codec.color_accepting(0));
                cnf
            })
            .find_dfa(["ab"].map(chars), ["b"].map(chars))
            .unwrap()
            .unwrap();
        // the initial color is 0 under breadth-first symmetry breaking, so
        // forbidding it from accepting rejects the empty word
        assert!(!dfa.accepts(iter::empty()));
        assert!(dfa.accepts("ab".chars()));
    }

    /// Oracle that deems everything unsatisfiable, for exercising the
    /// exhaustion path without solving.
    struct Pessimist;

    impl Oracle for Pessimist {
        fn with_clauses(_: &Cnf) -> anyhow::Result<Self> {
            Ok(Self)
        }

        fn append(&mut self, _: Cnf) -> anyhow::Result<()> {
            Ok(())
        }

        fn solve(&mut self) -> anyhow::Result<bool> {
            Ok(false)
        }

        fn model(&self) -> anyhow::Result<Assignment> {
            anyhow::bail!("no model for an unsatisfiable formula")
        }
    }

    #[test]
    fn bounded_search_exhausts_cleanly() {
        let none: [Vec<char>; 0] = [];
        let found = Finder::new()
            .with_oracle::<Pessimist>()
            .bounds((1, 4))
            .find_dfa(["a"].map(chars), none)
            .unwrap();
        assert!(found.is_none());
    }
}
