//! Deterministic finite automata, the output of identification.
//!
//! This is deliberately a value type: a dense transition table over state and
//! symbol indices plus an accepting set. Identified automata are complete
//! (every state has a successor for every alphabet symbol) because the
//! encoding demands transition totality.

use bit_set::BitSet;
use itertools::Itertools;

use crate::alphabet::{Alphabet, Symbol};

/// Identifies a state of a [`Dfa`]. The initial state of an identified
/// automaton is always `0` when breadth-first symmetry breaking is active.
pub type StateId = u32;

/// A complete deterministic finite automaton over alphabet `S`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dfa<S: Symbol> {
    alphabet: Alphabet<S>,
    states: usize,
    initial: StateId,
    accepting: BitSet,
    // row-major: table[state * |alphabet| + symbol index]
    table: Vec<StateId>,
}

impl<S: Symbol> Dfa<S> {
    /// Assembles an automaton from its parts. The transition table is
    /// row-major with one row per state and one column per alphabet symbol
    /// in alphabet order.
    ///
    /// Panics if the table dimensions do not match or a transition leaves
    /// the state range.
    pub fn from_parts(
        alphabet: Alphabet<S>,
        states: usize,
        initial: StateId,
        accepting: BitSet,
        table: Vec<StateId>,
    ) -> Self {
        assert!(states > 0, "an automaton has at least its initial state");
        assert!((initial as usize) < states);
        assert_eq!(table.len(), states * alphabet.size());
        assert!(table.iter().all(|&target| (target as usize) < states));
        Self { alphabet, states, initial, accepting, table }
    }

    /// The alphabet of the automaton.
    pub fn alphabet(&self) -> &Alphabet<S> {
        &self.alphabet
    }

    /// Number of states.
    pub fn size(&self) -> usize {
        self.states
    }

    /// The initial state.
    pub fn initial(&self) -> StateId {
        self.initial
    }

    /// Iterates all states in ascending order.
    pub fn states(&self) -> impl Iterator<Item = StateId> {
        0..self.states as StateId
    }

    /// Whether `state` is accepting.
    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accepting.contains(state as usize)
    }

    /// The unique successor of `state` under `sym`, or `None` if `sym` is
    /// not an alphabet symbol.
    pub fn successor(&self, state: StateId, sym: S) -> Option<StateId> {
        let column = self.alphabet.index_of(sym)?;
        Some(self.table[state as usize * self.alphabet.size() + column])
    }

    /// Runs the automaton on `word` and reports whether it ends up in an
    /// accepting state. Words containing symbols outside the alphabet are
    /// never accepted.
    pub fn accepts<W: IntoIterator<Item = S>>(&self, word: W) -> bool {
        let mut current = self.initial;
        for sym in word {
            match self.successor(current, sym) {
                Some(target) => current = target,
                None => return false,
            }
        }
        self.is_accepting(current)
    }

    /// Iterates all transitions `(source, symbol, target)`.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, S, StateId)> + '_ {
        (0..self.states)
            .cartesian_product(0..self.alphabet.size())
            .map(|(state, column)| {
                (
                    state as StateId,
                    self.alphabet.symbol(column),
                    self.table[state * self.alphabet.size() + column],
                )
            })
    }

    /// Number of transitions that change state, i.e. are not self-loops.
    /// This is the quantity that stutter-ordered identification minimizes.
    pub fn non_stutter_transitions(&self) -> usize {
        self.transitions().filter(|&(source, _, target)| source != target).count()
    }
}

#[cfg(test)]
mod tests {
    use bit_set::BitSet;

    use super::Dfa;
    use crate::alphabet::Alphabet;

    /// Automaton accepting words with an even number of 'a's.
    fn even_as() -> Dfa<char> {
        let mut accepting = BitSet::new();
        accepting.insert(0);
        Dfa::from_parts(Alphabet::of_size(2), 2, 0, accepting, vec![1, 0, 0, 1])
    }

    #[test]
    fn membership() {
        let dfa = even_as();
        assert!(dfa.accepts("".chars()));
        assert!(dfa.accepts("bb".chars()));
        assert!(dfa.accepts("aba".chars()));
        assert!(!dfa.accepts("a".chars()));
        assert!(!dfa.accepts("ab".chars()));
    }

    #[test]
    fn foreign_symbols_are_rejected() {
        let dfa = even_as();
        assert!(!dfa.accepts("ac".chars()));
        assert!(!dfa.accepts("c".chars()));
    }

    #[test]
    fn stutter_counting() {
        let dfa = even_as();
        // both 'a' transitions switch state, both 'b' transitions loop
        assert_eq!(dfa.non_stutter_transitions(), 2);
        assert_eq!(dfa.transitions().count(), 4);
    }
}
