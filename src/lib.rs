//! Library for inferring minimal deterministic finite automata (DFAs) from labeled example words.
//!
//! Given two finite sets of words over a common alphabet, one to accept and one to reject, identification asks for a smallest complete DFA that classifies every example correctly. The problem is NP-complete, and this crate takes the route that works best in practice: reduction to propositional satisfiability. The examples are folded into a prefix tree acceptor (see [`Apta`]), whose nodes must be merged into $k$ classes such that no accepting word ends up in the same class as a rejecting one. For each candidate size $k$ the merge is phrased as a graph coloring and encoded into CNF (see [`encode`]), decided by a SAT oracle (see [`oracle`]), and a satisfying assignment is decoded back into an explicit automaton (see [`Dfa`]). Sizes are tried in ascending order, so the first automaton produced is minimal; by default the search also breaks symmetries by forcing colors to be numbered in breadth-first order, which prunes the $k!$ recolorings of every solution down to one.
//!
//! The interface comes in three layers. [`find_dfa`] returns one smallest consistent automaton. [`find_dfas`] lazily enumerates all consistent automata, smallest first, which is useful when identification is a subroutine and candidates are filtered by some outside criterion. Both are shorthand for a default [`Finder`], the builder that exposes the remaining knobs: explicit size bounds, a fixed alphabet, symmetry breaking policy, ordering automata of equal size by how often they change state (see [`Finder::order_by_stutter`]), continuing past the minimal size, extra caller-supplied clauses and a replaceable oracle backend. One level below, [`Finder::find_models`] hands out raw codec/assignment pairs for consumers that want to inspect individual variables of the encoding.
//!
//! Everything is demand driven. No formula is encoded and no oracle is run before the consumer asks for the next automaton, and dropping an iterator abandons the remaining work. The whole search runs on the calling thread; progress is reported through [`tracing`] at debug and trace level.
//!
//! ```
//! use dfa_identify::find_dfa;
//!
//! let accepting = ["a", "abaa", "bb"].map(|w| w.chars().collect::<Vec<_>>());
//! let rejecting = ["abb", "b"].map(|w| w.chars().collect::<Vec<_>>());
//!
//! let dfa = find_dfa(accepting, rejecting).unwrap().unwrap();
//! assert!(dfa.accepts("abaa".chars()));
//! assert!(!dfa.accepts("abb".chars()));
//! assert_eq!(dfa.size(), 3);
//! ```
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// This module contains definitions of mathematical objects which are used throughout the crate
/// and do not really fit to the top level.
pub mod math;

/// Module that contains definitions for dealing with alphabets.
pub mod alphabet;
pub use alphabet::{Alphabet, Symbol};

/// Defines the prefix tree acceptor into which the example words are folded.
pub mod apta;
pub use apta::{Apta, NodeId};

/// Defines explicit deterministic finite automata, the output of identification.
pub mod dfa;
pub use dfa::{Dfa, StateId};

/// Encodes bounded identification problems into CNF and decodes their models.
pub mod encode;
pub use encode::{Bounds, Codec, CodecVar, SymmetryMode};

mod card;

/// Abstracts the SAT oracle and provides the default batsat-backed one.
pub mod oracle;
pub use oracle::{BatsatOracle, Oracle};

/// Drives the search for consistent automata of ascending size.
pub mod identify;
pub use identify::{find_dfa, find_dfas, ExtraClauses, Finder, IdentifyError};
