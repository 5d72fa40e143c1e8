//! CNF encodings of the question "is there a consistent DFA with k states".
//!
//! For each candidate size a fresh [`Codec`] lays out the propositional
//! variables and the encoder emits the clause groups of the direct
//! graph-coloring reduction: every prefix tree node receives exactly one of
//! `k` colors, tree edges force color transitions, labeled nodes constrain
//! which colors accept, and the transition relation is total and functional.
//! Optional symmetry breaking prunes colorings that only differ by renaming.
//!
//! The variable layout is contiguous per variable family, so a codec can
//! translate between literals and their semantic reading in constant time.

use bit_set::BitSet;
use itertools::Itertools;
use rustsat::instances::Cnf;
use rustsat::types::{Assignment, Lit, TernaryVal, Var};
use tracing::debug;

use crate::alphabet::{Alphabet, Symbol};
use crate::apta::{Apta, NodeId};
use crate::dfa::{Dfa, StateId};

/// Symmetry breaking policy applied to every generated encoding.
///
/// Breaking symmetries never changes whether an encoding is satisfiable, it
/// only prunes redundant solutions that differ by a renaming of colors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SymmetryMode {
    /// No symmetry breaking. Every consistent coloring is a model, so
    /// isomorphic automata are enumerated repeatedly.
    None,
    /// Pin the root to color `0` and require new colors to be discovered in
    /// breadth-first order over the hypothesis automaton. At least one
    /// representative per isomorphism class of start-reachable automata
    /// survives.
    #[default]
    BreadthFirst,
}

/// Inclusive bounds on the automaton sizes that identification may try.
/// Absent bounds mean "from 1" and "unbounded" respectively.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bounds {
    /// Smallest size to try, clamped to at least 1.
    pub min: Option<usize>,
    /// Largest size to try, or `None` for no limit.
    pub max: Option<usize>,
}

impl From<(Option<usize>, Option<usize>)> for Bounds {
    fn from((min, max): (Option<usize>, Option<usize>)) -> Self {
        Self { min, max }
    }
}

impl From<(usize, usize)> for Bounds {
    fn from((min, max): (usize, usize)) -> Self {
        Self { min: Some(min), max: Some(max) }
    }
}

/// Semantic reading of a codec variable, see [`Codec::decode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodecVar<S> {
    /// The color is an accepting state of the hypothesis.
    ColorAccepting {
        /// Color in `0..n_colors`.
        color: usize,
    },
    /// A prefix tree node is assigned a color.
    ColorNode {
        /// Node of the prefix tree.
        node: NodeId,
        /// Color in `0..n_colors`.
        color: usize,
    },
    /// The hypothesis moves between two colors on a symbol.
    ParentRelation {
        /// Symbol labelling the transition.
        sym: S,
        /// Color the transition leaves.
        from: usize,
        /// Color the transition enters.
        to: usize,
    },
    /// Helper variable of the symmetry breaking predicates.
    Auxiliary,
}

/// Bidirectional mapping between semantic variables and solver literals for
/// one candidate size. A codec is created per size and discarded with it;
/// only the codec of a satisfiable size outlives its query, as part of every
/// yielded model pair.
#[derive(Clone, Debug)]
pub struct Codec<S: Symbol> {
    alphabet: Alphabet<S>,
    n_nodes: usize,
    n_colors: usize,
    sym_mode: SymmetryMode,
    x_offset: u32,
    y_offset: u32,
    aux_offset: u32,
    var_count: u32,
}

impl<S: Symbol> Codec<S> {
    fn new(alphabet: Alphabet<S>, n_nodes: usize, n_colors: usize, sym_mode: SymmetryMode) -> Self {
        debug_assert!(n_colors >= 1);
        let k = n_colors as u32;
        let n = n_nodes as u32;
        let l = alphabet.size() as u32;
        let x_offset = k;
        let y_offset = x_offset + n * k;
        let aux_offset = y_offset + l * k * k;
        let pairs = k * (k - 1) / 2;
        let aux = match sym_mode {
            SymmetryMode::None => 0,
            // edge-enable and parent variables per color pair, minimal-symbol
            // variables only when several symbols can compete
            SymmetryMode::BreadthFirst => 2 * pairs + if l >= 2 { pairs * l } else { 0 },
        };
        Self {
            alphabet,
            n_nodes,
            n_colors,
            sym_mode,
            x_offset,
            y_offset,
            aux_offset,
            var_count: aux_offset + aux,
        }
    }

    /// The alphabet the encoding ranges over.
    pub fn alphabet(&self) -> &Alphabet<S> {
        &self.alphabet
    }

    /// Candidate automaton size of this codec.
    pub fn n_colors(&self) -> usize {
        self.n_colors
    }

    /// Number of prefix tree nodes covered by the coloring variables.
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// The symmetry breaking policy baked into this codec's layout.
    pub fn sym_mode(&self) -> SymmetryMode {
        self.sym_mode
    }

    /// Highest variable allocated by this codec.
    pub fn max_var(&self) -> Var {
        Var::new(self.var_count - 1)
    }

    /// First variable above everything this codec allocated. Extra clause
    /// hooks that introduce helper variables of their own should allocate
    /// them from here upwards.
    pub fn next_free(&self) -> Var {
        Var::new(self.var_count)
    }

    /// Positive literal stating that `color` is accepting.
    pub fn color_accepting(&self, color: usize) -> Lit {
        debug_assert!(color < self.n_colors);
        Lit::positive(color as u32)
    }

    /// Positive literal stating that `node` carries `color`.
    pub fn color_node(&self, node: NodeId, color: usize) -> Lit {
        debug_assert!((node as usize) < self.n_nodes && color < self.n_colors);
        Lit::positive(self.x_offset + node * self.n_colors as u32 + color as u32)
    }

    /// Positive literal stating that the hypothesis transitions from color
    /// `from` to color `to` when reading `sym`.
    pub fn parent_relation(&self, sym: S, from: usize, to: usize) -> Lit {
        let token = self
            .alphabet
            .index_of(sym)
            .expect("symbol must belong to the codec's alphabet");
        self.transition(token, from, to)
    }

    fn transition(&self, token: usize, from: usize, to: usize) -> Lit {
        let k = self.n_colors as u32;
        debug_assert!(token < self.alphabet.size() && from < self.n_colors && to < self.n_colors);
        Lit::positive(self.y_offset + (token as u32) * k * k + (from as u32) * k + to as u32)
    }

    /// All transition literals whose source and target color differ. Their
    /// count in a model is the model's non-stutter count.
    pub fn non_stutter_lits(&self) -> Vec<Lit> {
        let k = self.n_colors;
        (0..self.alphabet.size())
            .cartesian_product((0..k).cartesian_product(0..k))
            .filter(|&(_, (from, to))| from != to)
            .map(|(token, (from, to))| self.transition(token, from, to))
            .collect()
    }

    /// The semantic reading of `lit`'s variable. Variables beyond the codec's
    /// own families (symmetry helpers, cardinality helpers) are [`CodecVar::Auxiliary`].
    pub fn decode(&self, lit: Lit) -> CodecVar<S> {
        let idx = lit.var().idx() as u32;
        let k = self.n_colors as u32;
        if idx < self.x_offset {
            CodecVar::ColorAccepting { color: idx as usize }
        } else if idx < self.y_offset {
            let rest = idx - self.x_offset;
            CodecVar::ColorNode { node: rest / k, color: (rest % k) as usize }
        } else if idx < self.aux_offset {
            let rest = idx - self.y_offset;
            let token = rest / (k * k);
            let rest = rest % (k * k);
            CodecVar::ParentRelation {
                sym: self.alphabet.symbol(token as usize),
                from: (rest / k) as usize,
                to: (rest % k) as usize,
            }
        } else {
            CodecVar::Auxiliary
        }
    }

    /// Reads a satisfying assignment back into the automaton it describes.
    ///
    /// Panics when handed an assignment that does not satisfy the encoding,
    /// since then neither the coloring of the root nor the transition targets
    /// are well defined.
    pub fn extract_dfa(&self, model: &Assignment) -> Dfa<S> {
        let k = self.n_colors;
        let initial = (0..k)
            .find(|&color| self.assigned(model, self.color_node(0, color)))
            .expect("a model colors the root node") as StateId;
        let accepting = (0..k)
            .filter(|&color| self.assigned(model, self.color_accepting(color)))
            .collect::<BitSet>();
        let mut table = Vec::with_capacity(k * self.alphabet.size());
        for from in 0..k {
            for token in 0..self.alphabet.size() {
                let target = (0..k)
                    .find(|&to| self.assigned(model, self.transition(token, from, to)))
                    .expect("a model fixes every transition") as StateId;
                table.push(target);
            }
        }
        Dfa::from_parts(self.alphabet.clone(), k, initial, accepting, table)
    }

    fn assigned(&self, model: &Assignment, lit: Lit) -> bool {
        model.lit_value(lit) == TernaryVal::True
    }

    // breadth-first helper variables; the layouts below are only allocated in
    // BreadthFirst mode, for color pairs i < j

    fn pair(&self, i: usize, j: usize) -> u32 {
        debug_assert!(i < j && j < self.n_colors);
        (j * (j - 1) / 2 + i) as u32
    }

    fn pair_count(&self) -> u32 {
        let k = self.n_colors as u32;
        k * (k - 1) / 2
    }

    /// t(i, j): some transition from color i reaches color j.
    fn enables(&self, i: usize, j: usize) -> Lit {
        debug_assert_eq!(self.sym_mode, SymmetryMode::BreadthFirst);
        Lit::positive(self.aux_offset + self.pair(i, j))
    }

    /// p(j, i): color i is the breadth-first parent of color j.
    fn parent(&self, j: usize, i: usize) -> Lit {
        debug_assert_eq!(self.sym_mode, SymmetryMode::BreadthFirst);
        Lit::positive(self.aux_offset + self.pair_count() + self.pair(i, j))
    }

    /// m(i, j, token): `token` is the smallest symbol moving color i to j.
    fn min_symbol(&self, i: usize, j: usize, token: usize) -> Lit {
        debug_assert!(self.alphabet.size() >= 2);
        let l = self.alphabet.size() as u32;
        Lit::positive(self.aux_offset + 2 * self.pair_count() + self.pair(i, j) * l + token as u32)
    }
}

/// Generates the encoding for one candidate size.
pub(crate) fn encode<S, X>(
    apta: &Apta<S>,
    n_colors: usize,
    sym_mode: SymmetryMode,
    extra_clauses: &X,
) -> (Codec<S>, Cnf)
where
    S: Symbol,
    X: Fn(&Codec<S>) -> Cnf,
{
    let codec = Codec::new(apta.alphabet().clone(), apta.size(), n_colors, sym_mode);
    let k = n_colors;
    let tokens = codec.alphabet.size();
    let mut cnf = Cnf::new();

    // each node wears exactly one color
    for node in 0..apta.size() as NodeId {
        cnf.add_clause((0..k).map(|color| codec.color_node(node, color)).collect());
        for (c, d) in (0..k).tuple_combinations() {
            cnf.add_binary(!codec.color_node(node, c), !codec.color_node(node, d));
        }
    }

    // the transition relation is total and functional
    for token in 0..tokens {
        for from in 0..k {
            cnf.add_clause((0..k).map(|to| codec.transition(token, from, to)).collect());
            for (c, d) in (0..k).tuple_combinations() {
                cnf.add_binary(!codec.transition(token, from, c), !codec.transition(token, from, d));
            }
        }
    }

    // tree edges and color transitions agree; the reverse implication is
    // entailed but speeds up propagation
    for (source, sym, target) in apta.edges() {
        let token = codec.alphabet.index_of(sym).expect("tree symbols are alphabet symbols");
        for from in 0..k {
            for to in 0..k {
                let x_source = codec.color_node(source, from);
                let x_target = codec.color_node(target, to);
                let y = codec.transition(token, from, to);
                cnf.add_ternary(y, !x_source, !x_target);
                cnf.add_ternary(!y, !x_source, x_target);
            }
        }
    }

    // labeled nodes pin down which colors accept
    for (node, label) in apta.labeled() {
        for color in 0..k {
            let z = codec.color_accepting(color);
            cnf.add_binary(!codec.color_node(node, color), if label { z } else { !z });
        }
    }

    match sym_mode {
        SymmetryMode::None => {}
        SymmetryMode::BreadthFirst => encode_breadth_first(&codec, &mut cnf),
    }

    for clause in extra_clauses(&codec) {
        cnf.add_clause(clause);
    }

    debug!(
        "encoded {k} colors for {} nodes into {} clauses over {} variables",
        apta.size(),
        cnf.len(),
        codec.var_count
    );
    (codec, cnf)
}

/// Breadth-first symmetry breaking. Colors must be discovered in order when
/// the hypothesis automaton is traversed breadth-first from color 0, with
/// ties between siblings broken by their smallest connecting symbol. Models
/// of the unrestricted encoding are permutations of models surviving here.
fn encode_breadth_first<S: Symbol>(codec: &Codec<S>, cnf: &mut Cnf) {
    let k = codec.n_colors;
    let tokens = codec.alphabet.size();

    // the root of the prefix tree is the start and gets the first color
    cnf.add_unit(codec.color_node(0, 0));
    if k < 2 {
        return;
    }

    for j in 1..k {
        for i in 0..j {
            // t(i, j) holds iff some symbol moves i to j
            cnf.add_clause(
                std::iter::once(!codec.enables(i, j))
                    .chain((0..tokens).map(|token| codec.transition(token, i, j)))
                    .collect(),
            );
            for token in 0..tokens {
                cnf.add_binary(codec.enables(i, j), !codec.transition(token, i, j));
            }

            // p(j, i) picks the smallest i with an edge into j
            cnf.add_binary(!codec.parent(j, i), codec.enables(i, j));
            for q in 0..i {
                cnf.add_binary(!codec.parent(j, i), !codec.enables(q, j));
            }
            cnf.add_clause(
                [codec.parent(j, i), !codec.enables(i, j)]
                    .into_iter()
                    .chain((0..i).map(|q| codec.enables(q, j)))
                    .collect(),
            );
        }
        // every color except 0 is discovered from an earlier one
        cnf.add_clause((0..j).map(|i| codec.parent(j, i)).collect());
    }

    // discovery order: parents never decrease along the color sequence
    for j in 1..k - 1 {
        for i in 0..j {
            for q in 0..i {
                cnf.add_binary(!codec.parent(j, i), !codec.parent(j + 1, q));
            }
        }
    }

    if tokens < 2 {
        return;
    }

    for j in 1..k {
        for i in 0..j {
            // m(i, j, token) marks the smallest symbol moving i to j
            for token in 0..tokens {
                cnf.add_binary(!codec.min_symbol(i, j, token), codec.transition(token, i, j));
                for earlier in 0..token {
                    cnf.add_binary(!codec.min_symbol(i, j, token), !codec.transition(earlier, i, j));
                }
                cnf.add_clause(
                    [codec.min_symbol(i, j, token), !codec.transition(token, i, j)]
                        .into_iter()
                        .chain((0..token).map(|earlier| codec.transition(earlier, i, j)))
                        .collect(),
                );
            }
        }
    }

    // consecutive children of the same parent are ordered by smallest symbol
    for j in 1..k - 1 {
        for i in 0..j {
            for a in 0..tokens {
                for b in a..tokens {
                    cnf.add_clause(
                        [
                            !codec.parent(j, i),
                            !codec.parent(j + 1, i),
                            !codec.min_symbol(i, j, b),
                            !codec.min_symbol(i, j + 1, a),
                        ]
                        .into_iter()
                        .collect(),
                    );
                }
            }
        }
    }
}

/// Lazily yields `(Codec, Cnf)` pairs for every size the bounds admit,
/// smallest first. Owns its inputs and generates nothing until pulled.
pub(crate) fn encodings<S, X>(
    apta: Apta<S>,
    bounds: Bounds,
    sym_mode: SymmetryMode,
    extra_clauses: X,
) -> impl Iterator<Item = (Codec<S>, Cnf)>
where
    S: Symbol,
    X: Fn(&Codec<S>) -> Cnf,
{
    let lo = bounds.min.unwrap_or(1).max(1);
    let hi = bounds.max.unwrap_or(usize::MAX);
    (lo..=hi).map(move |n_colors| encode(&apta, n_colors, sym_mode, &extra_clauses))
}

#[cfg(test)]
mod tests {
    use bit_set::BitSet;
    use rustsat::instances::Cnf;
    use rustsat::types::{Assignment, TernaryVal};

    use super::{encode, Codec, CodecVar, SymmetryMode};
    use crate::alphabet::Alphabet;
    use crate::apta::Apta;
    use crate::dfa::Dfa;

    fn no_extra(_: &Codec<char>) -> Cnf {
        Cnf::new()
    }

    fn chars(word: &str) -> Vec<char> {
        word.chars().collect()
    }

    /// Sample consistent with "even number of 'a's" over {a, b}.
    fn parity_apta() -> Apta<char> {
        Apta::from_examples(Alphabet::of_size(2), ["", "aa"].map(chars), ["a"].map(chars))
    }

    fn satisfies(cnf: &Cnf, model: &Assignment) -> bool {
        cnf.iter().all(|clause| clause.iter().any(|lit| model.lit_value(*lit) == TernaryVal::True))
    }

    #[test]
    fn variable_layout() {
        let apta = parity_apta();
        let (codec, _) = encode(&apta, 2, SymmetryMode::None, &no_extra);
        // blocks: 2 accepting, 3 * 2 coloring, 2 * 2 * 2 transitions
        assert_eq!(codec.max_var().idx(), 2 + 6 + 8 - 1);
        assert_eq!(codec.color_accepting(1).var().idx(), 1);
        assert_eq!(codec.color_node(0, 0).var().idx(), 2);
        assert_eq!(codec.parent_relation('a', 0, 0).var().idx(), 8);
        assert_eq!(codec.non_stutter_lits().len(), 2 * 2);

        assert_eq!(codec.decode(codec.color_accepting(1)), CodecVar::ColorAccepting { color: 1 });
        assert_eq!(
            codec.decode(codec.color_node(2, 1)),
            CodecVar::ColorNode { node: 2, color: 1 }
        );
        assert_eq!(
            codec.decode(codec.parent_relation('b', 1, 0)),
            CodecVar::ParentRelation { sym: 'b', from: 1, to: 0 }
        );
    }

    #[test]
    fn breadth_first_mode_allocates_helpers_and_pins_root() {
        let apta = parity_apta();
        let (plain, _) = encode(&apta, 3, SymmetryMode::None, &no_extra);
        let (bfs, cnf) = encode(&apta, 3, SymmetryMode::BreadthFirst, &no_extra);
        assert!(bfs.max_var() > plain.max_var());
        assert!(cnf
            .iter()
            .any(|clause| clause.len() == 1 && clause[0] == bfs.color_node(0, 0)));
    }

    /// A hand-built model of the parity automaton satisfies the encoding and
    /// decodes back to that very automaton.
    #[test]
    fn consistent_automaton_round_trips() {
        let apta = parity_apta();
        let (codec, cnf) = encode(&apta, 2, SymmetryMode::None, &no_extra);

        let mut values = vec![TernaryVal::False; codec.max_var().idx() + 1];
        let mut set = |lit: rustsat::types::Lit| values[lit.var().idx()] = TernaryVal::True;
        set(codec.color_accepting(0));
        // node colors follow the automaton's run over the access words
        set(codec.color_node(0, 0));
        set(codec.color_node(1, 1));
        set(codec.color_node(2, 0));
        // parity transitions: 'a' flips, 'b' loops
        set(codec.parent_relation('a', 0, 1));
        set(codec.parent_relation('a', 1, 0));
        set(codec.parent_relation('b', 0, 0));
        set(codec.parent_relation('b', 1, 1));
        let model = Assignment::from(values);

        assert!(satisfies(&cnf, &model));

        let mut accepting = BitSet::new();
        accepting.insert(0);
        let expected = Dfa::from_parts(Alphabet::of_size(2), 2, 0, accepting, vec![1, 0, 0, 1]);
        assert_eq!(codec.extract_dfa(&model), expected);
    }

    #[test]
    fn extra_clauses_are_appended() {
        let apta = parity_apta();
        let forbid = |codec: &Codec<char>| {
            let mut cnf = Cnf::new();
            cnf.add_unit(!codec.color_accepting(0));
            cnf
        };
        let (codec, cnf) = encode(&apta, 2, SymmetryMode::None, &forbid);
        assert!(cnf
            .iter()
            .any(|clause| clause.len() == 1 && clause[0] == !codec.color_accepting(0)));
    }
}
