//! Augmented prefix tree acceptors.
//!
//! The prefix tree of a finite sample has one node per distinct prefix of an
//! example word. Nodes whose access word is itself an example carry that
//! example's polarity, all other nodes are unlabeled. The tree is the sole
//! input to the CNF encoding, which assigns every node one of `k` colors.

use std::collections::VecDeque;

use crate::alphabet::{Alphabet, Symbol};
use crate::math;

/// Identifies a node of an [`Apta`]. Ids are assigned breadth-first, with the
/// children of a node visited in alphabet order, so the root has id `0` and
/// shorter access words always precede longer ones.
pub type NodeId = u32;

#[derive(Clone, Debug)]
struct Node<S: Symbol> {
    access: Vec<S>,
    label: Option<bool>,
    out: math::Map<S, NodeId>,
}

/// The augmented prefix tree acceptor (APTA) of a sample.
///
/// Construction happens once per identification call through
/// [`Apta::from_examples`]; afterwards the tree is only read. The breadth-first
/// numbering of nodes is relied upon by the symmetry breaking predicates and
/// must not be disturbed.
#[derive(Clone, Debug)]
pub struct Apta<S: Symbol> {
    alphabet: Alphabet<S>,
    nodes: Vec<Node<S>>,
}

impl<S: Symbol> Apta<S> {
    /// Builds the prefix tree for the given examples over `alphabet`.
    ///
    /// Every symbol occurring in an example must belong to the alphabet and
    /// no word may appear with both polarities; both conditions are ensured
    /// by the calling code before construction.
    pub fn from_examples<A, R>(alphabet: Alphabet<S>, accepting: A, rejecting: R) -> Self
    where
        A: IntoIterator<Item = Vec<S>>,
        R: IntoIterator<Item = Vec<S>>,
    {
        let labeled: Vec<(Vec<S>, usize, bool)> = accepting
            .into_iter()
            .map(|word| (word, 0, true))
            .chain(rejecting.into_iter().map(|word| (word, 0, false)))
            .collect();

        let mut nodes = vec![Node { access: Vec::new(), label: None, out: math::Map::default() }];
        let mut queue = VecDeque::new();
        queue.push_back((0 as NodeId, labeled));

        while let Some((id, words)) = queue.pop_front() {
            let mut groups: math::Map<S, Vec<(Vec<S>, usize, bool)>> = math::Map::default();
            for (word, pos, label) in words {
                if pos == word.len() {
                    debug_assert!(
                        nodes[id as usize].label.is_none_or(|known| known == label),
                        "conflicting polarities must be rejected before tree construction"
                    );
                    nodes[id as usize].label = Some(label);
                } else {
                    groups.entry(word[pos]).or_default().push((word, pos + 1, label));
                }
            }
            // visiting children in alphabet order keeps the numbering canonical
            for sym in alphabet.universe() {
                let Some(rest) = groups.remove(&sym) else {
                    continue;
                };
                let child = nodes.len() as NodeId;
                let mut access = nodes[id as usize].access.clone();
                access.push(sym);
                nodes[id as usize].out.insert(sym, child);
                nodes.push(Node { access, label: None, out: math::Map::default() });
                queue.push_back((child, rest));
            }
        }

        Self { alphabet, nodes }
    }

    /// The alphabet this tree is built over.
    pub fn alphabet(&self) -> &Alphabet<S> {
        &self.alphabet
    }

    /// Number of nodes, i.e. distinct prefixes in the sample.
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// The root node, whose access word is empty.
    pub fn root(&self) -> NodeId {
        0
    }

    /// The polarity recorded for `node`, if its access word is an example.
    pub fn label(&self, node: NodeId) -> Option<bool> {
        self.nodes[node as usize].label
    }

    /// The access word of `node`.
    pub fn access(&self, node: NodeId) -> &[S] {
        &self.nodes[node as usize].access
    }

    /// Successor of `node` under `sym`, if that prefix occurs in the sample.
    pub fn successor(&self, node: NodeId, sym: S) -> Option<NodeId> {
        self.nodes[node as usize].out.get(&sym).copied()
    }

    /// Iterates all tree edges `(source, symbol, target)` in a fixed order:
    /// sources ascending, symbols in alphabet order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, S, NodeId)> + '_ {
        self.nodes.iter().enumerate().flat_map(move |(u, node)| {
            self.alphabet
                .universe()
                .filter_map(move |sym| node.out.get(&sym).map(move |&v| (u as NodeId, sym, v)))
        })
    }

    /// Iterates all labeled nodes together with their polarity.
    pub fn labeled(&self) -> impl Iterator<Item = (NodeId, bool)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(id, node)| node.label.map(|label| (id as NodeId, label)))
    }
}

#[cfg(test)]
mod tests {
    use super::Apta;
    use crate::alphabet::Alphabet;

    fn chars(word: &str) -> Vec<char> {
        word.chars().collect()
    }

    #[test]
    fn builds_breadth_first_tree() {
        let apta = Apta::from_examples(
            Alphabet::of_size(2),
            ["a", "abaa", "bb"].map(chars),
            ["abb", "b"].map(chars),
        );

        assert_eq!(apta.size(), 8);
        // breadth-first ids, children in alphabet order
        let accesses: Vec<String> = (0..8).map(|id| apta.access(id).iter().collect()).collect();
        assert_eq!(accesses, ["", "a", "b", "ab", "bb", "aba", "abb", "abaa"]);

        assert_eq!(apta.label(0), None);
        assert_eq!(apta.label(1), Some(true));
        assert_eq!(apta.label(2), Some(false));
        assert_eq!(apta.label(4), Some(true));
        assert_eq!(apta.label(6), Some(false));
        assert_eq!(apta.label(7), Some(true));

        assert_eq!(apta.edges().count(), apta.size() - 1);
        assert_eq!(apta.successor(0, 'a'), Some(1));
        assert_eq!(apta.successor(3, 'a'), Some(5));
        assert_eq!(apta.successor(4, 'a'), None);
    }

    #[test]
    fn empty_word_labels_the_root() {
        let apta = Apta::from_examples(Alphabet::of_size(2), [vec![]], []);
        assert_eq!(apta.size(), 1);
        assert_eq!(apta.label(apta.root()), Some(true));
    }

    #[test]
    fn shared_prefixes_collapse() {
        let apta = Apta::from_examples(
            Alphabet::of_size(2),
            ["aa", "ab"].map(chars),
            ["a"].map(chars),
        );
        // ε, a, aa, ab
        assert_eq!(apta.size(), 4);
        assert_eq!(apta.label(1), Some(false));
        assert_eq!(apta.labeled().count(), 3);
    }
}
