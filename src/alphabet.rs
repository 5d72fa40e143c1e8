//! Alphabets are ordered, duplicate-free collections of symbols.
//!
//! Everything in this crate is generic over the symbol type so that examples
//! may be given over characters, integers or bespoke token enums alike. The
//! ordering requirement is not cosmetic: breadth-first node numbering in the
//! prefix tree and the symmetry breaking predicates both rely on a stable
//! symbol order.

use std::fmt::Debug;
use std::hash::Hash;

use itertools::Itertools;

/// A symbol of an [`Alphabet`]. This trait is automatically implemented.
pub trait Symbol: Copy + Eq + Ord + Hash + Debug {}
impl<S: Copy + Eq + Ord + Hash + Debug> Symbol for S {}

/// An ordered alphabet over symbols of type `S`.
///
/// Internally stores the symbols sorted and deduplicated, which makes the
/// index of a symbol (see [`Alphabet::index_of`]) canonical for a given set
/// of symbols regardless of the order in which they were supplied.
///
/// # Example
/// ```
/// use dfa_identify::Alphabet;
/// let alphabet: Alphabet<char> = "baab".chars().collect();
/// assert_eq!(alphabet.size(), 2);
/// assert_eq!(alphabet.index_of('b'), Some(1));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Alphabet<S: Symbol>(Vec<S>);

impl<S: Symbol> Alphabet<S> {
    /// Creates an alphabet from the given symbols, deduplicating and sorting.
    pub fn new<I: IntoIterator<Item = S>>(symbols: I) -> Self {
        symbols.into_iter().collect()
    }

    /// Returns an iterator over all symbols in ascending order.
    pub fn universe(&self) -> impl Iterator<Item = S> + '_ {
        self.0.iter().copied()
    }

    /// Number of distinct symbols.
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no symbols are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Checks whether `sym` belongs to the alphabet.
    pub fn contains(&self, sym: S) -> bool {
        self.0.binary_search(&sym).is_ok()
    }

    /// Position of `sym` in the sorted universe, if present.
    pub fn index_of(&self, sym: S) -> Option<usize> {
        self.0.binary_search(&sym).ok()
    }

    /// The symbol at position `index` of the sorted universe.
    ///
    /// Panics if `index` is out of range.
    pub fn symbol(&self, index: usize) -> S {
        self.0[index]
    }
}

impl Alphabet<char> {
    /// Creates an alphabet consisting of the first `size` lowercase letters.
    pub fn of_size(size: usize) -> Self {
        assert!(size <= 26, "creating alphabets of more than 26 letters is currently not supported");
        ('a'..='z').take(size).collect()
    }
}

impl<S: Symbol> FromIterator<S> for Alphabet<S> {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().unique().sorted().collect())
    }
}

impl<'a, S: Symbol> IntoIterator for &'a Alphabet<S> {
    type Item = S;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::Alphabet;

    #[test]
    fn alphabet_orders_and_dedups() {
        let alphabet: Alphabet<char> = "cabbage".chars().collect();
        assert_eq!(alphabet.universe().collect::<Vec<_>>(), vec!['a', 'b', 'c', 'e', 'g']);
        assert_eq!(alphabet.size(), 5);
        assert!(alphabet.contains('g'));
        assert!(!alphabet.contains('z'));
    }

    #[test]
    fn symbol_indices_are_canonical() {
        let left = Alphabet::new([3u8, 1, 2]);
        let right = Alphabet::new([2u8, 2, 3, 1]);
        assert_eq!(left, right);
        for (idx, sym) in left.universe().enumerate() {
            assert_eq!(left.index_of(sym), Some(idx));
            assert_eq!(left.symbol(idx), sym);
        }
    }

    #[test]
    fn of_size_gives_letters() {
        let alphabet = Alphabet::of_size(3);
        assert_eq!(alphabet.universe().collect::<Vec<_>>(), vec!['a', 'b', 'c']);
    }
}
