//! Cardinality constraints over literal sets.
//!
//! The stutter optimizer repeatedly asks "at most b of these literals" and
//! "exactly b of these literals". Both are synthesized through rustsat's
//! totalizer encoding; helper variables are allocated strictly above the
//! caller-supplied watermark so they never collide with codec variables or
//! extra clauses.

use rustsat::encodings::card::{BoundBoth, BoundUpper, Totalizer};
use rustsat::instances::{BasicVarManager, Cnf};
use rustsat::types::{Lit, Var};

/// Clauses constraining at most `bound` of `lits` to be true. Trivially
/// satisfied bounds produce no clauses at all.
pub(crate) fn at_most(lits: &[Lit], bound: usize, next_free: Var) -> anyhow::Result<Cnf> {
    if bound >= lits.len() {
        return Ok(Cnf::new());
    }
    let mut totalizer: Totalizer = lits.iter().copied().collect();
    let mut manager = BasicVarManager::from_next_free(next_free);
    let mut cnf = Cnf::new();
    totalizer.encode_ub(bound..=bound, &mut cnf, &mut manager)?;
    for unit in totalizer.enforce_ub(bound)? {
        cnf.add_unit(unit);
    }
    Ok(cnf)
}

/// Clauses constraining exactly `bound` of `lits` to be true. `bound` must
/// not exceed the number of literals.
pub(crate) fn exactly(lits: &[Lit], bound: usize, next_free: Var) -> anyhow::Result<Cnf> {
    debug_assert!(bound <= lits.len());
    if lits.is_empty() {
        return Ok(Cnf::new());
    }
    let mut totalizer: Totalizer = lits.iter().copied().collect();
    let mut manager = BasicVarManager::from_next_free(next_free);
    let mut cnf = Cnf::new();
    totalizer.encode_both(bound..=bound, &mut cnf, &mut manager)?;
    for unit in totalizer.enforce_eq(bound)? {
        cnf.add_unit(unit);
    }
    Ok(cnf)
}

#[cfg(test)]
mod tests {
    use rustsat::instances::Cnf;
    use rustsat::types::{Lit, TernaryVal, Var};

    use super::{at_most, exactly};
    use crate::oracle::{BatsatOracle, Oracle};

    fn lits(n: u32) -> Vec<Lit> {
        (0..n).map(Lit::positive).collect()
    }

    fn count_true(oracle: &BatsatOracle, lits: &[Lit]) -> usize {
        let model = oracle.model().unwrap();
        lits.iter().filter(|&&lit| model.lit_value(lit) == TernaryVal::True).count()
    }

    #[test]
    fn at_most_blocks_overfull_assignments() {
        let lits = lits(3);
        let mut cnf = Cnf::new();
        cnf.add_unit(lits[0]);
        cnf.add_unit(lits[1]);
        for clause in at_most(&lits, 1, Var::new(3)).unwrap() {
            cnf.add_clause(clause);
        }
        let mut oracle = BatsatOracle::with_clauses(&cnf).unwrap();
        assert!(!oracle.solve().unwrap());
    }

    #[test]
    fn at_most_admits_small_assignments() {
        let lits = lits(4);
        let mut cnf = Cnf::new();
        cnf.add_unit(lits[2]);
        for clause in at_most(&lits, 2, Var::new(4)).unwrap() {
            cnf.add_clause(clause);
        }
        let mut oracle = BatsatOracle::with_clauses(&cnf).unwrap();
        assert!(oracle.solve().unwrap());
        assert!(count_true(&oracle, &lits) <= 2);
    }

    #[test]
    fn exactly_pins_the_count() {
        let lits = lits(4);
        let cnf = exactly(&lits, 2, Var::new(4)).unwrap();
        let mut oracle = BatsatOracle::with_clauses(&cnf).unwrap();
        assert!(oracle.solve().unwrap());
        assert_eq!(count_true(&oracle, &lits), 2);
    }

    #[test]
    fn trivial_bounds_need_no_clauses() {
        let lits = lits(3);
        assert!(at_most(&lits, 3, Var::new(3)).unwrap().is_empty());
        assert!(at_most(&[], 0, Var::new(0)).unwrap().is_empty());
        assert!(exactly(&[], 0, Var::new(0)).unwrap().is_empty());
    }
}
