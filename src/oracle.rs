//! Sessions with a SAT oracle.
//!
//! Identification treats satisfiability as a black-box capability: open a
//! session bootstrapped with clauses, query it, read a model, possibly feed
//! more clauses, drop the session. Oracles are pluggable through the
//! [`Oracle`] trait; the default is the pure-Rust `batsat` solver behind
//! rustsat's interface. Native solver faults are never retried, they bubble
//! up and end the consuming call.

use anyhow::bail;
use rustsat::instances::Cnf;
use rustsat::solvers::{Solve, SolverResult};
use rustsat::types::{Assignment, Clause, TernaryVal, Var};
use rustsat_batsat::BasicSolver;

/// A scoped session with a SAT oracle. Sessions are opened right before use
/// and closed by dropping them; no other resource management is exposed.
pub trait Oracle: Sized {
    /// Opens a session bootstrapped with the given clauses.
    fn with_clauses(cnf: &Cnf) -> anyhow::Result<Self>;

    /// Adds clauses to the open session.
    fn append(&mut self, cnf: Cnf) -> anyhow::Result<()>;

    /// Runs the solver, reporting whether the accumulated clauses are
    /// satisfiable.
    fn solve(&mut self) -> anyhow::Result<bool>;

    /// The assignment witnessing the most recent successful [`Oracle::solve`].
    fn model(&self) -> anyhow::Result<Assignment>;
}

/// Highest variable mentioned in `cnf`, if any.
pub(crate) fn top_var(cnf: &Cnf) -> Option<Var> {
    cnf.iter().flat_map(|clause| clause.iter()).map(|lit| lit.var()).max()
}

/// The default oracle, backed by [`BasicSolver`] from `rustsat-batsat`.
pub struct BatsatOracle {
    solver: BasicSolver,
    max_var: Option<Var>,
}

impl Oracle for BatsatOracle {
    fn with_clauses(cnf: &Cnf) -> anyhow::Result<Self> {
        let mut oracle = Self { solver: BasicSolver::default(), max_var: None };
        oracle.append(cnf.clone())?;
        Ok(oracle)
    }

    fn append(&mut self, cnf: Cnf) -> anyhow::Result<()> {
        self.max_var = self.max_var.max(top_var(&cnf));
        self.solver.add_cnf(cnf)?;
        Ok(())
    }

    fn solve(&mut self) -> anyhow::Result<bool> {
        match self.solver.solve()? {
            SolverResult::Sat => Ok(true),
            SolverResult::Unsat => Ok(false),
            SolverResult::Interrupted => bail!("solver was interrupted"),
        }
    }

    fn model(&self) -> anyhow::Result<Assignment> {
        match self.max_var {
            Some(max) => self.solver.solution(max),
            None => Ok(Assignment::from(Vec::new())),
        }
    }
}

/// Enumerates the satisfying assignments of an open session lazily: solve,
/// yield the model, append a clause blocking it, repeat until unsatisfiable.
/// Dropping the enumerator mid-way closes the session.
pub(crate) struct ModelEnum<O> {
    oracle: O,
    top_var: Var,
    done: bool,
}

impl<O: Oracle> ModelEnum<O> {
    /// Enumeration blocks assignments over the variables up to and including
    /// `top_var`; anything above is treated as dependent helper state.
    pub(crate) fn new(oracle: O, top_var: Var) -> Self {
        Self { oracle, top_var, done: false }
    }

    fn step(&mut self) -> anyhow::Result<Option<Assignment>> {
        if !self.oracle.solve()? {
            return Ok(None);
        }
        let model = self.oracle.model()?;
        let blocking: Clause = (0..=self.top_var.idx())
            .filter_map(|idx| {
                let var = Var::new(idx as u32);
                match model.var_value(var) {
                    TernaryVal::True => Some(var.neg_lit()),
                    TernaryVal::False => Some(var.pos_lit()),
                    TernaryVal::DontCare => None,
                }
            })
            .collect();
        let mut block = Cnf::new();
        block.add_clause(blocking);
        self.oracle.append(block)?;
        Ok(Some(model))
    }
}

impl<O: Oracle> Iterator for ModelEnum<O> {
    type Item = anyhow::Result<Assignment>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.step() {
            Ok(Some(model)) => Some(Ok(model)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
