use varisat::{CnfFormula, Lit};

/// A CNF theory: the conjunction of every clause compiled for one puzzle. Clauses only accumulate.
#[derive(Clone, Debug, Default)]
pub struct Theory {
    clauses: Vec<Vec<Lit>>,
    var_count: usize,
}

impl Theory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_clause(&mut self, clause: Vec<Lit>) {
        if let Some(highest) = clause.iter().map(|lit| lit.index() + 1).max() {
            self.var_count = self.var_count.max(highest);
        }
        self.clauses.push(clause);
    }

    pub fn extend(&mut self, clauses: impl IntoIterator<Item = Vec<Lit>>) -> usize {
        let before = self.clauses.len();
        clauses.into_iter().for_each(|clause| self.add_clause(clause));
        self.clauses.len() - before
    }

    /// Make sure variables below `count` are part of the theory even if no clause mentions them.
    pub fn reserve_vars(&mut self, count: usize) {
        self.var_count = self.var_count.max(count);
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn var_count(&self) -> usize {
        self.var_count
    }

    pub fn clauses(&self) -> &[Vec<Lit>] {
        &self.clauses
    }

    pub fn to_formula(&self) -> CnfFormula {
        CnfFormula::from(self.clauses.clone())
    }
}
