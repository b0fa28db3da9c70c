use log::info;

use crate::compiler::{compile, Compilation};
use crate::config::Settings;
use crate::decoder::decode;
use crate::error::{MalformedSolution, SolveError};
use crate::grid::Grid;
use crate::oracle::{Budget, CancelToken, TheoryOracle, VarisatOracle, Verdict};
use crate::solution::Solution;

/// Result of solving a puzzle. Neither an unsatisfiable nor an undecided puzzle is an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Solved(Solution),
    /// No valid filling exists.
    Unsatisfiable,
    /// The oracle gave up; a larger budget may help.
    Unknown(String),
}

impl Outcome {
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            Outcome::Solved(solution) => Some(solution),
            _ => None,
        }
    }

    pub fn into_solution(self) -> Option<Solution> {
        match self {
            Outcome::Solved(solution) => Some(solution),
            _ => None,
        }
    }
}

/// Hand an existing compilation of `grid` to `oracle` and decode its answer.
pub fn run<O: TheoryOracle>(grid: &Grid, compilation: &Compilation, oracle: &O, budget: &Budget) -> Result<Outcome, MalformedSolution> {
    match oracle.solve(compilation.theory(), budget) {
        Verdict::Satisfiable(assignment) => Ok(Outcome::Solved(decode(grid, compilation.variables(), &assignment)?)),
        Verdict::Unsatisfiable => Ok(Outcome::Unsatisfiable),
        Verdict::Unknown(reason) => Ok(Outcome::Unknown(reason)),
    }
}

impl Grid {
    /// Solve with default [`Settings`] and a [`VarisatOracle`].
    pub fn solve(&self) -> Result<Outcome, SolveError> {
        self.solve_with(&Settings::default(), &VarisatOracle::default(), None)
    }

    /// Compile this grid, decide it with `oracle` within the configured time budget, and decode the paths.
    ///
    /// `cancel` may be triggered from another thread to abandon the oracle call with [`Outcome::Unknown`].
    pub fn solve_with<O: TheoryOracle>(&self, settings: &Settings, oracle: &O, cancel: Option<CancelToken>) -> Result<Outcome, SolveError> {
        let compilation = compile(self, &settings.encoding)?;
        let budget = Budget {
            timeout: settings.solver.timeout(),
            cancel,
        };

        let outcome = run(self, &compilation, oracle, &budget)?;
        info!("{}", match &outcome {
            Outcome::Solved(_) => "solved",
            Outcome::Unsatisfiable => "no solution",
            Outcome::Unknown(_) => "undecided",
        });
        Ok(outcome)
    }
}
