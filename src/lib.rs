//! # `flowsat`
//!
//! A solver for [Flow Free](https://en.wikipedia.org/wiki/Numberlink) puzzles: connect each pair of
//! same-colored endpoints on a rectangular grid with paths that never cross or branch.
//! Build a [`Grid`] by parsing the text format, with [`Grid::new`], or with a [`GridBuilder`], then call
//! [`Grid::solve`].
//!
//! # Internals
//! The puzzle is compiled into a Boolean satisfiability problem (a "SAT"), which an external
//! [`TheoryOracle`] decides; the satisfying assignment is then decoded back into paths.
//! Path membership, edge use and bounded reachability from each color's start are all atoms of the
//! encoding, interned per puzzle in a [`VariableSpace`] so independently written clause families share
//! them. See the [`compiler`] module for the clause families.
//!
//! ```
//! use flowsat::{Grid, Location, Outcome};
//!
//! let grid: Grid = "AA".parse().unwrap();
//! let Outcome::Solved(solution) = grid.solve().unwrap() else { panic!() };
//! assert_eq!(solution.path(0).unwrap(), &[Location(0, 0), Location(0, 1)]);
//! ```

pub use builder::GridBuilder;
pub use cell::Cell;
pub use color::{ColorId, Endpoint};
pub use compiler::{compile, Compilation, ConstraintCompiler};
pub use config::{Coverage, EncodingConfig, Settings, SolverConfig};
pub use decoder::decode;
pub use error::{ConfigError, InvariantViolation, MalformedSolution, PuzzleError, SolveError};
pub use grid::Grid;
pub use location::{Dimension, Location};
pub use oracle::{Assignment, Budget, CancelToken, TheoryOracle, VarisatOracle, Verdict};
pub use shape::SquareStep;
pub use solution::Solution;
pub use solver::{run, Outcome};
pub use theory::Theory;
pub use variables::{Atom, VariableSpace};

pub mod builder;
pub(crate) mod cell;
pub(crate) mod color;
pub mod compiler;
pub mod config;
pub(crate) mod decoder;
pub mod error;
pub(crate) mod grid;
pub(crate) mod location;
pub(crate) mod logic;
pub mod oracle;
pub(crate) mod shape;
pub(crate) mod solution;
pub(crate) mod solver;
mod tests;
pub(crate) mod theory;
pub(crate) mod variables;
