//! Error types. An unsatisfiable or undecided puzzle is not an error; see [`Outcome`](crate::Outcome).

use thiserror::Error;

use crate::color::ColorId;
use crate::location::Location;
use crate::variables::Atom;

/// The puzzle description is malformed. Raised before compilation and never worth retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    #[error("the puzzle has no cells")]
    EmptyGrid,

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRows { row: usize, expected: usize, found: usize },

    #[error("color {display:?} has {count} endpoints, expected 2")]
    WrongEndpointCount { display: char, count: usize },

    #[error("endpoint {location} lies outside the grid")]
    OutOfBounds { location: Location },

    #[error("more than one endpoint placed at {location}")]
    SharedEndpoint { location: Location },

    #[error("endpoint refers to unknown color {0}")]
    UnknownColor(ColorId),

    #[error("color {0:?} is declared twice")]
    DuplicateColor(char),
}

/// An internal canonicalization failure while compiling. Always a defect in the grid model or
/// the variable space, never a property of the puzzle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("reachability step {step} outside 0..={max}")]
    StepOutOfRange { step: usize, max: usize },

    #[error("{0} and {1} are not adjacent")]
    NotAdjacent(Location, Location),

    #[error("color {0} does not exist")]
    UnknownColor(ColorId),

    #[error("cell {0} lies outside the grid")]
    OutOfBounds(Location),

    #[error("adjacency between {0} and {1} is not symmetric")]
    AsymmetricAdjacency(Location, Location),

    #[error("atom {0} was interned under two different variables")]
    MismatchedIdentity(Atom),

    #[error("atom {0} was never compiled")]
    MissingAtom(Atom),
}

/// A satisfying assignment does not describe simple paths. This means the compiled theory is
/// unsound and is reported as is, never repaired.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedSolution {
    #[error("color {color} revisits {location} before reaching its end")]
    Revisit { color: ColorId, location: Location },

    #[error("color {color} branches at {location}")]
    Branch { color: ColorId, location: Location },

    #[error("color {color} stops at {location} before reaching its end")]
    DeadEnd { color: ColorId, location: Location },

    #[error("color {color} leaves its start {location} over {edges} edges, expected 1")]
    WrongStart { color: ColorId, location: Location, edges: usize },

    #[error("color {color} has {extra} active edges off its path")]
    StrayEdges { color: ColorId, extra: usize },

    #[error("atom {0} has no value in the assignment")]
    UnassignedAtom(Atom),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid settings: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Anything that stops the compile, solve, decode pipeline short of an [`Outcome`](crate::Outcome).
#[derive(Error, Debug)]
pub enum SolveError {
    #[error(transparent)]
    Puzzle(#[from] PuzzleError),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    #[error(transparent)]
    Malformed(#[from] MalformedSolution),
}
