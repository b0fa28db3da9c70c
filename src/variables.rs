use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter};

use log::trace;
use unordered_pair::UnorderedPair;
use varisat::Var;

use crate::color::ColorId;
use crate::error::InvariantViolation;
use crate::grid::Grid;
use crate::location::{Dimension, Location};
use crate::shape::SquareStep;

/// A boolean fact about a puzzle. Atoms compare by value, so two clause families that name the
/// same fact share one variable.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub enum Atom {
    /// `cell` belongs to `color`'s path.
    Path { color: ColorId, cell: Location },
    /// The edge between two adjacent cells is used by `color`'s path.
    /// The pair is undirected and always stored lower cell first.
    Connection { color: ColorId, cells: UnorderedPair<Location> },
    /// `cell` is reachable from `color`'s start within `step` active edges.
    Reachable { color: ColorId, cell: Location, step: usize },
}

impl Atom {
    pub fn path(color: ColorId, cell: Location) -> Self {
        Self::Path { color, cell }
    }

    pub fn connection(color: ColorId, a: Location, b: Location) -> Self {
        let cells = if a <= b { UnorderedPair(a, b) } else { UnorderedPair(b, a) };
        Self::Connection { color, cells }
    }

    pub fn reachable(color: ColorId, cell: Location, step: usize) -> Self {
        Self::Reachable { color, cell, step }
    }

    pub fn color(&self) -> ColorId {
        match self {
            Self::Path { color, .. } | Self::Connection { color, .. } | Self::Reachable { color, .. } => *color,
        }
    }
}

impl Display for Atom {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path { color, cell } => write!(f, "path[{color}]{cell}"),
            Self::Connection { color, cells: UnorderedPair(a, b) } => write!(f, "conn[{color}]{a}-{b}"),
            Self::Reachable { color, cell, step } => write!(f, "reach[{color}]{cell}@{step}"),
        }
    }
}

impl Debug for Atom {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

/// Per-puzzle arena of [`Atom`]s. Each distinct atom is assigned a SAT variable on first reference,
/// and every later reference to an equal atom returns that same variable.
#[derive(Clone, Debug)]
pub struct VariableSpace {
    dims: (Dimension, Dimension),
    color_count: usize,
    max_step: usize,
    index: HashMap<Atom, Var>,
    atoms: Vec<Atom>,
}

impl VariableSpace {
    pub fn new(grid: &Grid) -> Self {
        Self {
            dims: grid.dims(),
            color_count: grid.color_count(),
            max_step: grid.max_step(),
            index: HashMap::new(),
            atoms: Vec::new(),
        }
    }

    pub fn path(&mut self, color: ColorId, cell: Location) -> Result<Var, InvariantViolation> {
        self.check_color(color)?;
        self.check_cell(cell)?;
        self.intern(Atom::path(color, cell))
    }

    /// Either order of `a` and `b` names the same atom.
    pub fn connection(&mut self, color: ColorId, a: Location, b: Location) -> Result<Var, InvariantViolation> {
        self.check_color(color)?;
        self.check_cell(a)?;
        self.check_cell(b)?;
        if SquareStep::direction_to(a, b).is_none() {
            return Err(InvariantViolation::NotAdjacent(a, b));
        }
        self.intern(Atom::connection(color, a, b))
    }

    /// Rejects `step` beyond `rows * cols - 1`.
    pub fn reachable(&mut self, color: ColorId, cell: Location, step: usize) -> Result<Var, InvariantViolation> {
        self.check_color(color)?;
        self.check_cell(cell)?;
        if step > self.max_step {
            return Err(InvariantViolation::StepOutOfRange { step, max: self.max_step });
        }
        self.intern(Atom::reachable(color, cell, step))
    }

    /// The variable of an already interned atom, without creating one.
    pub fn lookup(&self, atom: &Atom) -> Option<Var> {
        self.index.get(atom).copied()
    }

    pub fn atom_of(&self, var: Var) -> Option<&Atom> {
        self.atoms.get(var.index())
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Every interned atom with its variable, in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (Var, &Atom)> {
        self.atoms.iter().enumerate().map(|(i, atom)| (Var::from_index(i), atom))
    }

    fn intern(&mut self, atom: Atom) -> Result<Var, InvariantViolation> {
        if let Some(var) = self.index.get(&atom) {
            return match self.atoms.get(var.index()) {
                Some(existing) if *existing == atom => Ok(*var),
                _ => Err(InvariantViolation::MismatchedIdentity(atom)),
            };
        }

        let var = Var::from_index(self.atoms.len());
        trace!("new atom {} as {:?}", atom, var);
        self.atoms.push(atom);
        self.index.insert(atom, var);
        Ok(var)
    }

    fn check_color(&self, color: ColorId) -> Result<(), InvariantViolation> {
        match color < self.color_count {
            true => Ok(()),
            false => Err(InvariantViolation::UnknownColor(color)),
        }
    }

    fn check_cell(&self, cell: Location) -> Result<(), InvariantViolation> {
        match cell.within(self.dims) {
            true => Ok(()),
            false => Err(InvariantViolation::OutOfBounds(cell)),
        }
    }
}
