use std::collections::HashSet;

use log::{debug, trace};

use crate::color::ColorId;
use crate::error::MalformedSolution;
use crate::grid::Grid;
use crate::location::Location;
use crate::oracle::Assignment;
use crate::solution::Solution;
use crate::variables::{Atom, VariableSpace};

/// Read one path per color out of a satisfying assignment by walking active connection atoms from
/// the start endpoint to the end endpoint.
///
/// Anything other than a single simple path per color, with no further active edges of that color,
/// is reported as [`MalformedSolution`].
pub fn decode(grid: &Grid, variables: &VariableSpace, assignment: &Assignment) -> Result<Solution, MalformedSolution> {
    let decoder = Decoder { grid, variables, assignment };
    let paths = grid.colors()
        .map(|color| decoder.walk(color))
        .collect::<Result<Vec<_>, _>>()?;

    debug!("decoded {} paths covering {} cells", paths.len(), paths.iter().map(Vec::len).sum::<usize>());
    Ok(Solution { paths })
}

struct Decoder<'a> {
    grid: &'a Grid,
    variables: &'a VariableSpace,
    assignment: &'a Assignment,
}

impl Decoder<'_> {
    fn active(&self, color: ColorId, a: Location, b: Location) -> Result<bool, MalformedSolution> {
        let atom = Atom::connection(color, a, b);
        self.variables.lookup(&atom)
            .and_then(|var| self.assignment.value(var))
            .ok_or(MalformedSolution::UnassignedAtom(atom))
    }

    /// Neighbours of `cell`, other than `except`, joined to it by an active edge of `color`.
    fn exits(&self, color: ColorId, cell: Location, except: Option<Location>) -> Result<Vec<Location>, MalformedSolution> {
        let mut exits = Vec::with_capacity(2);
        for neighbor in self.grid.adjacent_cells(cell) {
            if Some(neighbor) != except && self.active(color, cell, neighbor)? {
                exits.push(neighbor);
            }
        }
        Ok(exits)
    }

    fn walk(&self, color: ColorId) -> Result<Vec<Location>, MalformedSolution> {
        let (start, end) = self.grid.termini[color];

        let first = match self.exits(color, start, None)?.as_slice() {
            [only] => *only,
            other => return Err(MalformedSolution::WrongStart { color, location: start, edges: other.len() }),
        };

        let mut path = vec![start];
        let mut visited = HashSet::from([start]);
        let (mut previous, mut current) = (start, first);

        loop {
            trace!("color {}: {} -> {}", color, previous, current);
            if !visited.insert(current) {
                return Err(MalformedSolution::Revisit { color, location: current });
            }
            path.push(current);

            if current == end {
                break;
            }

            match self.exits(color, current, Some(previous))?.as_slice() {
                [] => return Err(MalformedSolution::DeadEnd { color, location: current }),
                [next] => (previous, current) = (current, *next),
                _ => return Err(MalformedSolution::Branch { color, location: current }),
            }
        }

        // nothing of this color may be active off the walked path
        let mut active = 0;
        for (a, b) in self.grid.edges() {
            if self.active(color, a, b)? {
                active += 1;
            }
        }
        let extra = active - (path.len() - 1);
        if extra > 0 {
            return Err(MalformedSolution::StrayEdges { color, extra });
        }

        Ok(path)
    }
}
