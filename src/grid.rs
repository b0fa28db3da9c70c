use std::str::FromStr;

use itertools::Itertools;
use ndarray::{Array2, AssignElem};
use petgraph::graphmap::UnGraphMap;

use crate::cell::Cell;
use crate::color::{ColorId, Endpoint};
use crate::error::{InvariantViolation, PuzzleError};
use crate::location::{Dimension, Location};
use crate::shape::SquareStep;

/// A validated Flow Free board: its dimensions, its colors and their endpoints, and the 4-neighbour
/// adjacency between cells.
///
/// Build one with [`Grid::new`], a [`GridBuilder`](crate::builder::GridBuilder), or by parsing the
/// text format with [`str::parse`].
#[derive(Clone, Debug)]
pub struct Grid {
    // edges carry their forward direction
    pub(crate) graph: UnGraphMap<Location, SquareStep>,
    pub(crate) dims: (Dimension, Dimension),
    pub(crate) cells: Array2<Cell>,
    pub(crate) color_displays: Vec<char>,
    // (start, end) per color
    pub(crate) termini: Vec<(Location, Location)>,
}

impl Grid {
    /// Construct a grid of `dims` (rows, columns) with the given color labels and endpoints.
    ///
    /// Every color must have exactly two endpoints, all in bounds, and no two endpoints may share a cell.
    /// The first endpoint given for a color is its start.
    pub fn new(dims: (Dimension, Dimension), colors: Vec<char>, endpoints: Vec<Endpoint>) -> Result<Self, PuzzleError> {
        if let Some(duplicate) = colors.iter().duplicates().next() {
            return Err(PuzzleError::DuplicateColor(*duplicate));
        }

        let mut cells = Array2::from_shape_simple_fn((dims.0.get(), dims.1.get()), Cell::default);
        let mut placed: Vec<Vec<Location>> = vec![Vec::with_capacity(2); colors.len()];

        for Endpoint { color, location } in endpoints {
            let Some(locations) = placed.get_mut(color) else {
                return Err(PuzzleError::UnknownColor(color));
            };
            if !location.within(dims) {
                return Err(PuzzleError::OutOfBounds { location });
            }
            let cell = &mut cells[location.as_index()];
            if *cell != Cell::Empty {
                return Err(PuzzleError::SharedEndpoint { location });
            }
            cell.assign_elem(Cell::Terminus { color });
            locations.push(location);
        }

        let termini = placed.into_iter()
            .zip(colors.iter())
            .map(|(locations, display)| match locations.as_slice() {
                [start, end] => Ok((*start, *end)),
                _ => Err(PuzzleError::WrongEndpointCount { display: *display, count: locations.len() }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (rows, cols) = (dims.0.get(), dims.1.get());
        let mut graph = UnGraphMap::with_capacity(
            rows * cols,
            // "horizontal" edges plus "vertical" edges
            rows * (cols - 1) + (rows - 1) * cols,
        );

        for location in (0..rows).cartesian_product(0..cols).map(Location::from) {
            graph.add_node(location);
        }
        for location in (0..rows).cartesian_product(0..cols).map(Location::from) {
            // add edges down and to the right, if possible
            for direction in SquareStep::FORWARD_VARIANTS {
                let other = direction.attempt_from(location);
                if other.within(dims) {
                    graph.add_edge(location, other, *direction);
                }
            }
        }

        Ok(Self {
            graph,
            dims,
            cells,
            color_displays: colors,
            termini,
        })
    }

    /// `(rows, columns)`.
    pub fn dims(&self) -> (Dimension, Dimension) {
        self.dims
    }

    pub fn color_count(&self) -> usize {
        self.color_displays.len()
    }

    pub fn colors(&self) -> impl Iterator<Item = ColorId> {
        0..self.color_count()
    }

    /// The character this color was declared with.
    pub fn display_of(&self, color: ColorId) -> Option<char> {
        self.color_displays.get(color).copied()
    }

    pub fn color_of(&self, display: char) -> Option<ColorId> {
        self.color_displays.iter().position(|d| *d == display)
    }

    /// The `(start, end)` endpoints of `color`.
    pub fn endpoints(&self, color: ColorId) -> Option<(Location, Location)> {
        self.termini.get(color).copied()
    }

    /// Every cell, row-major.
    pub fn cells(&self) -> impl Iterator<Item = Location> + '_ {
        (0..self.dims.0.get()).cartesian_product(0..self.dims.1.get()).map(Location::from)
    }

    /// Every adjacent pair of cells, each pair once, lower indexed cell first.
    pub fn edges(&self) -> impl Iterator<Item = (Location, Location)> + '_ {
        self.graph.all_edges().map(|(a, b, _)| if a < b { (a, b) } else { (b, a) })
    }

    pub fn contains(&self, cell: Location) -> bool {
        cell.within(self.dims)
    }

    /// The grid-edge neighbours of `cell`: at most four, no wraparound.
    pub fn adjacent_cells(&self, cell: Location) -> Vec<Location> {
        if !self.graph.contains_node(cell) {
            return Vec::new();
        }
        self.graph.neighbors(cell).collect_vec()
    }

    pub fn are_adjacent(&self, a: Location, b: Location) -> bool {
        self.graph.contains_edge(a, b)
    }

    /// `true` if `cell` is one of `color`'s two endpoints.
    pub fn is_endpoint(&self, cell: Location, color: ColorId) -> bool {
        self.endpoint_color(cell) == Some(color)
    }

    /// The color whose endpoint sits at `cell`, if any.
    pub fn endpoint_color(&self, cell: Location) -> Option<ColorId> {
        match self.cells.get(cell.as_index()) {
            Some(Cell::Terminus { color }) => Some(*color),
            _ => None,
        }
    }

    /// Longest possible path length in edges; reachability is unrolled up to this step.
    pub fn max_step(&self) -> usize {
        self.dims.0.get() * self.dims.1.get() - 1
    }

    /// The unsolved board: endpoints marked, everything else empty.
    pub fn cell_layout(&self) -> Array2<Cell> {
        self.cells.clone()
    }

    /// Check that every edge joins two in-bounds 4-neighbours and is visible from both ends.
    pub(crate) fn verify_adjacency(&self) -> Result<(), InvariantViolation> {
        for (a, b, direction) in self.graph.all_edges() {
            for cell in [a, b] {
                if !self.contains(cell) {
                    return Err(InvariantViolation::OutOfBounds(cell));
                }
            }
            let forward = SquareStep::direction_to(a, b).map(|d| d.ensure_forward());
            if forward != Some(*direction) {
                return Err(InvariantViolation::NotAdjacent(a, b));
            }
            if !self.graph.neighbors(a).any(|n| n == b) || !self.graph.neighbors(b).any(|n| n == a) {
                return Err(InvariantViolation::AsymmetricAdjacency(a, b));
            }
        }
        Ok(())
    }
}

impl FromStr for Grid {
    type Err = PuzzleError;

    /// Parse the text format: one line per row, `.` for an empty cell, any other character for an
    /// endpoint of the color it names. Colors are numbered in order of first appearance.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows = s.lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .map(|line| line.chars().collect_vec())
            .collect_vec();

        let width = rows.first().map_or(0, Vec::len);
        let (Some(height), Some(width)) = (Dimension::new(rows.len()), Dimension::new(width)) else {
            return Err(PuzzleError::EmptyGrid);
        };

        let mut colors: Vec<char> = Vec::new();
        let mut endpoints = Vec::new();
        for (row, line) in rows.iter().enumerate() {
            if line.len() != width.get() {
                return Err(PuzzleError::RaggedRows { row, expected: width.get(), found: line.len() });
            }
            for (col, display) in line.iter().enumerate().filter(|(_, c)| **c != '.') {
                let color = match colors.iter().position(|c| c == display) {
                    Some(color) => color,
                    None => {
                        colors.push(*display);
                        colors.len() - 1
                    }
                };
                endpoints.push(Endpoint::new(color, Location(row, col)));
            }
        }

        Grid::new((height, width), colors, endpoints)
    }
}
