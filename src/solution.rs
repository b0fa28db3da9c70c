use ndarray::{Array2, AssignElem};

use crate::cell::Cell;
use crate::color::ColorId;
use crate::grid::Grid;
use crate::location::Location;

/// One ordered path per color, each running from the color's start endpoint to its end endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    pub(crate) paths: Vec<Vec<Location>>,
}

impl Solution {
    pub fn path(&self, color: ColorId) -> Option<&[Location]> {
        self.paths.get(color).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColorId, &[Location])> {
        self.paths.iter().map(Vec::as_slice).enumerate()
    }

    /// Consecutive cell pairs along `color`'s path.
    pub fn edges(&self, color: ColorId) -> impl Iterator<Item = (Location, Location)> + '_ {
        self.path(color).unwrap_or_default().windows(2).map(|pair| (pair[0], pair[1]))
    }

    pub fn color_count(&self) -> usize {
        self.paths.len()
    }

    /// Lay the paths out on `grid`'s cells. Cells no path visits stay [`Cell::Empty`].
    pub fn to_cells(&self, grid: &Grid) -> Array2<Cell> {
        let mut cells = grid.cell_layout();
        for (color, path) in self.iter() {
            for location in path {
                if let Some(cell) = cells.get_mut(location.as_index()) {
                    if *cell == Cell::Empty {
                        cell.assign_elem(Cell::Path { color });
                    }
                }
            }
        }
        cells
    }
}
