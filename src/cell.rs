use crate::color::ColorId;

/// Contents of one grid cell, as laid out by [`Grid::cell_layout`](crate::Grid::cell_layout)
/// and [`Solution::to_cells`](crate::Solution::to_cells).
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Cell {
    Terminus { color: ColorId },
    Path { color: ColorId },
    #[default]
    Empty,
}

impl Cell {
    pub fn color(&self) -> Option<ColorId> {
        match self {
            Cell::Terminus { color } | Cell::Path { color } => Some(*color),
            Cell::Empty => None,
        }
    }
}
